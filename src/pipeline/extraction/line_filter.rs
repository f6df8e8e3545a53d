//! Noise rejection, amount parsing, and item-label cleanup for grouped lines.
//!
//! Receipts are mostly not line items: totals, tax markers, phone numbers,
//! loyalty points, card brands, register/clerk footers. Two filters handle
//! this:
//!
//! - `classify_line` — the hard filter. Rejects recognizable noise outright,
//!   then requires a trailing monetary token and a non-empty label. Rejection
//!   is an expected outcome (`None`), never an error.
//! - `is_noise` — the coarse filter applied before rows are handed over for
//!   persistence. Catches what slips through: too-short labels, boilerplate
//!   fragments, and absurd amounts (phone or card digits misparsed as money).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::{ExtractedLine, LineGroup};

/// Confidence assigned to extracted lines. The detection API's per-word
/// confidences are not wired through; a fixed default stands in.
const DEFAULT_CONFIDENCE: f32 = 0.9;

/// Amounts above this (yen) are assumed to be misparsed phone/card digits.
const AMOUNT_SANITY_CEILING: u32 = 300_000;

// ── Hard-noise signals ──

static TEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(TEL|電話|CALL)[:：]?\s*\d{2,4}[-‐–―ー]?\d{2,4}[-‐–―ー]?\d{3,4}").unwrap()
});

static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(ﾎﾟｲﾝﾄ|ポイント|T-?POINT|楽天ポイント|dポイント|P[ ：]?\d+)").unwrap()
});

static MEMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(会員|会員番号|ﾒﾝﾊﾞｰ|ID)[:：]?\s*[A-Z0-9\-]{6,}").unwrap());

static CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(VISA|MASTER|JCB|AMEX|WAON|nanaco|Suica|PASMO|PayPay|楽天Edy)").unwrap()
});

/// Masked digit runs (`****`, `####`) from card slips.
static MASK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[＊*#]{4,}").unwrap());

/// Trailing monetary token: comma-grouped or bare integer, optional 円.
static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,3}(?:[,，][0-9]{3})+|[0-9]+)\s*(円)?$").unwrap());

/// Boilerplate vocabulary whose mere containment rejects a line.
const IGNORE_HARD: &[&str] = &[
    "お買上",
    "領収",
    "ありがとうございました",
    "軽減税率",
    "小計対象",
    "レジ",
    "担当",
    "合計点数",
    "小計",
    "合計",
    "税込",
    "税抜",
    "内税",
    "外税",
    "割引",
    "値引",
    "クーポン",
    "会員",
    "No.",
    "№",
];

/// Separator punctuation trimmed off both ends of a derived item label.
const LABEL_TRIM_CHARS: &str = " :：-–—~〜\t";

/// Coarse-filter boilerplate patterns (broader than the hard filter).
static SKIP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"小計",
        r"合計",
        r"計[ 　]*小",
        r"消費税",
        r"内税",
        r"外税",
        r"領収",
        r"お会計",
        r"会計",
        r"担当",
        r"レジ",
        r"番号",
        r"No\.?",
        r"有効期限",
        r"TEL|電話",
        r"ﾎﾟｲﾝﾄ|ポイント|T-?POINT|dポイント|楽天ポイント",
        // Lone 1-2 letter token (OCR fragment)
        r"^\s*[A-Z]{1,2}\s*$",
        // Standalone long numeral (phone number, card tail)
        r"^\s*\d{6,}\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Classify one grouped line into an `ExtractedLine`, or reject it.
///
/// Steps: strip currency glyphs and commas → reject hard noise → require a
/// trailing amount → derive the label by removing the amount and trimming
/// separator punctuation. Any failed step rejects the line silently.
pub fn classify_line(group: &LineGroup) -> Option<ExtractedLine> {
    let text = group.text.replace('¥', "").replace(',', " ");
    let text = text.trim();

    if is_hard_noise(text) {
        debug!(line = %text, "Rejected noise line");
        return None;
    }

    let captures = MONEY_RE.captures(text)?;
    let matched = captures.get(0)?;
    let amount: u32 = captures
        .get(1)?
        .as_str()
        .replace([',', '，'], "")
        .parse()
        .ok()?;

    let item = text[..matched.start()]
        .trim_matches(|c| LABEL_TRIM_CHARS.contains(c))
        .to_string();
    if item.is_empty() {
        return None;
    }

    Some(ExtractedLine {
        raw_text: group.text.clone(),
        item,
        amount,
        confidence: DEFAULT_CONFIDENCE,
        y_min: group.y_min,
        y_max: group.y_max,
    })
}

/// True when the text trips any hard-noise signal.
fn is_hard_noise(text: &str) -> bool {
    if TEL_RE.is_match(text) || POINT_RE.is_match(text) {
        return true;
    }
    if IGNORE_HARD.iter().any(|term| text.contains(term)) {
        return true;
    }
    MEMBER_RE.is_match(text) || CARD_RE.is_match(text) || MASK_RE.is_match(text)
}

/// Coarse filter guarding persistence: drop rows whose label is too short or
/// boilerplate, or whose amount fails the sanity ceiling.
pub fn is_noise(item: &str, amount: u32) -> bool {
    if item.trim().chars().count() < 2 {
        return true;
    }
    if SKIP_RES.iter().any(|rx| rx.is_match(item)) {
        return true;
    }
    amount > AMOUNT_SANITY_CEILING
}

//! Clusters recognized word tokens into printed receipt lines.
//!
//! Tokens are sorted by vertical position and walked top to bottom. A token
//! joins the current line while it stays within `LINE_BAND_PX` of a smoothed
//! anchor; the anchor follows each joined token with exponential smoothing so
//! gentle baseline drift (curled paper, skewed photos) accumulates instead of
//! splitting the line.

use tracing::debug;

use super::types::{LineGroup, Token};

/// Vertical band (pixels, post-normalization scale) a token may deviate from
/// the line anchor and still belong to the line.
const LINE_BAND_PX: f32 = 15.0;

/// Anchor smoothing weight: `anchor = 0.8·anchor + 0.2·y`.
const ANCHOR_SMOOTHING: f32 = 0.2;

/// Group tokens into receipt lines, top to bottom.
///
/// Deterministic: equal-y tokens keep their detection order (stable sort).
/// Zero tokens yield zero groups.
pub fn group_tokens(mut tokens: Vec<Token>) -> Vec<LineGroup> {
    tokens.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut groups = Vec::new();
    let mut buffer: Vec<Token> = Vec::new();
    let mut anchor: Option<f32> = None;

    for token in tokens {
        match anchor {
            Some(cur) if (token.y - cur).abs() <= LINE_BAND_PX => {
                anchor = Some((1.0 - ANCHOR_SMOOTHING) * cur + ANCHOR_SMOOTHING * token.y);
                buffer.push(token);
            }
            Some(_) => {
                groups.push(close_group(std::mem::take(&mut buffer)));
                anchor = Some(token.y);
                buffer.push(token);
            }
            None => {
                anchor = Some(token.y);
                buffer.push(token);
            }
        }
    }
    if !buffer.is_empty() {
        groups.push(close_group(buffer));
    }

    debug!(groups = groups.len(), "Grouped tokens into lines");
    groups
}

fn close_group(tokens: Vec<Token>) -> LineGroup {
    let text = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let y_min = tokens.iter().map(|t| t.y).fold(f32::INFINITY, f32::min);
    let y_max = tokens.iter().map(|t| t.y).fold(f32::NEG_INFINITY, f32::max);
    LineGroup { text, y_min, y_max }
}

//! Built-in fallback keyword dictionary.
//!
//! Consulted after the stored keyword rules. Static configuration data, not
//! behavior: category groups are scanned in declared order, words within a
//! group in declared order, first substring hit wins. A hit only resolves if
//! a category with that name actually exists in the store.

/// Category name → trigger words, in precedence order.
pub const FALLBACK_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "食費",
        &[
            "昼ご飯",
            "夕飯",
            "弁当",
            "外食",
            "レストラン",
            "マクド",
            "ローソン",
            "セブン",
            "スーパー",
        ],
    ),
    ("住宅", &["家賃", "ローン", "管理費"]),
    (
        "水道光熱",
        &["電気代", "ガス代", "水道代", "電気", "ガス", "水道"],
    ),
    (
        "通信",
        &["スマホ", "携帯", "通信", "wifi", "インターネット"],
    ),
    (
        "交通",
        &[
            "バス",
            "電車",
            "地下鉄",
            "切符",
            "高速",
            "ガソリン",
            "駐車場",
            "レンタカー",
            "タクシー",
        ],
    ),
    (
        "日用品",
        &["ドラッグ", "洗剤", "ティッシュ", "トイレットペーパー"],
    ),
    ("交際費", &["飲み会", "プレゼント", "会食"]),
    ("医療", &["病院", "薬", "処方", "診察"]),
    ("教育・教養", &["本", "書籍", "kindle", "受講", "授業料"]),
];

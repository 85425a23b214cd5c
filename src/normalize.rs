use crate::models::{MatchKey, NormalizedName};

/// Collapse whitespace runs to a single space and upper-case the result.
pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Split a raw name into first/middle/surname. Never fails; absent or blank
/// input yields the all-empty name.
pub fn normalize_name(raw: Option<&str>) -> NormalizedName {
    let Some(raw) = raw else {
        return NormalizedName::default();
    };
    let upper = normalize_text(raw);
    let parts: Vec<&str> = upper.split_whitespace().collect();
    match parts.as_slice() {
        [] => NormalizedName::default(),
        [first] => NormalizedName {
            first: (*first).to_string(),
            ..Default::default()
        },
        [first, surname] => NormalizedName {
            first: (*first).to_string(),
            middle: String::new(),
            surname: (*surname).to_string(),
        },
        [first, middle @ .., surname] => NormalizedName {
            first: (*first).to_string(),
            middle: middle.join(" "),
            surname: (*surname).to_string(),
        },
    }
}

pub fn match_key(name: &NormalizedName) -> MatchKey {
    let d = MatchKey::DELIMITER;
    MatchKey(format!("{}{d}{}{d}{}", name.first, name.middle, name.surname))
}

/// Shorthand for `match_key(&normalize_name(raw))`.
pub fn key_for(raw: Option<&str>) -> MatchKey {
    match_key(&normalize_name(raw))
}

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::GroupReference;

static CLUB_MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[club(\d+)\|").expect("valid club mention regex"));

/// Collects the distinct community ids mentioned as `[club<id>|...]`.
pub fn extract_group_references<'a, I>(texts: I) -> BTreeSet<GroupReference>
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .flat_map(|text| CLUB_MENTION_RE.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|digits| GroupReference::new(digits.as_str()))
        .collect()
}

//! Emphasis for the two recommendations a reader scans for first.
//!
//! Both transforms are pure and idempotent: a phrase that is already directly wrapped in the
//! emphasis marker is left as it is. Text without a match is returned unchanged.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

use crate::constants::EMPHASIS;

static DRUG_RECOMMENDATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brecommend(?:ed)?\s+(?:using\s+)?(?:heparin|lovenox)\b")
        .expect("drug recommendation pattern is valid")
});

// `.*?` is lazy so only the nearest status after each label is captured.
static DISPOSITION_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(disposition:.*?)\b(inpatient|observation)\b")
        .expect("disposition status pattern is valid")
});

/// A phrase counts as emphasised only when markers sit directly on both sides of it.
fn already_emphasised(text: &str, phrase: Match<'_>) -> bool {
    text[..phrase.start()].ends_with(EMPHASIS) && text[phrase.end()..].starts_with(EMPHASIS)
}

/// Wraps every "recommend[ed] [using] Heparin|Lovenox" phrase in emphasis markers.
///
/// Matching is case-insensitive and global.
pub fn highlight_drug_recommendation(text: &str) -> String {
    DRUG_RECOMMENDATION
        .replace_all(text, |caps: &Captures<'_>| {
            let phrase = &caps[0];
            match caps.get(0) {
                Some(m) if already_emphasised(text, m) => phrase.to_string(),
                _ => format!("{EMPHASIS}{phrase}{EMPHASIS}"),
            }
        })
        .into_owned()
}

/// Wraps the first `Inpatient` or `Observation` following each `Disposition:` label.
///
/// Matching is case-insensitive and may cross line breaks. Status words that do not follow a
/// label are left alone.
pub fn highlight_disposition_status(text: &str) -> String {
    DISPOSITION_STATUS
        .replace_all(text, |caps: &Captures<'_>| match caps.get(2) {
            Some(status) if !already_emphasised(text, status) => {
                format!("{}{EMPHASIS}{}{EMPHASIS}", &caps[1], status.as_str())
            }
            _ => caps[0].to_string(),
        })
        .into_owned()
}

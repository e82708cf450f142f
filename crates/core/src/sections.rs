//! Best-effort segmentation of generated text.
//!
//! The prompt asks the model to start each section with a literal marker (for example `###`) and
//! to wrap each consult specialty in a literal token (for example `**`). Nothing obliges the model
//! to comply, so these routines are a lexer over literal tokens rather than a grammar: they never
//! reorder or deduplicate, and a missing marker simply yields fewer sections.

use serde::Serialize;

use crate::{ScribeError, ScribeResult};

/// A titled region of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// First line after the marker. Empty for text preceding the first marker.
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Sections in parse order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionedDocument {
    sections: Vec<Section>,
}

impl SectionedDocument {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// First section whose normalised title equals `title` (case-insensitive).
    ///
    /// Surrounding whitespace, `#`, `*` and a trailing `:` are ignored on both sides, so
    /// `"**Disposition:**"` matches `"disposition"`.
    pub fn find(&self, title: &str) -> Option<&Section> {
        let wanted = normalise_title(title);
        self.sections
            .iter()
            .find(|section| normalise_title(&section.title) == wanted)
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}

impl From<Vec<Section>> for SectionedDocument {
    fn from(sections: Vec<Section>) -> Self {
        Self { sections }
    }
}

/// A specialty paired with the message addressed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsultEntry {
    pub specialty: String,
    pub message: String,
}

/// Splits `text` into sections on every literal occurrence of `marker`.
///
/// Text before the first marker becomes a section with an empty title; it is dropped when blank.
/// Every later fragment is trimmed, blank fragments are dropped, the first line becomes the
/// title and the rest the body. A fragment without a newline is all title.
///
/// If `marker` is empty or never occurs, the whole trimmed text is one untitled section.
pub fn split_sections(text: &str, marker: &str) -> SectionedDocument {
    if marker.is_empty() || !text.contains(marker) {
        tracing::debug!("section marker {:?} not found; returning single section", marker);
        let body = text.trim();
        if body.is_empty() {
            return SectionedDocument::default();
        }
        return SectionedDocument::from(vec![Section::new("", body)]);
    }

    let mut fragments = text.split(marker);
    let mut sections = Vec::new();

    if let Some(preamble) = fragments.next() {
        let preamble = preamble.trim();
        if !preamble.is_empty() {
            sections.push(Section::new("", preamble));
        }
    }

    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let section = match fragment.split_once('\n') {
            Some((title, body)) => Section::new(title.trim(), body.trim()),
            None => Section::new(fragment, ""),
        };
        sections.push(section);
    }

    SectionedDocument::from(sections)
}

/// Splits a consult section body into (specialty, message) pairs.
///
/// `body` is split on `pair_token`; text before the first token is treated as an introduction and
/// ignored. The remaining fragments alternate label, message. A trailing `:` is stripped from
/// labels and a leading `:` from messages, so both `**GI**: msg` and `**GI:** msg` parse.
///
/// # Errors
///
/// Returns `ScribeError::MalformedConsultSection` if a label has no following message, or
/// `ScribeError::InvalidInput` if `pair_token` is empty.
pub fn split_consult_entries(body: &str, pair_token: &str) -> ScribeResult<Vec<ConsultEntry>> {
    if pair_token.is_empty() {
        return Err(ScribeError::InvalidInput(
            "consult pair token cannot be empty".into(),
        ));
    }

    let fragments: Vec<&str> = body.split(pair_token).skip(1).collect();

    let mut entries = Vec::with_capacity(fragments.len() / 2);
    for pair in fragments.chunks(2) {
        let label = pair[0].trim().trim_end_matches(':').trim();
        let Some(message) = pair.get(1) else {
            return Err(ScribeError::MalformedConsultSection {
                label: label.to_string(),
            });
        };
        let message = message.trim().trim_start_matches(':').trim();
        entries.push(ConsultEntry {
            specialty: label.to_string(),
            message: message.to_string(),
        });
    }

    Ok(entries)
}

fn normalise_title(title: &str) -> String {
    title
        .trim()
        .trim_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

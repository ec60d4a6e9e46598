//! Topic labels and the filename-based topic assigner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of topic labels.
///
/// `Other` is never produced by ingesting a supported format. It only shows
/// up through classification or explicit user input, and marks a question as
/// out of domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Technology,
    People,
    Science,
    Literature,
    Other,
}

impl Topic {
    /// Every label, in the order the topic classifier lists them.
    pub const ALL: [Topic; 5] = [
        Topic::Technology,
        Topic::People,
        Topic::Science,
        Topic::Literature,
        Topic::Other,
    ];

    /// Parse a label case-insensitively. Anything outside the closed set is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::People => "People",
            Self::Science => "Science",
            Self::Literature => "Literature",
            Self::Other => "Other",
        }
    }

    /// Topics backed by at least one supported document format.
    pub fn covered() -> [Topic; 4] {
        [
            Topic::Technology,
            Topic::Science,
            Topic::People,
            Topic::Literature,
        ]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of a file name, including the leading dot.
pub(crate) fn extension_of(identifier: &str) -> Option<String> {
    let name = identifier.rsplit(['/', '\\']).next().unwrap_or(identifier);
    name.rfind('.')
        .filter(|&idx| idx > 0)
        .map(|idx| name[idx..].to_ascii_lowercase())
}

/// Assign a topic from a document identifier's extension.
///
/// The current corpus is homogeneous per format, so the extension alone
/// decides the label.
pub fn assign_topic(identifier: &str) -> Topic {
    match extension_of(identifier).as_deref() {
        Some(".pdf") => Topic::Technology,
        Some(".txt") => Topic::People,
        Some(".html") => Topic::Science,
        Some(".json") => Topic::Literature,
        _ => Topic::Other,
    }
}

//! Data model for a parsed chord chart.
//!
//! These structures are what the song view renders: titled sections made of
//! chord/lyric pairs and plain lines. They serialize to JSON for the mobile
//! shells.

use serde::{Deserialize, Serialize};

/// A chord chart split into sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordChart {
    /// Sections in document order
    pub sections: Vec<Section>,
}

/// A block of the chart, started by a marker such as `[Chorus]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Marker text with brackets kept, e.g. "[Verse 1]". `None` for content
    /// before the first marker.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Rendered lines in order
    pub lines: Vec<LineUnit>,
}

/// One rendered unit of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LineUnit {
    /// A chord line with the lyric line printed beneath it
    ChordLyricPair { chords: String, lyrics: String },
    /// Lyrics without chords, comments, blank lines and anything unclassified
    Text { content: String },
}

impl ChordChart {
    /// Number of non-marker source lines covered by the chart.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(Section::line_count).sum()
    }

    /// Section titles in order, skipping the untitled leading section.
    pub fn titles(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|s| s.title.as_deref())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Section {
    /// Create an empty section with an optional title.
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            lines: Vec::new(),
        }
    }

    /// Number of source lines in this section's body.
    pub fn line_count(&self) -> usize {
        self.lines.iter().map(LineUnit::line_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineUnit {
    /// Source lines consumed by this unit: two for a pair, one otherwise.
    pub fn line_count(&self) -> usize {
        match self {
            LineUnit::ChordLyricPair { .. } => 2,
            LineUnit::Text { .. } => 1,
        }
    }

    /// Whether this is a blank text line, rendered as vertical spacing.
    pub fn is_blank(&self) -> bool {
        matches!(self, LineUnit::Text { content } if content.trim().is_empty())
    }
}

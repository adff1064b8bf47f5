//! Chord chart parser — converts chord/lyric text into the ChordChart model.
//!
//! Lines are classified one at a time with a single line of lookahead:
//! section markers open a new section, a chord line followed by a non-chord
//! line becomes a chord/lyric pair, and everything else is plain text.
//! Parsing never fails; anything ambiguous falls back to plain text.

use std::sync::LazyLock;

use regex::Regex;

use crate::chord::starts_with_chord;
use crate::model::*;

/// Runs of two or more whitespace characters separate chords on a chord line.
static CHORD_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("spacing pattern is valid"));

/// Parse chart text into sections.
///
/// ```
/// use churchcore::{process_chord_content, LineUnit};
///
/// let sections = process_chord_content("[Verse 1]\nC       G\nHello world");
/// assert_eq!(sections.len(), 1);
/// assert_eq!(sections[0].title.as_deref(), Some("[Verse 1]"));
/// assert_eq!(
///     sections[0].lines[0],
///     LineUnit::ChordLyricPair {
///         chords: "C       G".to_string(),
///         lyrics: "Hello world".to_string(),
///     }
/// );
/// ```
pub fn process_chord_content(content: &str) -> Vec<Section> {
    if content.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let mut sections = Vec::new();
    let mut current = Section::new(None);
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // ─── Section marker ──────────────────────────────────────────
        if let Some(title) = section_marker(line) {
            if !current.is_empty() {
                sections.push(current);
            }
            current = Section::new(Some(title.to_string()));
            i += 1;
            continue;
        }

        // ─── Chord line over lyrics ──────────────────────────────────
        let next = lines.get(i + 1).copied();
        let pairs_with_next = next.is_some_and(|n| {
            !n.is_empty() && section_marker(n).is_none() && !is_likely_chord_line(n)
        });

        if pairs_with_next && is_likely_chord_line(line) {
            current.lines.push(LineUnit::ChordLyricPair {
                chords: line.to_string(),
                lyrics: next.unwrap_or_default().to_string(),
            });
            i += 2;
            continue;
        }

        // ─── Plain text ──────────────────────────────────────────────
        current.lines.push(LineUnit::Text {
            content: line.to_string(),
        });
        i += 1;
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

/// Heuristic chord-line check.
///
/// A line is likely chords when it contains a run of two or more whitespace
/// characters and at least half of the chunks between such runs start with
/// a chord. This is best-effort: short lyric lines with wide spacing can be
/// misread as chords and vice versa.
pub fn is_likely_chord_line(line: &str) -> bool {
    if line.trim().is_empty() || !CHORD_SPACING.is_match(line) {
        return false;
    }

    let chunks: Vec<&str> = CHORD_SPACING
        .split(line)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if chunks.is_empty() {
        return false;
    }

    let chord_chunks = chunks.iter().filter(|c| starts_with_chord(c)).count();
    chord_chunks * 2 >= chunks.len()
}

/// The trimmed line when it is a bracketed marker such as `[Chorus]`.
fn section_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')).then_some(trimmed)
}

impl ChordChart {
    /// Parse chart text. Equivalent to wrapping [`process_chord_content`].
    pub fn parse(content: &str) -> Self {
        Self {
            sections: process_chord_content(content),
        }
    }

    /// Serialize the chart for FFI consumers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> LineUnit {
        LineUnit::Text { content: s.to_string() }
    }

    fn pair(chords: &str, lyrics: &str) -> LineUnit {
        LineUnit::ChordLyricPair {
            chords: chords.to_string(),
            lyrics: lyrics.to_string(),
        }
    }

    #[test]
    fn chord_line_detection() {
        assert!(is_likely_chord_line("C       G       Am      F"));
        assert!(is_likely_chord_line("  G  D/F#  Em7  "));
        assert!(is_likely_chord_line("Am  x2"));
        assert!(!is_likely_chord_line("Amazing grace how sweet the sound"));
        assert!(!is_likely_chord_line("G"));
        assert!(!is_likely_chord_line(""));
        assert!(!is_likely_chord_line("     "));
        assert!(!is_likely_chord_line("hello   world   again"));
    }

    #[test]
    fn tabs_count_as_spacing() {
        assert!(is_likely_chord_line("C\t\tG"));
    }

    #[test]
    fn empty_input_has_no_sections() {
        assert!(process_chord_content("").is_empty());
    }

    #[test]
    fn no_markers_gives_one_untitled_section() {
        let sections = process_chord_content("just words\nmore words");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[0].lines, vec![text("just words"), text("more words")]);
    }

    #[test]
    fn markers_split_sections_and_keep_brackets() {
        let input = "intro note\n[Verse 1]\nC   G\nHello\n  [Chorus]  \nF   C\nSing";
        let sections = process_chord_content(input);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, None);
        assert_eq!(sections[0].lines, vec![text("intro note")]);
        assert_eq!(sections[1].title.as_deref(), Some("[Verse 1]"));
        assert_eq!(sections[1].lines, vec![pair("C   G", "Hello")]);
        assert_eq!(sections[2].title.as_deref(), Some("[Chorus]"));
        assert_eq!(sections[2].lines, vec![pair("F   C", "Sing")]);
    }

    #[test]
    fn empty_sections_are_dropped() {
        let sections = process_chord_content("[Intro]\n[Verse]\nla la");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("[Verse]"));
    }

    #[test]
    fn consecutive_chord_lines_never_pair_with_each_other() {
        let sections = process_chord_content("C   G\nAm   F\nWords here");
        assert_eq!(
            sections[0].lines,
            vec![text("C   G"), pair("Am   F", "Words here")]
        );
    }

    #[test]
    fn trailing_chord_line_is_plain_text() {
        let sections = process_chord_content("la la\nC   G");
        assert_eq!(sections[0].lines, vec![text("la la"), text("C   G")]);
    }

    #[test]
    fn chord_line_before_blank_line_stays_text() {
        let sections = process_chord_content("C   G\n\nWords");
        assert_eq!(
            sections[0].lines,
            vec![text("C   G"), text(""), text("Words")]
        );
        assert!(sections[0].lines[1].is_blank());
    }

    #[test]
    fn chord_line_never_swallows_a_marker() {
        let sections = process_chord_content("C   G\n[Chorus]\nSing");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines, vec![text("C   G")]);
        assert_eq!(sections[1].title.as_deref(), Some("[Chorus]"));
    }

    #[test]
    fn crlf_is_stripped_from_units() {
        let sections = process_chord_content("[Verse]\r\nC   G\r\nHello\r\n");
        assert_eq!(sections[0].title.as_deref(), Some("[Verse]"));
        assert_eq!(sections[0].lines, vec![pair("C   G", "Hello"), text("")]);
    }

    #[test]
    fn chart_counts_and_json() {
        let chart = ChordChart::parse("[Verse]\nC   G\nHello\n\n[Chorus]\nSing");
        assert_eq!(chart.titles(), vec!["[Verse]", "[Chorus]"]);
        assert_eq!(chart.line_count(), 4);

        let json = chart.to_json().unwrap();
        assert!(json.contains(r#""type":"chord-lyric-pair""#));
        assert!(json.contains(r#""type":"text""#));
        let back: ChordChart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chart);
    }
}

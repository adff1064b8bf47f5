//! Chord token grammar.
//!
//! A chord token is a root letter `A`-`G`, an optional `#` or `b`, and a
//! suffix built from quality and extension pieces (`m`, `maj`, `min`, `aug`,
//! `dim`, `sus`, `add`, `2 4 5 6 7 9 11 13`, `-`, `+`, `/`).
//! When the suffix ends in `/`, a following bass note is kept as part of
//! the same token so slash chords are handled as one unit. Only matches
//! that stand apart from surrounding words count as tokens.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::key::{pitch_class, Accidental};

/// Chord grammar anchored at the start of the input. Used for line classification.
pub(crate) static CHORD_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-G][#b]?(?:maj|min|aug|dim|sus|add|m|11|13|[245679]|-|\+|/)*")
        .expect("chord prefix pattern is valid")
});

/// Unanchored chord grammar used to scan a line for tokens.
static CHORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-G][#b]?(?:maj|min|aug|dim|sus|add|m|11|13|[245679]|-|\+|/)*")
        .expect("chord token pattern is valid")
});

/// A chord split into its transposable root and the untouched remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordToken<'a> {
    pub root: char,
    pub accidental: Accidental,
    /// Quality, extensions and any slash bass, exactly as written
    pub suffix: &'a str,
}

impl<'a> ChordToken<'a> {
    /// Split `token` by prefix match. Returns `None` when it does not start
    /// with a root letter.
    pub fn parse(token: &'a str) -> Option<Self> {
        let mut chars = token.char_indices();
        let (_, root) = chars.next()?;
        if !('A'..='G').contains(&root) {
            return None;
        }
        let (accidental, suffix_start) = match chars.next() {
            Some((i, '#')) => (Accidental::Sharp, i + 1),
            Some((i, 'b')) => (Accidental::Flat, i + 1),
            _ => (Accidental::Natural, root.len_utf8()),
        };
        Some(ChordToken {
            root,
            accidental,
            suffix: &token[suffix_start..],
        })
    }

    /// Pitch class of the root, 0-11.
    pub fn root_index(&self) -> u8 {
        // root is always A-G here
        pitch_class(self.root, self.accidental).unwrap_or(0)
    }
}

/// Whether the chunk starts with something in chord grammar.
pub(crate) fn starts_with_chord(chunk: &str) -> bool {
    CHORD_PREFIX.is_match(chunk)
}

/// Byte ranges of every chord token in `line`, left to right.
///
/// A token must stand on its own: it starts at the line start or after
/// whitespace, `(` or `|`, and ends at the line end or before whitespace,
/// `)` or `|`. Grammar matches inside words such as `N.C.` or `Chorus`
/// are skipped.
pub fn find_chord_tokens(line: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut pos = 0;
    while let Some(m) = CHORD_TOKEN.find_at(line, pos) {
        let end = extend_slash_bass(line, m.end());
        if opens_token(&line[..m.start()]) && closes_token(&line[end..]) {
            ranges.push(m.start()..end);
        }
        pos = end;
    }
    ranges
}

fn opens_token(before: &str) -> bool {
    before
        .chars()
        .next_back()
        .map_or(true, |c| c.is_whitespace() || c == '(' || c == '|')
}

fn closes_token(after: &str) -> bool {
    after
        .chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || c == ')' || c == '|')
}

/// Whether `text` is exactly one chord token, slash bass included.
pub fn is_chord_token(text: &str) -> bool {
    match find_chord_tokens(text).first() {
        Some(range) => range.start == 0 && range.end == text.len(),
        None => false,
    }
}

/// If the match ends in `/`, absorb a following bass note letter and accidental.
fn extend_slash_bass(line: &str, end: usize) -> usize {
    if !line[..end].ends_with('/') {
        return end;
    }
    let rest = &line[end..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if ('A'..='G').contains(&c) => match chars.next() {
            Some('#') | Some('b') => end + 2,
            _ => end + 1,
        },
        _ => end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_root_accidental_and_suffix() {
        let t = ChordToken::parse("F#m7").unwrap();
        assert_eq!(t.root, 'F');
        assert_eq!(t.accidental, Accidental::Sharp);
        assert_eq!(t.suffix, "m7");
        assert_eq!(t.root_index(), 6);

        let t = ChordToken::parse("Bbsus4").unwrap();
        assert_eq!(t.accidental, Accidental::Flat);
        assert_eq!(t.suffix, "sus4");

        assert!(ChordToken::parse("x2").is_none());
        assert!(ChordToken::parse("").is_none());
    }

    #[test]
    fn finds_tokens_and_keeps_spacing_between_them() {
        let line = "C       G       Am      F";
        let tokens: Vec<&str> = find_chord_tokens(line)
            .into_iter()
            .map(|r| &line[r])
            .collect();
        assert_eq!(tokens, vec!["C", "G", "Am", "F"]);
    }

    #[test]
    fn slash_bass_stays_inside_the_token() {
        let line = "G/B  D/F#  Cmaj7/E";
        let tokens: Vec<&str> = find_chord_tokens(line)
            .into_iter()
            .map(|r| &line[r])
            .collect();
        assert_eq!(tokens, vec!["G/B", "D/F#", "Cmaj7/E"]);
    }

    #[test]
    fn matches_inside_words_are_not_tokens() {
        let line = "N.C.    G    (To Chorus)    |Am  D7|";
        let tokens: Vec<&str> = find_chord_tokens(line)
            .into_iter()
            .map(|r| &line[r])
            .collect();
        assert_eq!(tokens, vec!["G", "Am", "D7"]);
        assert!(find_chord_tokens("Blessed be your name").is_empty());
    }

    #[test]
    fn whole_token_check() {
        assert!(is_chord_token("Am7"));
        assert!(is_chord_token("Dsus2"));
        assert!(is_chord_token("G/B"));
        assert!(!is_chord_token("Amazing"));
        assert!(!is_chord_token("[Chorus]"));
        assert!(!is_chord_token(""));
    }

    #[test]
    fn prefix_match_accepts_any_root_letter_start() {
        assert!(starts_with_chord("Am"));
        assert!(starts_with_chord("Amazing"));
        assert!(!starts_with_chord("hello"));
        assert!(!starts_with_chord(" C"));
    }
}

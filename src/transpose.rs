//! Chord transposition.
//!
//! Transposition shifts each chord root by the semitone distance between an
//! origin key and a target key. New roots are spelled with the target key's
//! sharp/flat preference; suffixes (including slash bass notes) are carried
//! through untouched. Transposing to the same key is the identity.

use crate::chord::{find_chord_tokens, is_chord_token, ChordToken};
use crate::error::ChordResult;
use crate::key::Key;
use crate::parser::is_likely_chord_line;

/// Transpose a single chord token from one key to another.
///
/// Text that does not start with a chord root is returned unchanged.
///
/// ```
/// use churchcore::transpose_chord;
///
/// assert_eq!(transpose_chord("F#m7", "D", "Eb").unwrap(), "Gm7");
/// assert_eq!(transpose_chord("N.C.", "C", "D").unwrap(), "N.C.");
/// ```
pub fn transpose_chord(token: &str, from: &str, to: &str) -> ChordResult<String> {
    let from: Key = from.parse()?;
    let to: Key = to.parse()?;
    Ok(transpose_token(token, &from, &to))
}

/// Transpose every chord in a line, leaving all other characters in place.
///
/// ```
/// use churchcore::transpose_chord_line;
///
/// let line = transpose_chord_line("C       G       Am      F", "C", "D").unwrap();
/// assert_eq!(line, "D       A       Bm      G");
/// ```
pub fn transpose_chord_line(line: &str, from: &str, to: &str) -> ChordResult<String> {
    let from: Key = from.parse()?;
    let to: Key = to.parse()?;
    Ok(transpose_line(line, &from, &to))
}

/// Transpose the chord lines of a whole chart.
///
/// Only lines that read as chords are rewritten; lyrics, comments and
/// section markers are copied verbatim, as are all line separators.
pub fn transpose_chart(text: &str, from: &str, to: &str) -> ChordResult<String> {
    let from: Key = from.parse()?;
    let to: Key = to.parse()?;
    if from.semitones_to(&to) == 0 {
        return Ok(text.to_string());
    }

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if is_transposable_line(line) {
                transpose_line(line, &from, &to)
            } else {
                line.to_string()
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn transpose_token(token: &str, from: &Key, to: &Key) -> String {
    let distance = from.semitones_to(to);
    if distance == 0 {
        return token.to_string();
    }
    match ChordToken::parse(token) {
        Some(chord) => {
            let index = (chord.root_index() + distance) % 12;
            format!("{}{}", to.spell(index), chord.suffix)
        }
        None => token.to_string(),
    }
}

fn transpose_line(line: &str, from: &Key, to: &Key) -> String {
    if from.semitones_to(to) == 0 {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 8);
    let mut last = 0;
    for range in find_chord_tokens(line) {
        out.push_str(&line[last..range.start]);
        out.push_str(&transpose_token(&line[range.clone()], from, to));
        last = range.end;
    }
    out.push_str(&line[last..]);
    out
}

/// A chart line is rewritten when the chord heuristic accepts it or when
/// every word on it is a chord (a lone `G` has no double spaces to split on).
fn is_transposable_line(line: &str) -> bool {
    if is_likely_chord_line(line) {
        return true;
    }
    let mut words = line.split_whitespace().peekable();
    words.peek().is_some() && words.all(is_chord_token)
}

//! Tagged classification of raw markup tokens
//!
//! Raw strings coming out of either source family are classified once into
//! a [`Token`] and never inspected as free text again.

use crate::config::MarkupRules;

/// A classified raw token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A reference to a character; `silent` when flagged with the non-speaking marker
    Reference { name: String, silent: bool },
    /// A scene boundary marker
    Marker(SceneMarker),
    /// Carries no information
    Noise,
}

/// The leading marker of a scene unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMarker {
    /// A bare scene number as printed in the source
    Numbered(u32),
    /// A scene number followed by the unchanged-cast symbol
    Unchanged(u32),
    /// Anything else: a scene inserted to mark an entrance or exit
    Inserted,
}

impl MarkupRules {
    /// True if the token is one of the agreed noise tokens
    pub fn is_noise(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        self.noise_tokens.iter().any(|n| n.trim() == trimmed)
    }

    /// Trim whitespace and decorative symbols from both ends
    pub fn strip_decorations<'a>(&self, raw: &'a str) -> &'a str {
        raw.trim_matches(|c: char| c.is_whitespace() || self.decorative_symbols.contains(&c))
    }

    /// Parse a numeric scene marker (`12`, `12.`, `12*`, `12 *`)
    ///
    /// Returns `None` when the text does not start with a number or has
    /// anything but the unchanged-cast symbol after it.
    pub fn numeric_marker(&self, raw: &str) -> Option<SceneMarker> {
        let trimmed = raw.trim();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if digits_end == 0 {
            return None;
        }
        let number: u32 = trimmed[..digits_end].parse().ok()?;
        let rest = trimmed[digits_end..].trim_start_matches('.').trim();

        if rest.is_empty() {
            Some(SceneMarker::Numbered(number))
        } else if rest.chars().all(|c| c == self.no_change_symbol || c.is_whitespace()) {
            Some(SceneMarker::Unchanged(number))
        } else {
            None
        }
    }

    /// Classify a scene unit's leading marker; anything non-numeric is an inserted scene
    pub fn classify_marker(&self, raw: &str) -> SceneMarker {
        self.numeric_marker(raw).unwrap_or(SceneMarker::Inserted)
    }

    /// Classify one declared-cast line
    pub fn classify_cast_line(&self, raw: &str) -> Token {
        if self.is_noise(raw) {
            return Token::Noise;
        }

        let (text, silent) = match find_ignore_ascii_case(raw, &self.non_speaking_marker) {
            Some(pos) if !self.non_speaking_marker.is_empty() => {
                let mut text = String::with_capacity(raw.len());
                text.push_str(&raw[..pos]);
                text.push_str(&raw[pos + self.non_speaking_marker.len()..]);
                (text, true)
            }
            _ => (raw.to_string(), false),
        };

        let name = self.strip_decorations(&text);
        if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
            return Token::Noise;
        }

        Token::Reference {
            name: name.to_string(),
            silent,
        }
    }

    /// Classify a line inside a plain-text scene unit: a numeric marker or a cast line
    pub fn classify_unit_line(&self, raw: &str) -> Token {
        match self.numeric_marker(raw) {
            Some(marker) => Token::Marker(marker),
            None => self.classify_cast_line(raw),
        }
    }

    /// Classify one speaker reference taken from a compound reference
    pub fn classify_speaker(&self, raw: &str) -> Token {
        let name = self.strip_decorations(raw);
        if name.is_empty() || self.is_noise(name) {
            Token::Noise
        } else {
            Token::Reference {
                name: name.to_string(),
                silent: false,
            }
        }
    }
}

/// Split a compound multi-speaker reference (`"#a #b"`) into its parts
pub fn split_compound(raw: &str) -> impl Iterator<Item = &str> {
    raw.split_whitespace()
}

/// Byte offset of an ASCII needle in the haystack, ignoring ASCII case
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

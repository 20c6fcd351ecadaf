//! Text normalization shared by catalog terms and utterances
//!
//! Arabic terms match as substrings so attached articles and prefixes
//! ("الكنبة", "بالأحمر") still hit; Latin terms match whole words only.
//! Both sides of every comparison must go through [`normalize`]. Folding
//! covers the Arabic letter variants that users type interchangeably plus
//! the optional diacritics.

use serde::{Deserialize, Serialize};

/// Letter variants folded to a canonical form.
const LETTER_FOLDS: &[(char, char)] = &[
    ('أ', 'ا'),
    ('إ', 'ا'),
    ('آ', 'ا'),
    ('ٱ', 'ا'),
    ('ة', 'ه'),
    ('ى', 'ي'),
];

/// Tashkeel (fathatan through sukun) and tatweel carry no matching signal.
fn is_ignorable(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0640}')
}

fn fold_letter(c: char) -> char {
    LETTER_FOLDS
        .iter()
        .find_map(|&(variant, canonical)| (variant == c).then_some(canonical))
        .unwrap_or(c)
}

/// Lower-case, trim, fold letter variants, drop diacritics and collapse
/// whitespace runs to a single space.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !is_ignorable(*c))
        .flat_map(char::to_lowercase)
        .map(fold_letter)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the normalized form of `term` occurs in an already normalized text.
pub fn contains_term(normalized_text: &str, term: &str) -> bool {
    let term = normalize(term);
    if term.is_empty() {
        return false;
    }
    if term.chars().any(|c| c.is_ascii_alphabetic()) {
        contains_words(normalized_text, &term)
    } else {
        normalized_text.contains(&term)
    }
}

/// Word-sequence match; the last word may carry a plural "s" or "es".
fn contains_words(text: &str, term: &str) -> bool {
    let needle = words(term);
    let haystack = words(text);
    let Some((last, leading)) = needle.split_last() else {
        return false;
    };

    haystack.windows(needle.len()).any(|window| {
        let Some((candidate, rest)) = window.split_last() else {
            return false;
        };
        rest == leading
            && candidate
                .strip_prefix(last)
                .is_some_and(|suffix| matches!(suffix, "" | "s" | "es"))
    })
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Reply language for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Arabic,
    English,
}

impl Language {
    /// Arabic script anywhere wins; otherwise any Latin letter means English.
    /// Returns `None` for text with neither (digits, punctuation, emoji) so
    /// the caller can keep the previous turn's language.
    pub fn detect(text: &str) -> Option<Self> {
        if text.chars().any(is_arabic_script) {
            Some(Language::Arabic)
        } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
            Some(Language::English)
        } else {
            None
        }
    }
}

fn is_arabic_script(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

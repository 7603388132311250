//! Vietnamese Telex conversion.
//!
//! Letter pairs produce the modified vowels and đ (`aw` → ă, `aa` → â,
//! `dd` → đ, `ee` → ê, `oo` → ô, `ow` → ơ, `uw` → ư). Once a vowel has been
//! typed, the tone keys `z f r x s j` set the tone of the word (`z` clears
//! it). The tone lands on the vowel carrying a diacritic if there is one,
//! otherwise on the last vowel, or on the one before it when the word ends
//! with a vowel.
//!
//! Tones are applied as combining marks and recomposed with NFC, so any
//! base vowel the pair table produces can carry any tone.

use phf::phf_map;
use smartkbd_core::Converter;
use unicode_normalization::UnicodeNormalization;

static PAIRS: phf::Map<&'static str, char> = phf_map! {
    "aw" => 'ă', "aa" => 'â', "dd" => 'đ', "ee" => 'ê', "oo" => 'ô', "ow" => 'ơ', "uw" => 'ư',
    "Aw" => 'Ă', "Aa" => 'Â', "Dd" => 'Đ', "Ee" => 'Ê', "Oo" => 'Ô', "Ow" => 'Ơ', "Uw" => 'Ư',
    "AW" => 'Ă', "AA" => 'Â', "DD" => 'Đ', "EE" => 'Ê', "OO" => 'Ô', "OW" => 'Ơ', "UW" => 'Ư',
};

static TONE_KEYS: phf::Map<char, Tone> = phf_map! {
    'z' => Tone::Level,
    'f' => Tone::Grave,
    'r' => Tone::Hook,
    'x' => Tone::Tilde,
    's' => Tone::Acute,
    'j' => Tone::Dot,
};

/// Vowels that can carry a tone, without tone marks.
const BASE_VOWELS: &str = "aăâeêioôơuưyAĂÂEÊIOÔƠUƯY";

/// Base vowels whose own diacritic attracts the tone.
const DIACRITIC_VOWELS: &str = "ăâêôơưĂÂÊÔƠƯ";

/// Combining marks used for the five tones.
const TONE_MARKS: [char; 5] = ['\u{0300}', '\u{0309}', '\u{0303}', '\u{0301}', '\u{0323}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Level,
    Grave,
    Hook,
    Tilde,
    Acute,
    Dot,
}

impl Tone {
    fn mark(self) -> Option<char> {
        match self {
            Tone::Level => None,
            Tone::Grave => Some(TONE_MARKS[0]),
            Tone::Hook => Some(TONE_MARKS[1]),
            Tone::Tilde => Some(TONE_MARKS[2]),
            Tone::Acute => Some(TONE_MARKS[3]),
            Tone::Dot => Some(TONE_MARKS[4]),
        }
    }

    fn from_key(c: char) -> Option<Tone> {
        c.to_lowercase()
            .next()
            .and_then(|lower| TONE_KEYS.get(&lower).copied())
    }
}

/// Telex converter for the composing word.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelexConverter;

impl TelexConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for TelexConverter {
    fn convert(&self, typed: &str, output: &mut String) {
        let input: Vec<char> = typed.chars().collect();
        let mut word: Vec<char> = Vec::with_capacity(input.len());
        let mut tone = Tone::Level;
        let mut tone_index: Option<usize> = None;
        let mut prev_vowel: Option<usize> = None;
        let mut diacritic_vowel: Option<usize> = None;

        // First pass: fold pairs and pull out tone keys
        let mut i = 0;
        while i < input.len() {
            let mut cur = input[i];
            if let Some(&next) = input.get(i + 1) {
                let pair: String = [cur, next].iter().collect();
                if let Some(&folded) = PAIRS.get(pair.as_str()) {
                    cur = folded;
                    i += 1;
                }
            }

            let base = strip_tone(cur);
            if is_base_vowel(base) {
                prev_vowel = tone_index;
                tone_index = Some(word.len());
                if DIACRITIC_VOWELS.contains(base) {
                    diacritic_vowel = Some(word.len());
                }
                word.push(cur);
            } else if let Some(t) = tone_index.and_then(|_| Tone::from_key(cur)) {
                tone = t;
            } else {
                word.push(cur);
            }
            i += 1;
        }

        if diacritic_vowel.is_some() {
            tone_index = diacritic_vowel;
        } else if tone_index.is_some()
            && tone_index == word.len().checked_sub(1)
            && prev_vowel.is_some()
        {
            tone_index = prev_vowel;
        }

        // Second pass: place the tone
        for (i, &c) in word.iter().enumerate() {
            if Some(i) == tone_index {
                output.push_str(&apply_tone(c, tone));
            } else {
                output.push(c);
            }
        }
    }
}

fn is_base_vowel(c: char) -> bool {
    BASE_VOWELS.contains(c)
}

/// Remove a tone mark, keeping breve, circumflex and horn.
fn strip_tone(c: char) -> char {
    let stripped: String = c
        .to_string()
        .nfd()
        .filter(|m| !TONE_MARKS.contains(m))
        .nfc()
        .collect();
    let mut chars = stripped.chars();
    match (chars.next(), chars.next()) {
        (Some(base), None) => base,
        _ => c,
    }
}

fn apply_tone(c: char, tone: Tone) -> String {
    let base = strip_tone(c);
    match tone.mark() {
        Some(mark) => [base, mark].iter().collect::<String>().nfc().collect(),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telex(typed: &str) -> String {
        let mut out = String::new();
        TelexConverter.convert(typed, &mut out);
        out
    }

    #[test]
    fn test_pairs() {
        assert_eq!(telex("dd"), "đ");
        assert_eq!(telex("Dduwowng"), "Đương");
        assert_eq!(telex("AA"), "Â");
    }

    #[test]
    fn test_tone_on_diacritic_vowel() {
        assert_eq!(telex("vieetj"), "việt");
        assert_eq!(telex("ddaauf"), "đầu");
    }

    #[test]
    fn test_tone_moves_back_when_word_ends_in_vowel() {
        assert_eq!(telex("chaof"), "chào");
        assert_eq!(telex("hoaf"), "hòa");
    }

    #[test]
    fn test_single_vowel() {
        assert_eq!(telex("as"), "á");
        assert_eq!(telex("Ax"), "Ã");
    }

    #[test]
    fn test_tone_key_before_any_vowel_is_literal() {
        assert_eq!(telex("s"), "s");
        assert_eq!(telex("sa"), "sa");
    }

    #[test]
    fn test_z_clears_tone() {
        assert_eq!(telex("asz"), "a");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(telex(""), "");
    }
}

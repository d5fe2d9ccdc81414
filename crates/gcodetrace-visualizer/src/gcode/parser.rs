//! Semantic line parser
//!
//! Builds a [`ParsedLine`] from the token stream: line number and checksum
//! are pulled out, the checksum is verified against the raw line, and word
//! arguments become numbers where they parse cleanly.

use serde::{Deserialize, Serialize};

use super::tokenizer::{parse_number, scan_line, scan_line_into, TokenSet};

/// Argument of a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordValue {
    Numeric(f64),
    /// Dialect payloads and arguments that are not plain numbers
    Raw(String),
}

impl WordValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Raw(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Raw(s) => Some(s),
            Self::Numeric(_) => None,
        }
    }
}

/// One word of a parsed line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub letter: char,
    pub value: WordValue,
}

/// Result of [`parse_line`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLine {
    /// Source text as given
    pub line: String,
    pub words: Vec<Word>,
    pub line_number: Option<u32>,
    pub checksum: Option<u32>,
    /// Checksum present and mismatched
    pub err: bool,
    pub has_invalid_tokens: bool,
}

impl ParsedLine {
    pub fn is_valid(&self) -> bool {
        !self.err && !self.has_invalid_tokens
    }

    /// First word carrying `letter`
    pub fn word(&self, letter: char) -> Option<&WordValue> {
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| &w.value)
    }
}

/// Options for [`parse_line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compare a `*nn` terminator against the computed checksum
    pub validate_checksum: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            validate_checksum: true,
        }
    }
}

/// XOR of every byte before the `*nn` terminator of `line`.
///
/// Computed over the raw text, spacing and case included. The terminator is
/// the first `*` outside comments; lines without one are checksummed in full.
pub fn compute_checksum(line: &str) -> u32 {
    checksum_of(line, &scan_line(line))
}

fn checksum_of(line: &str, tokens: &TokenSet) -> u32 {
    let body = match tokens.checksum_offset {
        Some(at) => &line[..at],
        None => line,
    };
    body.bytes().fold(0u8, |acc, b| acc ^ b) as u32
}

/// Whether the `*nn` terminator matches; `None` when the line carries none
pub fn verify_checksum(line: &str, tokens: &TokenSet) -> Option<Result<(), (u32, u32)>> {
    let expected = tokens.find('*')?.parse::<u32>().ok()?;
    let computed = checksum_of(line, tokens);
    Some(if expected == computed {
        Ok(())
    } else {
        Err((expected, computed))
    })
}

/// Parse one line into words with numeric arguments resolved
pub fn parse_line(line: &str, options: &ParseOptions) -> ParsedLine {
    let mut tokens = TokenSet::new();
    scan_line_into(line, &mut tokens);
    build_parsed_line(line, &tokens, options)
}

pub(crate) fn build_parsed_line(
    line: &str,
    tokens: &TokenSet,
    options: &ParseOptions,
) -> ParsedLine {
    let mut line_number = tokens.line_number;
    let mut checksum = None;
    let mut words = Vec::with_capacity(tokens.len());

    for (letter, raw) in tokens.iter() {
        match letter {
            'N' if line_number.is_none() => match raw.parse::<u32>() {
                Ok(n) => line_number = Some(n),
                Err(_) => words.push(raw_word(letter, raw)),
            },
            '*' if checksum.is_none() => checksum = raw.parse::<u32>().ok(),
            '$' | '%' | '{' => words.push(raw_word(letter, raw)),
            _ => words.push(match parse_number(raw) {
                Some(v) => Word {
                    letter,
                    value: WordValue::Numeric(v),
                },
                None => raw_word(letter, raw),
            }),
        }
    }

    let err = options.validate_checksum
        && checksum.is_some_and(|expected| expected != checksum_of(line, tokens));

    ParsedLine {
        line: line.to_string(),
        words,
        line_number,
        checksum,
        err,
        has_invalid_tokens: tokens.has_invalid_tokens,
    }
}

fn raw_word(letter: char, raw: &str) -> Word {
    Word {
        letter,
        value: WordValue::Raw(raw.to_string()),
    }
}

//! Line tokenizer
//!
//! Lexes one line of G-code into `(letter, raw value)` words without any
//! knowledge of machine state. Recognized shapes, in priority order:
//!
//! - `%...` dialect command, consumes the rest of the line
//! - `{...}` JSON command, consumes the rest of the line
//! - `$$`, `$<ident>` and `$<ident>=<payload>` Grbl commands and settings
//! - `<letter><signed number>` standard words
//! - `*<digits>` checksum terminator
//!
//! Comments (`(...)` and `;` to end of line) are skipped while scanning.
//! Anything unexpected raises [`TokenSet::has_invalid_tokens`] and scanning
//! carries on with the next character.

use std::ops::Range;

/// Letters accepted as machine words.
pub const WORD_LETTERS: &[u8] = b"NGMXYZHILTPAJKFRS";

/// Whether `letter` (uppercase) belongs to the accepted machine-word alphabet
#[inline]
pub fn is_word_letter(letter: u8) -> bool {
    WORD_LETTERS.contains(&letter)
}

#[inline]
fn is_number_byte(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-')
}

/// Tokens scanned from one line.
///
/// Letters and values are kept as parallel arrays; values live in a single
/// shared text buffer so a reused `TokenSet` stops allocating once warm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    letters: Vec<u8>,
    spans: Vec<Range<u32>>,
    text: String,
    /// Value of a leading `N` word, consumed rather than emitted.
    pub line_number: Option<u32>,
    /// Set when an unknown letter, a bare letter, or a stray character was seen.
    pub has_invalid_tokens: bool,
    /// Byte offset of the first `*nn` checksum terminator
    pub checksum_offset: Option<usize>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for the next line while keeping allocated capacity
    pub fn clear(&mut self) {
        self.letters.clear();
        self.spans.clear();
        self.text.clear();
        self.line_number = None;
        self.has_invalid_tokens = false;
        self.checksum_offset = None;
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Letter of token `index` (uppercase, or one of `$ % { *`)
    pub fn letter(&self, index: usize) -> char {
        self.letters[index] as char
    }

    /// Raw value of token `index`
    pub fn value(&self, index: usize) -> &str {
        let span = &self.spans[index];
        &self.text[span.start as usize..span.end as usize]
    }

    /// Value of token `index` as a number, when it parses cleanly
    pub fn number(&self, index: usize) -> Option<f64> {
        parse_number(self.value(index))
    }

    /// Iterate over `(letter, raw value)` pairs in line order
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        (0..self.len()).map(move |i| (self.letter(i), self.value(i)))
    }

    /// First token carrying `letter`
    pub fn find(&self, letter: char) -> Option<&str> {
        self.iter().find(|(l, _)| *l == letter).map(|(_, v)| v)
    }

    /// Whether any token carries `letter`
    pub fn contains(&self, letter: char) -> bool {
        self.letters.iter().any(|&l| l as char == letter)
    }

    fn push(&mut self, letter: u8, value: &str) {
        let start = self.text.len() as u32;
        self.text.push_str(value);
        self.letters.push(letter);
        self.spans.push(start..self.text.len() as u32);
    }
}

/// Parse a word argument made of digits, sign and decimal point
pub fn parse_number(value: &str) -> Option<f64> {
    if value.is_empty() || !value.bytes().all(is_number_byte) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reusable line scanner.
///
/// Holds the scratch [`TokenSet`] so callers scanning a whole file pay for
/// buffer growth once.
#[derive(Debug, Default)]
pub struct Tokenizer {
    tokens: TokenSet,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `line` into the internal buffer and borrow the result
    pub fn scan(&mut self, line: &str) -> &TokenSet {
        scan_line_into(line, &mut self.tokens);
        &self.tokens
    }

    /// Move the scratch buffer out, leaving an empty one behind
    pub fn take_tokens(&mut self) -> TokenSet {
        std::mem::take(&mut self.tokens)
    }

    /// Hand a buffer back so its capacity is reused
    pub fn restore_tokens(&mut self, tokens: TokenSet) {
        self.tokens = tokens;
    }
}

/// Scan one line into a freshly allocated [`TokenSet`]
pub fn scan_line(line: &str) -> TokenSet {
    let mut tokens = TokenSet::new();
    scan_line_into(line, &mut tokens);
    tokens
}

/// Scan one line into `out`, replacing its previous contents
pub fn scan_line_into(line: &str, out: &mut TokenSet) {
    out.clear();

    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,

            b'(' => {
                i = match bytes[i + 1..].iter().position(|&c| c == b')') {
                    Some(offset) => i + 1 + offset + 1,
                    None => len,
                };
            }

            b';' => break,

            b'%' => {
                out.push(b'%', line[i + 1..].trim());
                break;
            }

            b'{' => {
                out.push(b'{', line[i..].trim_end());
                break;
            }

            b'$' => {
                if bytes.get(i + 1) == Some(&b'$') {
                    out.push(b'$', "$");
                    i += 2;
                    continue;
                }
                let mut j = i + 1;
                while j < len && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'#') {
                    j += 1;
                }
                if j < len && bytes[j] == b'=' {
                    out.push(b'$', line[i + 1..].trim_end());
                    break;
                }
                if j == i + 1 {
                    out.has_invalid_tokens = true;
                } else {
                    out.push(b'$', &line[i + 1..j]);
                }
                i = j;
            }

            b'*' => {
                let mut j = i + 1;
                while j < len && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j == i + 1 {
                    out.has_invalid_tokens = true;
                } else {
                    if out.checksum_offset.is_none() {
                        out.checksum_offset = Some(i);
                    }
                    out.push(b'*', &line[i + 1..j]);
                }
                i = j;
            }

            c if c.is_ascii_alphabetic() => {
                let letter = c.to_ascii_uppercase();
                let mut j = i + 1;
                while j < len && is_number_byte(bytes[j]) {
                    j += 1;
                }
                if j == i + 1 {
                    out.has_invalid_tokens = true;
                    i += 1;
                    continue;
                }

                let value = &line[i + 1..j];
                if letter == b'N' && out.is_empty() && out.line_number.is_none() {
                    match value.parse::<u32>() {
                        Ok(n) => out.line_number = Some(n),
                        Err(_) => out.has_invalid_tokens = true,
                    }
                } else {
                    if !is_word_letter(letter) {
                        out.has_invalid_tokens = true;
                    }
                    out.push(letter, value);
                }
                i = j;
            }

            _ => {
                out.has_invalid_tokens = true;
                i += line[i..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
}

//! Tab-separated word list sources.
//!
//! Each data line is `wordform[\tcount[\tcomment]]`. Lines may end in LF or
//! CRLF, comment lines start with `#` in the first column, and any line may
//! begin with a byte-order mark since sources are sometimes concatenated.
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use hashbrown::HashSet;
use smol_str::SmolStr;
use unicode_normalization::UnicodeNormalization;

use super::{WordList, WordListError};
use crate::types::Weight;

const BOM: char = '\u{FEFF}';

/// Text encodings a word list may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, with or without a byte-order mark
    Utf8,
    /// UTF-16, little endian, with a byte-order mark
    Utf16Le,
}

pub fn detect_encoding(bytes: &[u8]) -> Result<Encoding, WordListError> {
    match bytes {
        [0xFF, 0xFE, ..] => Ok(Encoding::Utf16Le),
        [0xFE, 0xFF, ..] => Err(WordListError::UnsupportedEncoding("UTF-16BE")),
        _ => Ok(Encoding::Utf8),
    }
}

/// Decodes a word list source into text. Byte-order marks are left for the
/// line parser to strip.
pub fn decode(bytes: &[u8]) -> Result<String, WordListError> {
    match detect_encoding(bytes)? {
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(WordListError::InvalidUtf8),
        Encoding::Utf16Le => {
            if bytes.len() % 2 != 0 {
                return Err(WordListError::InvalidUtf16);
            }

            let mut units = vec![0u16; bytes.len() / 2];
            LittleEndian::read_u16_into(bytes, &mut units);

            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|_| WordListError::InvalidUtf16)
        }
    }
}

/// Reads the leading run of digits, so `"5 times"` counts 5. Blank, negative
/// or otherwise unreadable counts are a single occurrence.
fn parse_count(text: &str) -> Weight {
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse::<Weight>().unwrap_or(1)
}

/// Parses `contents` into `wordlist`, merging with any existing entries.
pub fn parse_wordlist_str(wordlist: &mut WordList, source_name: &str, contents: &str) {
    let mut seen_in_source: HashSet<SmolStr> = HashSet::new();

    for (i, line) in contents.split('\n').enumerate() {
        let lineno = i + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line = line.trim_start_matches(BOM).trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.split('\t');
        let original = columns.next().unwrap_or_default();
        let count_text = columns.next().unwrap_or_default().trim();

        let normalized: String = original.nfc().collect();
        if normalized != original {
            log::warn!(
                "{}:{}: \"{}\" is not in Unicode NFC; converting",
                source_name,
                lineno,
                normalized
            );
        }

        let wordform = normalized.trim();
        if wordform.is_empty() {
            log::warn!("{}:{}: empty word-form; skipping line", source_name, lineno);
            continue;
        }

        let count = parse_count(count_text);

        let wordform = SmolStr::from(wordform);
        if !seen_in_source.insert(wordform.clone()) {
            log::warn!(
                "{}:{}: duplicate word \"{}\" in same source; summing counts",
                source_name,
                lineno,
                wordform
            );
        }

        wordlist.insert(wordform, count);
    }
}

pub fn parse_wordlist_bytes(
    wordlist: &mut WordList,
    source_name: &str,
    bytes: &[u8],
) -> Result<(), WordListError> {
    let contents = decode(bytes)?;
    parse_wordlist_str(wordlist, source_name, &contents);
    Ok(())
}

pub fn parse_wordlist_file<P: AsRef<Path>>(
    wordlist: &mut WordList,
    path: P,
) -> Result<(), WordListError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| WordListError::Io(path.to_path_buf(), e))?;
    parse_wordlist_bytes(wordlist, &path.to_string_lossy(), &bytes)
}

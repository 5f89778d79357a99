//! Character set handling for template content.
//! A [`Charset`] is validated when it is created, so an unsupported name is
//! reported while reading a manifest or configuration rather than mid-render.
//! Decoding and encoding are strict: malformed input or unmappable output is
//! an error instead of a silently substituted character.
//! WHATWG labels fold `US-ASCII` and `ISO-8859-1` into windows-1252, so these
//! two are recognized first and kept to their own repertoire.

use crate::error::{Error, Result};
use encoding_rs::{mem, Encoding};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

const ASCII_LABELS: [&str; 11] = [
    "us-ascii",
    "ascii",
    "us_ascii",
    "iso646-us",
    "ansi_x3.4-1968",
    "cp367",
    "ibm367",
    "us",
    "iso-ir-6",
    "csascii",
    "646",
];

const LATIN1_LABELS: [&str; 13] = [
    "iso-8859-1",
    "iso8859-1",
    "iso88591",
    "iso_8859-1:1987",
    "iso_8859-1",
    "iso8859_1",
    "8859_1",
    "latin1",
    "l1",
    "iso-ir-100",
    "cp819",
    "ibm819",
    "csisolatin1",
];

/// Characters a charset can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repertoire {
    /// U+0000 to U+007F, one byte each
    Ascii,
    /// U+0000 to U+00FF, one byte each
    Latin1,
    /// Whatever the WHATWG encoding defines
    Whatwg,
}

impl Repertoire {
    fn for_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if ASCII_LABELS.contains(&label.as_str()) {
            Repertoire::Ascii
        } else if LATIN1_LABELS.contains(&label.as_str()) {
            Repertoire::Latin1
        } else {
            Repertoire::Whatwg
        }
    }
}

/// A validated character set together with the label it was declared with.
#[derive(Clone)]
pub struct Charset {
    label: String,
    encoding: &'static Encoding,
    repertoire: Repertoire,
}

impl Charset {
    /// Resolves a character set label such as `UTF-8` or `ISO-8859-1`.
    ///
    /// # Errors
    /// * `Error::UnsupportedEncodingError` if the label is unknown
    pub fn for_label<S: AsRef<str>>(label: S) -> Result<Self> {
        let label = label.as_ref().trim();
        let repertoire = Repertoire::for_label(label);
        let encoding = match repertoire {
            Repertoire::Ascii | Repertoire::Latin1 => Some(encoding_rs::WINDOWS_1252),
            Repertoire::Whatwg => Encoding::for_label(label.as_bytes()),
        };
        match encoding {
            Some(encoding) if encoding != encoding_rs::REPLACEMENT => {
                Ok(Self { label: label.to_string(), encoding, repertoire })
            }
            _ => Err(Error::UnsupportedEncodingError(label.to_string())),
        }
    }

    /// UTF-8
    pub fn utf8() -> Self {
        Self {
            label: encoding_rs::UTF_8.name().to_string(),
            encoding: encoding_rs::UTF_8,
            repertoire: Repertoire::Whatwg,
        }
    }

    /// The label this charset was declared with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical name of the underlying encoding.
    pub fn name(&self) -> &'static str {
        match self.repertoire {
            Repertoire::Ascii => "US-ASCII",
            Repertoire::Latin1 => "ISO-8859-1",
            Repertoire::Whatwg => self.encoding.name(),
        }
    }

    /// Decodes `bytes`, keeping any byte order mark as a character.
    ///
    /// Returns `None` if the input is not well-formed in this charset.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self.repertoire {
            Repertoire::Ascii if mem::is_ascii(bytes) => {
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            Repertoire::Ascii => None,
            Repertoire::Latin1 => Some(mem::decode_latin1(bytes)),
            Repertoire::Whatwg => {
                self.encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    /// Encodes `text` in this charset.
    ///
    /// Returns `None` if a character cannot be represented.
    pub fn encode<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        match self.repertoire {
            Repertoire::Ascii if text.is_ascii() => return Some(Cow::Borrowed(text.as_bytes())),
            Repertoire::Latin1 if mem::is_str_latin1(text) => {
                return Some(mem::encode_latin1_lossy(text))
            }
            Repertoire::Ascii | Repertoire::Latin1 => return None,
            Repertoire::Whatwg => {}
        }
        if self.encoding == encoding_rs::UTF_16LE {
            return Some(Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()));
        }
        if self.encoding == encoding_rs::UTF_16BE {
            return Some(Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()));
        }
        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            None
        } else {
            Some(bytes)
        }
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding && self.repertoire == other.repertoire
    }
}

impl Eq for Charset {}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.label)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::for_label(s)
    }
}

impl TryFrom<String> for Charset {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::for_label(value)
    }
}

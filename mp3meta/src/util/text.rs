use crate::error::{ErrorKind, Mp3MetaError, Result};

/// The text encoding for use in ID3v2 frames
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark, written little endian
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// Encodings tried in order when a string arrives without one
	pub(crate) const FALLBACK_ORDER: [Self; 4] =
		[Self::Latin1, Self::UTF16BE, Self::UTF16, Self::UTF8];

	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	pub(crate) fn try_from_u8(byte: u8) -> Result<Self> {
		Self::from_u8(byte).ok_or_else(|| {
			Mp3MetaError::new(
				ErrorKind::InvalidEncoding,
				format!("Invalid text encoding {byte}"),
			)
		})
	}

	/// The byte order mark written before text in this encoding, empty for single-byte encodings
	pub fn bom(self) -> &'static [u8] {
		match self {
			Self::UTF16 => &[0xFF, 0xFE],
			Self::UTF16BE => &[0xFE, 0xFF],
			Self::Latin1 | Self::UTF8 => &[],
		}
	}

	/// The string terminator for this encoding
	pub fn terminator(self) -> &'static [u8] {
		match self {
			Self::UTF16 | Self::UTF16BE => &[0, 0],
			Self::Latin1 | Self::UTF8 => &[0],
		}
	}

	/// Encode `text`, returning `None` if a character cannot be represented
	pub(crate) fn encode(self, text: &str) -> Option<Vec<u8>> {
		match self {
			Self::Latin1 => latin1_encode(text),
			Self::UTF16 => Some(utf16_encode(text, u16::to_le_bytes)),
			Self::UTF16BE => Some(utf16_encode(text, u16::to_be_bytes)),
			Self::UTF8 => Some(text.as_bytes().to_vec()),
		}
	}

	/// Decode a payload that has no BOM or terminator, returning `None` if it is malformed
	pub(crate) fn decode(self, bytes: &[u8]) -> Option<String> {
		match self {
			Self::Latin1 => Some(latin1_decode(bytes)),
			Self::UTF16 => utf16_decode_bytes(bytes, u16::from_le_bytes),
			Self::UTF16BE => utf16_decode_bytes(bytes, u16::from_be_bytes),
			Self::UTF8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
		}
	}
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	bytes.iter().map(|c| *c as char).collect::<String>()
}

pub(crate) fn latin1_encode(text: &str) -> Option<Vec<u8>> {
	text.chars()
		.map(|c| u8::try_from(u32::from(c)).ok())
		.collect()
}

pub(crate) fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> Option<String> {
	if bytes.len() % 2 != 0 {
		return None;
	}

	let words = bytes
		.chunks_exact(2)
		.map(|c| endianness([c[0], c[1]]))
		.collect::<Vec<u16>>();

	String::from_utf16(&words).ok()
}

fn utf16_encode(text: &str, endianness: fn(u16) -> [u8; 2]) -> Vec<u8> {
	let mut encoded = Vec::with_capacity(text.len() * 2);
	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	encoded
}

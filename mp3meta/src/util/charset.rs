//! Charset detection for text whose declared encoding can't be trusted

use crate::util::text::latin1_decode;

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, WINDOWS_1252};

/// Decode text stored under the ISO-8859-1 marker
///
/// * A byte order mark wins outright
/// * Valid UTF-8 is read as UTF-8
/// * Anything else is handed to [`EncodingDetector`]
///
/// The text is read as ISO-8859-1 when the detector only has its Western default to offer, or
/// when its guess can't decode the bytes.
///
/// Returns `None` if a byte order mark is followed by malformed text.
pub(crate) fn decode_legacy(bytes: &[u8]) -> Option<String> {
	if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
		return encoding
			.decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
			.map(Cow::into_owned);
	}

	if let Ok(text) = std::str::from_utf8(bytes) {
		return Some(text.to_owned());
	}

	Some(detect(bytes).unwrap_or_else(|| latin1_decode(bytes)))
}

fn detect(bytes: &[u8]) -> Option<String> {
	let mut detector = EncodingDetector::new();
	detector.feed(bytes, true);

	let encoding = detector.guess(None, false);
	if encoding == WINDOWS_1252 {
		return None;
	}

	let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
	log::debug!("Decoding ISO-8859-1 marked text as {}", encoding.name());

	Some(text.into_owned())
}

#[cfg(test)]
mod tests {
	use super::decode_legacy;

	#[test_log::test]
	fn byte_order_marks() {
		assert_eq!(decode_legacy(&[0xFE, 0xFF, 0x00, 0x41]).as_deref(), Some("A"));
		assert_eq!(decode_legacy(&[0xFF, 0xFE, 0x41, 0x00]).as_deref(), Some("A"));
		assert_eq!(decode_legacy(&[0xEF, 0xBB, 0xBF, 0x41]).as_deref(), Some("A"));
		// Odd length after a UTF-16 BOM
		assert_eq!(decode_legacy(&[0xFF, 0xFE, 0x41]), None);
	}

	#[test_log::test]
	fn utf8_and_ascii() {
		assert_eq!(decode_legacy(b"plain ascii").as_deref(), Some("plain ascii"));
		assert_eq!(decode_legacy("l\u{00f8}ft".as_bytes()).as_deref(), Some("l\u{00f8}ft"));
		assert_eq!(decode_legacy(&[]).as_deref(), Some(""));
		// Embedded nulls are not mistaken for UTF-16
		assert_eq!(decode_legacy(&[0x41, 0x00, 0x42, 0x00]).as_deref(), Some("A\0B\0"));
	}

	#[test_log::test]
	fn windows_1251() {
		// "Привет"
		let bytes = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
		assert_eq!(decode_legacy(&bytes).as_deref(), Some("\u{41f}\u{440}\u{438}\u{432}\u{435}\u{442}"));

		// "Группа крови"
		let bytes = [0xC3, 0xF0, 0xF3, 0xEF, 0xEF, 0xE0, 0x20, 0xEA, 0xF0, 0xEE, 0xE2, 0xE8];
		assert_eq!(
			decode_legacy(&bytes).as_deref(),
			Some("\u{413}\u{440}\u{443}\u{43f}\u{43f}\u{430} \u{43a}\u{440}\u{43e}\u{432}\u{438}")
		);
	}

	#[test_log::test]
	fn western_text_is_latin1() {
		assert_eq!(decode_legacy(&[0x43, 0x61, 0x66, 0xE9]).as_deref(), Some("Caf\u{e9}"));
	}
}

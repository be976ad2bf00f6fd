use super::{EncodedText, FramePayload, read_encoded_terminated, read_encoding, write_description};
use crate::error::Result;
use crate::macros::decode_err;
use crate::util::text::{TextEncoding, latin1_decode, latin1_encode};

/// An `ID3v2` user defined URL frame ("WXXX")
///
/// The layout is an encoding byte, a terminated description, and an ISO-8859-1 URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UrlFrame {
	/// Description of the URL, empty if there is none
	pub description: EncodedText,
	/// The URL
	pub url: String,
}

impl UrlFrame {
	/// Create a [`UrlFrame`] without a description
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			description: EncodedText::from_bytes(TextEncoding::Latin1, &[]),
			url: url.into(),
		}
	}

	/// Create a [`UrlFrame`] with a description
	pub fn with_description(description: EncodedText, url: impl Into<String>) -> Self {
		Self {
			description,
			url: url.into(),
		}
	}
}

impl FramePayload for UrlFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let encoding = read_encoding(bytes)?;
		let (description, url_start) = read_encoded_terminated(bytes, 1, encoding, 1);

		Ok(Self {
			description,
			url: latin1_decode(bytes.get(url_start..).unwrap_or_default()),
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let Some(url) = latin1_encode(&self.url) else {
			return Err(decode_err!("URL cannot be written as ISO-8859-1"));
		};

		let mut bytes = vec![self.description.encoding() as u8];
		write_description(&mut bytes, &self.description);
		bytes.extend_from_slice(&url);

		Ok(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::UrlFrame;
	use crate::id3::v2::items::{EncodedText, FramePayload};
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn url_without_description() {
		let frame = UrlFrame::new("http://example.com");
		let packed = frame.pack().unwrap();
		assert_eq!(packed, b"\0\0http://example.com");

		let reparsed = UrlFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed, frame);
	}

	#[test_log::test]
	fn url_with_description() {
		let description = EncodedText::with_encoding(TextEncoding::UTF16, "Home").unwrap();
		let frame = UrlFrame::with_description(description, "http://example.com");

		let reparsed = UrlFrame::unpack(&frame.pack().unwrap()).unwrap();
		assert_eq!(reparsed.description.text().as_deref(), Some("Home"));
		assert_eq!(reparsed.url, "http://example.com");
	}

	#[test_log::test]
	fn missing_terminator() {
		let frame = UrlFrame::unpack(b"\0http://example.com").unwrap();
		assert!(frame.description.value().is_empty());
		assert_eq!(frame.url, "http://example.com");
	}
}

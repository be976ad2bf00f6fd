mod chapter_frame;
mod comment_frame;
mod encoded_text;
mod picture_frame;
mod text_frame;
mod toc_frame;
mod url_frame;

pub use chapter_frame::ChapterFrame;
pub use comment_frame::{CommentFrame, DEFAULT_LANGUAGE};
pub use encoded_text::EncodedText;
pub use picture_frame::{ObsoletePictureFrame, PictureFrame};
pub use text_frame::TextFrame;
pub use toc_frame::TableOfContentsFrame;
pub use url_frame::UrlFrame;

use crate::error::Result;
use crate::id3::v2::util::synchsafe::{synchronise, unsynchronise};
use crate::macros::decode_err;
use crate::util::buffer::index_of_terminator;
use crate::util::text::{TextEncoding, latin1_decode, latin1_encode};

/// The decoded content of a frame
///
/// Frames only hold raw bytes, this is created on demand with [`Frame::decode`](crate::id3::v2::Frame::decode).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameData {
	/// A "T..." frame (excluding TXXX)
	Text(TextFrame),
	/// A "WXXX" frame
	Url(UrlFrame),
	/// A "COMM" frame
	Comment(CommentFrame),
	/// An "APIC" frame
	Picture(PictureFrame),
	/// A "PIC" frame
	ObsoletePicture(ObsoletePictureFrame),
	/// A "CHAP" frame
	Chapter(ChapterFrame),
	/// A "CTOC" frame
	TableOfContents(TableOfContentsFrame),
	/// Any frame without a dedicated payload type
	Binary(Vec<u8>),
}

impl FrameData {
	/// Convert the payload to bytes, applying unsynchronisation if requested
	///
	/// # Errors
	///
	/// See [`FramePayload::pack`]
	pub fn to_frame_bytes(&self, unsynchronisation: bool) -> Result<Vec<u8>> {
		match self {
			FrameData::Text(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::Url(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::Comment(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::Picture(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::ObsoletePicture(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::Chapter(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::TableOfContents(frame) => frame.to_frame_bytes(unsynchronisation),
			FrameData::Binary(data) if unsynchronisation => Ok(unsynchronise(data).into_owned()),
			FrameData::Binary(data) => Ok(data.clone()),
		}
	}
}

/// A frame payload that can be converted to and from raw frame content
pub trait FramePayload: Sized {
	/// Read the payload from already synchronised content
	///
	/// # Errors
	///
	/// The content is malformed
	fn unpack(bytes: &[u8]) -> Result<Self>;

	/// Convert the payload to bytes, without unsynchronisation
	///
	/// # Errors
	///
	/// The payload cannot be represented, such as an embedded obsolete frame
	fn pack(&self) -> Result<Vec<u8>>;

	/// Read the payload from frame content, synchronising it first if necessary
	///
	/// # Errors
	///
	/// See [`FramePayload::unpack`]
	fn from_frame_bytes(bytes: &[u8], unsynchronisation: bool) -> Result<Self> {
		if unsynchronisation {
			return Self::unpack(&synchronise(bytes));
		}

		Self::unpack(bytes)
	}

	/// Convert the payload to frame content, unsynchronising it if necessary
	///
	/// # Errors
	///
	/// See [`FramePayload::pack`]
	fn to_frame_bytes(&self, unsynchronisation: bool) -> Result<Vec<u8>> {
		let packed = self.pack()?;
		if unsynchronisation {
			return Ok(unsynchronise(&packed).into_owned());
		}

		Ok(packed)
	}
}

// Read a null terminated ISO-8859-1 string starting at `offset`, returning it and the offset after the terminator
pub(super) fn read_latin1_terminated(bytes: &[u8], offset: usize) -> Result<(String, usize)> {
	let Some(end) = index_of_terminator(bytes, offset, 1) else {
		return Err(decode_err!("Missing string terminator"));
	};

	Ok((latin1_decode(&bytes[offset..end]), end + 1))
}

pub(super) fn write_latin1_terminated(writer: &mut Vec<u8>, value: &str) -> Result<()> {
	let Some(encoded) = latin1_encode(value) else {
		return Err(decode_err!(format!(
			"String {value:?} cannot be written as ISO-8859-1"
		)));
	};

	writer.extend_from_slice(&encoded);
	writer.push(0);
	Ok(())
}

// Read the encoding byte at the start of a payload
pub(super) fn read_encoding(bytes: &[u8]) -> Result<TextEncoding> {
	match bytes.first() {
		Some(byte) => TextEncoding::try_from_u8(*byte),
		None => Err(decode_err!("Frame content is empty")),
	}
}

// Read an encoded string ending at a terminator, or an empty string if there is none
//
// Returns the string and the offset of the content following it
pub(super) fn read_encoded_terminated(
	bytes: &[u8],
	offset: usize,
	encoding: TextEncoding,
	missing_resume_at: usize,
) -> (EncodedText, usize) {
	let width = encoding.terminator().len();
	match index_of_terminator(bytes, offset, width) {
		Some(end) => (
			EncodedText::from_bytes(encoding, &bytes[offset..end]),
			end + width,
		),
		None => (EncodedText::from_bytes(encoding, &[]), missing_resume_at),
	}
}

// A description is written with a BOM and terminator, even when it is empty
pub(super) fn write_description(writer: &mut Vec<u8>, description: &EncodedText) {
	writer.extend_from_slice(&description.to_bytes(true, true));
}

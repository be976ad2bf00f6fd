use super::{FramePayload, read_latin1_terminated, write_latin1_terminated};
use crate::error::Result;
use crate::id3::v2::{Frame, FrameHeaderFormat};
use crate::macros::decode_err;

use byteorder::{BigEndian, ByteOrder};

/// An `ID3v2` chapter frame ("CHAP")
///
/// The layout is a terminated ISO-8859-1 element ID, the start and end times (milliseconds),
/// the start and end byte offsets, and then any number of embedded frames (usually a "TIT2").
/// An offset of `0xFFFF_FFFF` means the offset is unused.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChapterFrame {
	/// The element ID, referenced by [`TableOfContentsFrame`](super::TableOfContentsFrame)s
	pub element_id: String,
	/// Start time in milliseconds
	pub start_time: u32,
	/// End time in milliseconds
	pub end_time: u32,
	/// Byte offset of the chapter start
	pub start_offset: u32,
	/// Byte offset of the chapter end
	pub end_offset: u32,
	/// Frames describing the chapter
	pub subframes: Vec<Frame>,
}

impl ChapterFrame {
	/// Create a [`ChapterFrame`] with no embedded frames
	pub fn new(
		element_id: impl Into<String>,
		start_time: u32,
		end_time: u32,
		start_offset: u32,
		end_offset: u32,
	) -> Self {
		Self {
			element_id: element_id.into(),
			start_time,
			end_time,
			start_offset,
			end_offset,
			subframes: Vec::new(),
		}
	}

	/// Embed a frame in the chapter
	///
	/// Embedded frames always use the [`FrameHeaderFormat::V23`] header, with a plain integer size,
	/// whatever the version of the tag holding the chapter.
	///
	/// # Errors
	///
	/// * `id` is not a valid frame ID
	/// * `payload` cannot be packed
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::{ChapterFrame, EncodedText, TextFrame};
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let mut chapter = ChapterFrame::new("ch1", 0, 5000, u32::MAX, u32::MAX);
	/// chapter.add_subframe("TIT2", &TextFrame::new(EncodedText::new("Intro")?))?;
	///
	/// assert_eq!(chapter.subframes[0].id(), "TIT2");
	/// # Ok(()) }
	/// ```
	pub fn add_subframe(&mut self, id: &str, payload: &impl FramePayload) -> Result<()> {
		let frame = Frame::new(id, payload.pack()?, FrameHeaderFormat::V23)?;
		self.subframes.push(frame);
		Ok(())
	}
}

pub(super) fn read_subframes(bytes: &[u8], mut offset: usize) -> Result<Vec<Frame>> {
	let mut subframes = Vec::new();
	while offset < bytes.len() {
		let frame = Frame::parse(bytes, offset, FrameHeaderFormat::V23)?;
		offset += frame.len();
		subframes.push(frame);
	}

	Ok(subframes)
}

pub(super) fn write_subframes(writer: &mut Vec<u8>, subframes: &[Frame]) -> Result<()> {
	for frame in subframes {
		if frame.format() == FrameHeaderFormat::V23 {
			frame.write_to(writer)?;
			continue;
		}

		let mut frame = frame.clone();
		frame.set_format(FrameHeaderFormat::V23)?;
		frame.write_to(writer)?;
	}

	Ok(())
}

impl FramePayload for ChapterFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let (element_id, offset) = read_latin1_terminated(bytes, 0)?;

		let Some(fields) = bytes.get(offset..offset + 16) else {
			return Err(decode_err!("Chapter frame is too short"));
		};

		Ok(Self {
			element_id,
			start_time: BigEndian::read_u32(&fields[..4]),
			end_time: BigEndian::read_u32(&fields[4..8]),
			start_offset: BigEndian::read_u32(&fields[8..12]),
			end_offset: BigEndian::read_u32(&fields[12..]),
			subframes: read_subframes(bytes, offset + 16)?,
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::new();
		write_latin1_terminated(&mut bytes, &self.element_id)?;

		for field in [
			self.start_time,
			self.end_time,
			self.start_offset,
			self.end_offset,
		] {
			bytes.extend_from_slice(&field.to_be_bytes());
		}

		write_subframes(&mut bytes, &self.subframes)?;
		Ok(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::ChapterFrame;
	use crate::error::ErrorKind;
	use crate::id3::v2::items::{EncodedText, FrameData, FramePayload, TextFrame};
	use crate::id3::v2::{Frame, FrameHeaderFormat};

	fn chapter() -> ChapterFrame {
		let mut chapter = ChapterFrame::new("ch1", 1, 2, 3, 4);
		chapter
			.add_subframe("TIT2", &TextFrame::new(EncodedText::new("Intro").unwrap()))
			.unwrap();
		chapter
	}

	#[test_log::test]
	fn chapter_layout() {
		let packed = chapter().pack().unwrap();

		let mut expected = b"ch1\0".to_vec();
		expected.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4]);
		expected.extend_from_slice(b"TIT2\0\0\0\x06\0\0\0Intro");
		assert_eq!(packed, expected);

		let reparsed = ChapterFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed, chapter());

		match reparsed.subframes[0].decode(false).unwrap() {
			FrameData::Text(title) => assert_eq!(title.value.text().as_deref(), Some("Intro")),
			other => panic!("Expected a text frame, got {other:?}"),
		}
	}

	#[test_log::test]
	fn subframe_sizes_are_plain_integers() {
		// 200 bytes, which would be 0x48 read as a synchsafe integer
		let mut bytes = b"ch1\0".to_vec();
		bytes.extend_from_slice(&[0; 16]);
		bytes.extend_from_slice(b"TIT2\0\0\0\xC8\0\0");
		bytes.push(0);
		bytes.extend(std::iter::repeat_n(b'a', 199));

		let chapter = ChapterFrame::unpack(&bytes).unwrap();
		assert_eq!(chapter.subframes.len(), 1);
		assert_eq!(chapter.subframes[0].data_length(), 200);
		assert_eq!(chapter.subframes[0].format(), FrameHeaderFormat::V23);
		assert_eq!(chapter.pack().unwrap(), bytes);
	}

	#[test_log::test]
	fn truncated_chapter() {
		let err = ChapterFrame::unpack(b"ch1\0\0\0\0\x01").unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidData);
	}

	#[test_log::test]
	fn v24_subframes_are_written_as_v23() {
		let mut chapter = ChapterFrame::new("ch1", 0, 0, 0, 0);
		let mut subframe = Frame::new("TIT2", Vec::new(), FrameHeaderFormat::V24).unwrap();
		subframe.set_data(vec![b'a'; 200]);
		chapter.subframes.push(subframe);

		let packed = chapter.pack().unwrap();
		assert_eq!(&packed[20..28], b"TIT2\0\0\0\xC8");

		let reparsed = ChapterFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed.subframes[0].format(), FrameHeaderFormat::V23);
		assert_eq!(reparsed.subframes[0].data(), vec![b'a'; 200].as_slice());
	}

	#[test_log::test]
	fn obsolete_subframes_cannot_be_written() {
		let mut chapter = ChapterFrame::new("ch1", 0, 0, 0, 0);
		chapter
			.subframes
			.push(Frame::new("TT2", b"\0a".to_vec(), FrameHeaderFormat::Obsolete).unwrap());

		assert_eq!(chapter.pack().unwrap_err().kind(), ErrorKind::NotSupported);
	}
}

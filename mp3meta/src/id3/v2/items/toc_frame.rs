use super::chapter_frame::{read_subframes, write_subframes};
use super::{FramePayload, read_latin1_terminated, write_latin1_terminated};
use crate::error::Result;
use crate::id3::v2::{Frame, FrameHeaderFormat};
use crate::macros::decode_err;
use crate::util::buffer::{check_bit, set_bit};

const ROOT_BIT: u8 = 0;
const ORDERED_BIT: u8 = 1;

/// An `ID3v2` table of contents frame ("CTOC")
///
/// The layout is a terminated ISO-8859-1 element ID, a flags byte, the child count, that many
/// terminated child element IDs, and then any number of embedded frames.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableOfContentsFrame {
	/// The element ID
	pub element_id: String,
	/// Whether this is the top level table of contents
	pub is_root: bool,
	/// Whether the children are ordered
	pub is_ordered: bool,
	/// Element IDs of the child chapters or tables of contents
	pub children: Vec<String>,
	/// Frames describing the table of contents
	pub subframes: Vec<Frame>,
}

impl TableOfContentsFrame {
	/// Create a [`TableOfContentsFrame`] with no embedded frames
	pub fn new(
		element_id: impl Into<String>,
		is_root: bool,
		is_ordered: bool,
		children: Vec<String>,
	) -> Self {
		Self {
			element_id: element_id.into(),
			is_root,
			is_ordered,
			children,
			subframes: Vec::new(),
		}
	}

	/// Embed a frame in the table of contents
	///
	/// See [`ChapterFrame::add_subframe`](super::ChapterFrame::add_subframe).
	///
	/// # Errors
	///
	/// * `id` is not a valid frame ID
	/// * `payload` cannot be packed
	pub fn add_subframe(&mut self, id: &str, payload: &impl FramePayload) -> Result<()> {
		let frame = Frame::new(id, payload.pack()?, FrameHeaderFormat::V23)?;
		self.subframes.push(frame);
		Ok(())
	}

	fn flags(&self) -> u8 {
		let flags = set_bit(0, ROOT_BIT, self.is_root);
		set_bit(flags, ORDERED_BIT, self.is_ordered)
	}
}

impl FramePayload for TableOfContentsFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let (element_id, mut offset) = read_latin1_terminated(bytes, 0)?;

		let (Some(flags), Some(child_count)) = (bytes.get(offset), bytes.get(offset + 1)) else {
			return Err(decode_err!("Table of contents frame is too short"));
		};
		offset += 2;

		let mut children = Vec::with_capacity(usize::from(*child_count));
		for _ in 0..*child_count {
			let (child, next) = read_latin1_terminated(bytes, offset)?;
			children.push(child);
			offset = next;
		}

		Ok(Self {
			element_id,
			is_root: check_bit(*flags, ROOT_BIT),
			is_ordered: check_bit(*flags, ORDERED_BIT),
			children,
			subframes: read_subframes(bytes, offset)?,
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let Ok(child_count) = u8::try_from(self.children.len()) else {
			return Err(decode_err!(format!(
				"Table of contents can only hold 255 children, found {}",
				self.children.len()
			)));
		};

		let mut bytes = Vec::new();
		write_latin1_terminated(&mut bytes, &self.element_id)?;
		bytes.push(self.flags());
		bytes.push(child_count);

		for child in &self.children {
			write_latin1_terminated(&mut bytes, child)?;
		}

		write_subframes(&mut bytes, &self.subframes)?;
		Ok(bytes)
	}
}

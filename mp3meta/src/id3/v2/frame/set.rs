use super::Frame;

use std::fmt::{Display, Formatter};

/// All frames in a tag sharing an ID, in insertion order
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameSet {
	id: String,
	frames: Vec<Frame>,
}

impl FrameSet {
	/// Create an empty `FrameSet`
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			frames: Vec::new(),
		}
	}

	/// The ID shared by all frames in the set
	pub fn id(&self) -> &str {
		&self.id
	}

	/// The frames in the set
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	pub(crate) fn frames_mut(&mut self) -> &mut [Frame] {
		&mut self.frames
	}

	/// The first frame in the set
	pub fn first(&self) -> Option<&Frame> {
		self.frames.first()
	}

	/// Append a frame
	pub fn push(&mut self, frame: Frame) {
		self.frames.push(frame);
	}

	/// Remove all frames
	pub fn clear(&mut self) {
		self.frames.clear();
	}

	/// The number of frames in the set
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the set has no frames
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}

impl Display for FrameSet {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.id, self.frames.len())
	}
}

impl<'a> IntoIterator for &'a FrameSet {
	type Item = &'a Frame;
	type IntoIter = std::slice::Iter<'a, Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.iter()
	}
}

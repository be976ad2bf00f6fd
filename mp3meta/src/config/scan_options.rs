use crate::error::Result;
use crate::macros::err;

/// Options to control how an MPEG stream is scanned
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ScanOptions {
	pub(crate) block_size: usize,
	pub(crate) scan_file: bool,
}

impl Default for ScanOptions {
	/// The default implementation for `ScanOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ScanOptions {
	/// 	block_size: 65536,
	/// 	scan_file: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ScanOptions {
	/// Default size of the blocks read while scanning
	pub const DEFAULT_BLOCK_SIZE: usize = 65536;

	/// Blocks must be strictly larger than this
	///
	/// A frame header and the furthest VBR marker need to fit in the tail of a block.
	pub const MINIMUM_BLOCK_SIZE: usize = 40;

	/// Creates a new `ScanOptions`, alias for `Default` implementation
	///
	/// See also: [`ScanOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::config::ScanOptions;
	///
	/// let scan_options = ScanOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			block_size: Self::DEFAULT_BLOCK_SIZE,
			scan_file: true,
		}
	}

	/// The size of the blocks read from the source while scanning and copied while saving
	///
	/// The value is checked when the options are used, anything at or below
	/// [`ScanOptions::MINIMUM_BLOCK_SIZE`] is rejected.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::config::ScanOptions;
	///
	/// // Smaller reads for a memory constrained environment
	/// let scan_options = ScanOptions::new().block_size(4096);
	/// ```
	pub fn block_size(&mut self, block_size: usize) -> Self {
		self.block_size = block_size;
		*self
	}

	/// Whether to scan the entire stream
	///
	/// When disabled, scanning stops at the first audio frame. The frame count, end offset,
	/// and bitrate statistics then only cover that frame, and the custom trailing tag is not read.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::config::ScanOptions;
	///
	/// // Only interested in the tags and the stream format
	/// let scan_options = ScanOptions::new().scan_file(false);
	/// ```
	pub fn scan_file(&mut self, scan_file: bool) -> Self {
		self.scan_file = scan_file;
		*self
	}

	pub(crate) fn validate(self) -> Result<Self> {
		if self.block_size <= Self::MINIMUM_BLOCK_SIZE {
			err!(InvalidArgument, "Buffer too small");
		}

		Ok(self)
	}
}

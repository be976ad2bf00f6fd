use super::header::{ChannelMode, Emphasis, Layer, ModeExtension, MpegVersion};
use super::read::{self, MpegStream};
use crate::config::ScanOptions;
use crate::error::Result;
use crate::id3::v1::{ID3V1_TAG_LENGTH, Id3v1Tag};
use crate::id3::v2::Id3v2Tag;
use crate::macros::err;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// An MPEG audio file
///
/// This holds the location of the audio frames and their format, along with any tags
/// surrounding them. The file is laid out as:
///
/// ```text
/// [ID3v2 tag] [VBR info frame] [audio frames] [custom tag] [ID3v1 tag]
/// ```
///
/// Everything except the audio frames is optional. The "custom tag" is any data between the
/// last audio frame and the ID3v1 tag (or the end of the file), which is kept verbatim.
///
/// Nothing is held open once the file is read.
#[derive(Debug, Clone)]
pub struct Mp3File {
	pub(super) path: Option<PathBuf>,
	pub(super) length: u64,
	pub(super) last_modified: Option<SystemTime>,
	pub(super) options: ScanOptions,
	pub(super) stream: MpegStream,
	pub(super) id3v1_tag: Option<Id3v1Tag>,
	pub(super) id3v2_tag: Option<Id3v2Tag>,
	pub(super) custom_tag: Option<Vec<u8>>,
}

impl Mp3File {
	/// Read the file at `path` with the default [`ScanOptions`]
	///
	/// # Errors
	///
	/// See [`Mp3File::read_from`]
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with(path, ScanOptions::default())
	}

	/// Read the file at `path`
	///
	/// # Errors
	///
	/// * The file cannot be opened
	/// * See [`Mp3File::read_from`]
	pub fn open_with(path: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
		let path = path.as_ref();

		let mut file = File::open(path)?;
		let last_modified = file.metadata()?.modified().ok();

		let mut mp3 = read::read_from(&mut file, options)?;
		mp3.path = Some(path.to_path_buf());
		mp3.last_modified = last_modified;

		Ok(mp3)
	}

	/// Read an MPEG audio stream from `reader`
	///
	/// The entire reader is treated as the file.
	///
	/// # Errors
	///
	/// * The block size in `options` is too small ([`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument))
	/// * No audio frames were found ([`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData))
	/// * The leading ID3v2 tag is invalid
	/// * An I/O error occurs
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::config::ScanOptions;
	/// use mp3meta::mpeg::Mp3File;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// // 4 silent 128 kbps frames
	/// let mut frame = vec![0; 417];
	/// frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
	/// let mut reader = std::io::Cursor::new(frame.repeat(4));
	///
	/// let mp3 = Mp3File::read_from(&mut reader, ScanOptions::default())?;
	/// assert_eq!(mp3.start_offset(), 0);
	/// assert_eq!(mp3.frame_count(), 4);
	/// assert_eq!(mp3.bitrate(), 128);
	/// # Ok(()) }
	/// ```
	pub fn read_from<R>(reader: &mut R, options: ScanOptions) -> Result<Self>
	where
		R: Read + Seek,
	{
		read::read_from(reader, options)
	}

	/// The path the file was read from
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// The size of the source in bytes
	pub fn length(&self) -> u64 {
		self.length
	}

	/// When the file was last modified, if read from a path
	pub fn last_modified(&self) -> Option<SystemTime> {
		self.last_modified
	}

	/// The offset of the VBR info ("Xing" or "Info") frame
	pub fn xing_offset(&self) -> Option<u64> {
		self.stream.xing_offset
	}

	/// Whether the stream starts with a VBR info frame
	pub fn has_xing_frame(&self) -> bool {
		self.stream.xing_offset.is_some()
	}

	/// The bitrate of the VBR info frame, in kbps
	pub fn xing_bitrate(&self) -> u32 {
		self.stream.xing_bitrate
	}

	/// The offset of the first audio frame
	pub fn start_offset(&self) -> u64 {
		self.stream.start_offset
	}

	/// The offset of the last byte of the last audio frame
	///
	/// This is `None` if the first audio frame does not fit in the file.
	pub fn end_offset(&self) -> Option<u64> {
		self.stream.end_offset
	}

	/// The offset audio frames must end before, the start of the ID3v1 tag or the end of the file
	pub fn max_end_offset(&self) -> u64 {
		match self.id3v1_tag {
			Some(_) => self.length.saturating_sub(ID3V1_TAG_LENGTH as u64),
			None => self.length,
		}
	}

	/// The number of audio frames
	pub fn frame_count(&self) -> u32 {
		self.stream.frame_count
	}

	/// The mean bitrate of the audio frames, in kbps
	pub fn bitrate(&self) -> u32 {
		(self.stream.bitrate + 0.5) as u32
	}

	/// The number of frames per bitrate
	pub fn bitrates(&self) -> &BTreeMap<u32, u32> {
		&self.stream.bitrates
	}

	/// Whether the frames use more than one bitrate
	pub fn is_vbr(&self) -> bool {
		self.stream.bitrates.len() > 1
	}

	/// The duration of the audio, in milliseconds
	pub fn length_in_milliseconds(&self) -> u64 {
		let Some(end_offset) = self.stream.end_offset else {
			return 0;
		};

		if self.stream.bitrate <= 0.0 {
			return 0;
		}

		let bits = 8 * end_offset.saturating_sub(self.stream.start_offset);
		(bits as f64 / self.stream.bitrate + 0.5) as u64
	}

	/// The duration of the audio, in seconds (rounded)
	pub fn length_in_seconds(&self) -> u64 {
		(self.length_in_milliseconds() + 500) / 1000
	}

	/// The MPEG version of the stream
	pub fn version(&self) -> MpegVersion {
		self.stream.first_frame.version
	}

	/// The MPEG layer of the stream
	pub fn layer(&self) -> Layer {
		self.stream.first_frame.layer
	}

	/// The sample rate, in Hz
	pub fn sample_rate(&self) -> u32 {
		self.stream.first_frame.sample_rate
	}

	/// The channel mode of the first audio frame
	pub fn channel_mode(&self) -> ChannelMode {
		self.stream.first_frame.channel_mode
	}

	/// The mode extension of the first audio frame
	pub fn mode_extension(&self) -> ModeExtension {
		self.stream.first_frame.mode_extension
	}

	/// The emphasis of the first audio frame
	pub fn emphasis(&self) -> Emphasis {
		self.stream.first_frame.emphasis
	}

	/// The copyright bit of the first audio frame
	pub fn is_copyright(&self) -> bool {
		self.stream.first_frame.copyright
	}

	/// The original bit of the first audio frame
	pub fn is_original(&self) -> bool {
		self.stream.first_frame.original
	}
}

/// Tag management
impl Mp3File {
	/// Whether the file has an ID3v1 tag
	pub fn has_id3v1_tag(&self) -> bool {
		self.id3v1_tag.is_some()
	}

	/// Returns a reference to the ID3v1 tag, if it exists
	pub fn id3v1_tag(&self) -> Option<&Id3v1Tag> {
		self.id3v1_tag.as_ref()
	}

	/// Returns a mutable reference to the ID3v1 tag, if it exists
	pub fn id3v1_tag_mut(&mut self) -> Option<&mut Id3v1Tag> {
		self.id3v1_tag.as_mut()
	}

	/// Sets the ID3v1 tag, returning the previous one
	pub fn set_id3v1_tag(&mut self, tag: Id3v1Tag) -> Option<Id3v1Tag> {
		self.id3v1_tag.replace(tag)
	}

	/// Removes the ID3v1 tag
	pub fn remove_id3v1_tag(&mut self) -> Option<Id3v1Tag> {
		self.id3v1_tag.take()
	}

	/// Whether the file has an ID3v2 tag
	pub fn has_id3v2_tag(&self) -> bool {
		self.id3v2_tag.is_some()
	}

	/// Returns a reference to the ID3v2 tag, if it exists
	pub fn id3v2_tag(&self) -> Option<&Id3v2Tag> {
		self.id3v2_tag.as_ref()
	}

	/// Returns a mutable reference to the ID3v2 tag, if it exists
	pub fn id3v2_tag_mut(&mut self) -> Option<&mut Id3v2Tag> {
		self.id3v2_tag.as_mut()
	}

	/// Sets the ID3v2 tag, returning the previous one
	pub fn set_id3v2_tag(&mut self, tag: Id3v2Tag) -> Option<Id3v2Tag> {
		self.id3v2_tag.replace(tag)
	}

	/// Removes the ID3v2 tag
	pub fn remove_id3v2_tag(&mut self) -> Option<Id3v2Tag> {
		self.id3v2_tag.take()
	}

	/// Whether the file has trailing data after the audio frames
	pub fn has_custom_tag(&self) -> bool {
		self.custom_tag.is_some()
	}

	/// The data between the audio frames and the ID3v1 tag
	pub fn custom_tag(&self) -> Option<&[u8]> {
		self.custom_tag.as_deref()
	}

	/// Sets the data written between the audio frames and the ID3v1 tag
	pub fn set_custom_tag(&mut self, custom_tag: Vec<u8>) -> Option<Vec<u8>> {
		self.custom_tag.replace(custom_tag)
	}

	/// Removes the custom tag
	pub fn remove_custom_tag(&mut self) -> Option<Vec<u8>> {
		self.custom_tag.take()
	}
}

impl Mp3File {
	/// Write the file, with its current tags, to `path`
	///
	/// The audio frames are copied from the file this was read from.
	///
	/// # Errors
	///
	/// * The file was not read from a path ([`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument))
	/// * `path` is the file this was read from ([`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument))
	/// * See [`Mp3File::write_to`]
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();

		let Some(source_path) = &self.path else {
			err!(InvalidArgument, "File was not read from a path");
		};

		if is_same_file(source_path, path) {
			err!(InvalidArgument, "Save filename same as source filename");
		}

		// Tags are encoded first, so an unwritable tag doesn't leave a partial file behind
		let id3v2_bytes = self.id3v2_bytes()?;

		let mut source = File::open(source_path)?;
		let mut output = File::create(path)?;
		self.write_layout(&mut source, &mut output, id3v2_bytes.as_deref())?;

		log::debug!("MPEG: Saved to {}", path.display());
		Ok(())
	}

	/// Write the file, with its current tags, to `writer`
	///
	/// `source` must be the stream this was read from, the audio frames are copied from it.
	///
	/// # Errors
	///
	/// * The ID3v2 tag cannot be written (see [`Id3v2Tag::to_bytes`])
	/// * An I/O error occurs
	pub fn write_to<R, W>(&self, source: &mut R, writer: &mut W) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		let id3v2_bytes = self.id3v2_bytes()?;
		self.write_layout(source, writer, id3v2_bytes.as_deref())
	}

	fn id3v2_bytes(&self) -> Result<Option<Vec<u8>>> {
		self.id3v2_tag.as_ref().map(Id3v2Tag::to_bytes).transpose()
	}

	fn write_layout<R, W>(&self, source: &mut R, writer: &mut W, id3v2: Option<&[u8]>) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		if let Some(id3v2) = id3v2 {
			writer.write_all(id3v2)?;
		}

		self.copy_audio(source, writer)?;

		if let Some(custom_tag) = &self.custom_tag {
			writer.write_all(custom_tag)?;
		}

		if let Some(id3v1) = &self.id3v1_tag {
			writer.write_all(&id3v1.as_bytes())?;
		}

		writer.flush()?;
		Ok(())
	}

	// Copies the VBR info frame (if any) through the last audio frame
	fn copy_audio<R, W>(&self, source: &mut R, writer: &mut W) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		let start = self
			.stream
			.xing_offset
			.unwrap_or(self.stream.start_offset);

		let Some(end) = self.stream.end_offset else {
			return Ok(());
		};

		if end < start {
			return Ok(());
		}

		source.seek(SeekFrom::Start(start))?;

		let mut block = vec![0; self.options.block_size];
		let mut remaining = end - start + 1;
		while remaining > 0 {
			let chunk = remaining.min(block.len() as u64) as usize;
			source.read_exact(&mut block[..chunk])?;
			writer.write_all(&block[..chunk])?;
			remaining -= chunk as u64;
		}

		Ok(())
	}
}

fn is_same_file(a: &Path, b: &Path) -> bool {
	if a == b {
		return true;
	}

	match (a.canonicalize(), b.canonicalize()) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}

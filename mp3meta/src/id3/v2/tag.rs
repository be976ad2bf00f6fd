
use super::header::{FOOTER_LENGTH, HEADER_LENGTH, Id3v2TagFlags, Id3v2Version};
use super::items::{
	ChapterFrame, CommentFrame, EncodedText, FrameData, FramePayload, PictureFrame,
	TableOfContentsFrame, TextFrame, UrlFrame, DEFAULT_LANGUAGE,
};
use super::util::synchsafe::size_unsynchronisation_would_add;
use super::{Frame, FrameFlags, FrameHeaderFormat, FrameSet};
use crate::error::Result;
use crate::id3::v1::GENRES;
use crate::id3::v1::constants::genre_index;
use crate::macros::err;

use std::cell::Cell;
use std::collections::BTreeMap;

/// The description that marks an iTunes normalization comment
pub const ITUNES_COMMENT_DESCRIPTION: &str = "iTunNORM";

const PADDING_LENGTH: usize = 256;

const GENRE_ID: (&str, &str) = ("TCON", "TCO");
const COMPILATION_ID: (&str, &str) = ("TCMP", "TCP");
const COMMENT_ID: (&str, &str) = ("COMM", "COM");
const URL_ID: (&str, &str) = ("WXXX", "WXX");
const PICTURE_ID: (&str, &str) = ("APIC", "PIC");
const CHAPTER_ID: &str = "CHAP";
const TABLE_OF_CONTENTS_ID: &str = "CTOC";

macro_rules! impl_accessor {
	($($name:ident => $id:literal, $obsolete_id:literal;)+) => {
		paste::paste! {
			$(
				#[doc = "Returns the " $name " (\"" $id "\", or \"" $obsolete_id "\" in obsolete tags)"]
				pub fn $name(&self) -> Option<String> {
					self.text_value(($id, $obsolete_id))
				}

				#[doc = "Sets the " $name ", replacing any existing \"" $id "\" frames"]
				///
				/// An empty value is ignored.
				///
				/// # Errors
				///
				/// See [`Id3v2Tag::add_frame`]
				pub fn [<set_ $name>](&mut self, value: &str) -> Result<()> {
					self.set_text_value($id, value)
				}
			)+
		}
	}
}

/// An `ID3v2` tag
///
/// ## Versions
///
/// ID3v2.2, ID3v2.3, and ID3v2.4 tags are all handled by this type. They only differ in their
/// header flags, their frame header format, and where unsynchronisation is applied:
///
/// | Version  | Frame header                      | Unsynchronisation |
/// |----------|-----------------------------------|-------------------|
/// | ID3v2.2  | [`FrameHeaderFormat::V23`], or [`FrameHeaderFormat::Obsolete`] | Frame region |
/// | ID3v2.3  | [`FrameHeaderFormat::V23`]        | Frame region      |
/// | ID3v2.4  | [`FrameHeaderFormat::V24`]        | Every frame       |
///
/// ID3v2.2 tags written with 3 character frame IDs are "obsolete format" tags. They can be read,
/// but not modified or written.
///
/// ## Frames
///
/// Frames are grouped into [`FrameSet`]s by ID, ordered by ID. When written, picture frames
/// ("APIC") always come last.
#[derive(Debug, Clone)]
pub struct Id3v2Tag {
	version: Id3v2Version,
	revision: u8,
	flags: Id3v2TagFlags,
	padding: bool,
	extended_header: Option<Vec<u8>>,
	obsolete_format: bool,
	frame_sets: BTreeMap<String, FrameSet>,
	data_length: Cell<Option<usize>>,
}

impl PartialEq for Id3v2Tag {
	fn eq(&self, other: &Self) -> bool {
		self.version == other.version
			&& self.revision == other.revision
			&& self.flags == other.flags
			&& self.extended_header == other.extended_header
			&& self.data_length() == other.data_length()
			&& self.frame_sets == other.frame_sets
	}
}

impl Eq for Id3v2Tag {}

impl Default for Id3v2Tag {
	fn default() -> Self {
		Self::new(Id3v2Version::V4)
	}
}

impl Id3v2Tag {
	/// Create an empty tag
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::{Id3v2Tag, Id3v2Version};
	///
	/// let tag = Id3v2Tag::new(Id3v2Version::V3);
	/// assert_eq!(tag.version(), "3.0");
	/// assert!(tag.is_empty());
	/// ```
	pub fn new(version: Id3v2Version) -> Self {
		Self {
			version,
			revision: 0,
			flags: Id3v2TagFlags::default(),
			padding: false,
			extended_header: None,
			obsolete_format: false,
			frame_sets: BTreeMap::new(),
			data_length: Cell::new(None),
		}
	}

	pub(super) fn from_parts(
		version: Id3v2Version,
		revision: u8,
		flags: Id3v2TagFlags,
		extended_header: Option<Vec<u8>>,
		obsolete_format: bool,
	) -> Self {
		Self {
			version,
			revision,
			flags,
			padding: false,
			extended_header,
			obsolete_format,
			frame_sets: BTreeMap::new(),
			data_length: Cell::new(None),
		}
	}

	// A tag that was read keeps its size until modified
	pub(super) fn keep_data_length(&self, data_length: usize) {
		self.data_length.set(Some(data_length));
	}

	/// The version as "major.revision", such as "4.0"
	pub fn version(&self) -> String {
		format!("{}.{}", self.version.major(), self.revision)
	}

	/// The revision (minor version) byte
	pub fn revision(&self) -> u8 {
		self.revision
	}

	/// The major version
	pub fn major_version(&self) -> Id3v2Version {
		self.version
	}

	/// The header flags
	pub fn flags(&self) -> Id3v2TagFlags {
		self.flags
	}

	/// The raw extended header, including its size field
	///
	/// The ID3v2.3 size field counts the bytes after it. The ID3v2.4 size field is synchsafe and
	/// counts the whole extended header, size field included.
	pub fn extended_header(&self) -> Option<&[u8]> {
		self.extended_header.as_deref()
	}

	/// Whether the tag uses 3 character frame IDs (ID3v2.2 only)
	///
	/// Obsolete format tags are read-only.
	pub fn is_obsolete_format(&self) -> bool {
		self.obsolete_format
	}

	/// Whether 256 bytes of padding are written after the frames
	pub fn padding(&self) -> bool {
		self.padding
	}

	/// Set whether 256 bytes of padding are written after the frames
	///
	/// NOTE: Padding is never written when the tag has a footer.
	pub fn set_padding(&mut self, padding: bool) {
		if self.padding != padding {
			self.invalidate_data_length();
			self.padding = padding;
		}
	}

	/// Whether the tag has a footer (ID3v2.4 only)
	pub fn has_footer(&self) -> bool {
		self.flags.footer
	}

	/// Set whether the tag has a footer
	///
	/// This does nothing for versions without footers.
	pub fn set_footer(&mut self, footer: bool) {
		if !self.version.capabilities().footer {
			log::warn!("ID3v{} tags cannot have a footer", self.version.major());
			return;
		}

		if self.flags.footer != footer {
			self.invalidate_data_length();
			self.flags.footer = footer;
		}
	}

	/// Whether the tag is unsynchronised
	pub fn has_unsynchronisation(&self) -> bool {
		self.flags.unsynchronisation
	}

	/// Set whether the tag is unsynchronised
	///
	/// For ID3v2.2 and ID3v2.3, the frame region is unsynchronised as a whole when written.
	/// For ID3v2.4, every frame already in the tag has its data and flag updated, and frames
	/// added afterwards follow the tag.
	pub fn set_unsynchronisation(&mut self, unsynchronisation: bool) {
		if self.flags.unsynchronisation == unsynchronisation {
			return;
		}

		self.invalidate_data_length();
		self.flags.unsynchronisation = unsynchronisation;

		if self.version.capabilities().frame_unsynchronisation {
			for frame in self.frame_sets.values_mut().flat_map(FrameSet::frames_mut) {
				frame.set_unsynchronisation(unsynchronisation);
			}
		}
	}

	/// All frame sets, ordered by ID
	pub fn frame_sets(&self) -> &BTreeMap<String, FrameSet> {
		&self.frame_sets
	}

	/// The frame set for `id`
	pub fn frame_set(&self, id: &str) -> Option<&FrameSet> {
		self.frame_sets.get(id)
	}

	/// Whether the tag has no frames
	pub fn is_empty(&self) -> bool {
		self.frame_sets.is_empty()
	}

	/// Add a frame to the tag
	///
	/// The frame is appended to the set of frames sharing its ID, or replaces all of them
	/// when `replace` is set.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::{Frame, FrameHeaderFormat, Id3v2Tag, Id3v2Version};
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let mut tag = Id3v2Tag::new(Id3v2Version::V3);
	///
	/// tag.add_frame(Frame::new("TXXX", b"\0a\0b".to_vec(), FrameHeaderFormat::V23)?, false);
	/// tag.add_frame(Frame::new("TXXX", b"\0c\0d".to_vec(), FrameHeaderFormat::V23)?, false);
	/// assert_eq!(tag.frame_set("TXXX").map(|set| set.len()), Some(2));
	///
	/// tag.add_frame(Frame::new("TXXX", b"\0e\0f".to_vec(), FrameHeaderFormat::V23)?, true);
	/// assert_eq!(tag.frame_set("TXXX").map(|set| set.len()), Some(1));
	/// # Ok(()) }
	/// ```
	pub fn add_frame(&mut self, frame: Frame, replace: bool) {
		self.invalidate_data_length();

		let set = self
			.frame_sets
			.entry(frame.id().to_owned())
			.or_insert_with(|| FrameSet::new(frame.id()));

		if replace {
			set.clear();
		}

		set.push(frame);
	}

	/// Remove all frames with the ID `id`
	pub fn clear_frame_set(&mut self, id: &str) {
		if self.frame_sets.remove(id).is_some() {
			self.invalidate_data_length();
		}
	}

	/// The size of the tag, excluding the header and footer
	///
	/// For a tag that was read and not modified since, this is the size from its header.
	pub fn data_length(&self) -> usize {
		if let Some(length) = self.data_length.get() {
			return length;
		}

		let length = self.calculate_data_length();
		self.data_length.set(Some(length));
		length
	}

	/// The size of the tag, including the header and footer
	pub fn len(&self) -> usize {
		let footer = if self.flags.footer { FOOTER_LENGTH } else { 0 };
		HEADER_LENGTH + self.data_length() + footer
	}

	/// Convert the tag to bytes
	///
	/// # Errors
	///
	/// * The tag is in the obsolete format
	/// * A frame is too large for its size field
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		super::write::dump_tag(self)
	}

	/// Whether frame content in this tag is unsynchronised per frame
	pub(super) fn frame_unsynchronisation(&self) -> bool {
		self.version.capabilities().frame_unsynchronisation && self.flags.unsynchronisation
	}

	/// Whether the frame region is unsynchronised as a whole
	pub(super) fn tag_unsynchronisation(&self) -> bool {
		!self.version.capabilities().frame_unsynchronisation && self.flags.unsynchronisation
	}

	pub(super) fn frame_format(&self) -> FrameHeaderFormat {
		if self.obsolete_format {
			return FrameHeaderFormat::Obsolete;
		}

		self.version.capabilities().frame_format
	}

	pub(super) fn frames_length(&self) -> usize {
		self.frame_sets
			.values()
			.flat_map(FrameSet::frames)
			.map(Frame::len)
			.sum()
	}

	fn calculate_data_length(&self) -> usize {
		let mut length = self.extended_header.as_ref().map_or(0, Vec::len);

		length += if self.tag_unsynchronisation() {
			match super::write::frame_region(self) {
				Ok(region) => region.len() + size_unsynchronisation_would_add(&region),
				Err(_) => self.frames_length(),
			}
		} else {
			self.frames_length()
		};

		if self.padding && !self.flags.footer {
			length += PADDING_LENGTH;
		}

		length
	}

	fn invalidate_data_length(&self) {
		self.data_length.set(None);
	}

	fn frame_id<'a>(&self, (current, obsolete): (&'a str, &'a str)) -> &'a str {
		if self.obsolete_format { obsolete } else { current }
	}

	fn decode_frames<'a>(&'a self, id: &str) -> impl Iterator<Item = FrameData> + 'a {
		let unsynchronisation = self.frame_unsynchronisation();

		self.frame_sets
			.get(id)
			.into_iter()
			.flat_map(FrameSet::frames)
			.filter_map(move |frame| match frame.decode(unsynchronisation) {
				Ok(data) => Some(data),
				Err(e) => {
					log::debug!("Skipping undecodable {} frame: {e}", frame.id());
					None
				},
			})
	}

	fn decode_first(&self, ids: (&str, &str)) -> Option<FrameData> {
		let frame = self.frame_sets.get(self.frame_id(ids))?.first()?;

		match frame.decode(self.frame_unsynchronisation()) {
			Ok(data) => Some(data),
			Err(e) => {
				log::debug!("Unable to decode {} frame: {e}", frame.id());
				None
			},
		}
	}

	fn text_value(&self, ids: (&str, &str)) -> Option<String> {
		match self.decode_first(ids)? {
			FrameData::Text(frame) => frame.value.text(),
			_ => None,
		}
	}

	fn set_text_value(&mut self, id: &str, value: &str) -> Result<()> {
		if value.is_empty() {
			return Ok(());
		}

		let frame = TextFrame::new(EncodedText::new(value)?);
		self.set_payload(id, &frame, true)
	}

	fn set_payload(&mut self, id: &str, payload: &impl FramePayload, replace: bool) -> Result<()> {
		let data = payload.to_frame_bytes(self.frame_unsynchronisation())?;
		let frame = self.create_frame(id, data)?;
		self.add_frame(frame, replace);
		Ok(())
	}

	fn create_frame(&self, id: &str, data: Vec<u8>) -> Result<Frame> {
		if self.obsolete_format {
			err!(NotSupported, "Packing Obsolete frames is not supported");
		}

		let mut frame = Frame::new(id, data, self.frame_format())?;
		if self.frame_unsynchronisation() {
			frame.set_flags(FrameFlags {
				unsynchronisation: true,
				..FrameFlags::default()
			});
		}

		Ok(frame)
	}
}

/// Field accessors
///
/// Getters return `None` when the frame is missing or cannot be decoded. Setters ignore empty
/// values, and fail with [`ErrorKind::NotSupported`](crate::error::ErrorKind::NotSupported) on
/// obsolete format tags.
impl Id3v2Tag {
	impl_accessor!(
		track           => "TRCK", "TRK";
		part_of_set     => "TPOS", "TPA";
		artist          => "TPE1", "TP1";
		album_artist    => "TPE2", "TP2";
		title           => "TIT2", "TT2";
		album           => "TALB", "TAL";
		year            => "TYER", "TYE";
		composer        => "TCOM", "TCM";
		publisher       => "TPUB", "TBP";
		original_artist => "TOPE", "TOA";
		copyright       => "TCOP", "TCR";
		encoder         => "TENC", "TEN";
	);

	/// Whether the track is part of a compilation ("TCMP" is "1")
	pub fn is_compilation(&self) -> bool {
		self.text_value(COMPILATION_ID).as_deref() == Some("1")
	}

	/// Mark the track as part of a compilation
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	pub fn set_compilation(&mut self, compilation: bool) -> Result<()> {
		self.set_text_value(COMPILATION_ID.0, if compilation { "1" } else { "0" })
	}

	/// The genre number
	///
	/// This is read from a leading `(N)`, or a plain number. Otherwise, the genre text is
	/// looked up in [`GENRES`], ignoring case.
	pub fn genre(&self) -> Option<u32> {
		let text = self.text_value(GENRE_ID)?;

		if let Some(number) = extract_genre_number(&text) {
			return Some(number);
		}

		let description = extract_genre_description(&text)?;
		genre_index(description).and_then(|index| u32::try_from(index).ok())
	}

	/// The genre name
	///
	/// For a known genre number, this is the name from [`GENRES`], otherwise it is the text
	/// following the genre number.
	pub fn genre_description(&self) -> Option<String> {
		if let Some(description) = self.genre().and_then(|genre| GENRES.get(genre as usize)) {
			return Some((*description).to_owned());
		}

		let text = self.text_value(GENRE_ID)?;
		extract_genre_description(&text)
			.filter(|description| !description.is_empty())
			.map(str::to_owned)
	}

	/// Set the genre, written as `(N)Description`
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::Id3v2Tag;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let mut tag = Id3v2Tag::default();
	/// tag.set_genre(13)?;
	///
	/// assert_eq!(tag.genre(), Some(13));
	/// assert_eq!(tag.genre_description().as_deref(), Some("Pop"));
	/// # Ok(()) }
	/// ```
	pub fn set_genre(&mut self, genre: u32) -> Result<()> {
		let description = GENRES.get(genre as usize).copied().unwrap_or_default();
		self.set_text_value(GENRE_ID.0, &format!("({genre}){description}"))
	}

	/// The first comment that isn't an iTunes normalization comment
	pub fn comment(&self) -> Option<String> {
		self.find_comment(|description| description != ITUNES_COMMENT_DESCRIPTION)
	}

	/// Set the comment, in English with no description
	///
	/// This replaces all comment frames, including the iTunes comment.
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	pub fn set_comment(&mut self, comment: &str) -> Result<()> {
		self.set_comment_with_description("", comment)
	}

	/// The iTunes normalization comment
	pub fn itunes_comment(&self) -> Option<String> {
		self.find_comment(|description| description == ITUNES_COMMENT_DESCRIPTION)
	}

	/// Set the iTunes normalization comment
	///
	/// This replaces all comment frames, including the user-visible comment.
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	pub fn set_itunes_comment(&mut self, comment: &str) -> Result<()> {
		self.set_comment_with_description(ITUNES_COMMENT_DESCRIPTION, comment)
	}

	fn find_comment(&self, matches: impl Fn(&str) -> bool) -> Option<String> {
		let id = self.frame_id(COMMENT_ID);

		self.decode_frames(id).find_map(|data| match data {
			FrameData::Comment(frame) => {
				let description = frame.description.text().unwrap_or_default();
				if matches(&description) {
					return frame.content.text();
				}

				None
			},
			_ => None,
		})
	}

	fn set_comment_with_description(&mut self, description: &str, comment: &str) -> Result<()> {
		if comment.is_empty() {
			return Ok(());
		}

		let frame = CommentFrame::new(DEFAULT_LANGUAGE, description, EncodedText::new(comment)?)?;
		self.set_payload(COMMENT_ID.0, &frame, true)
	}

	/// The URL ("WXXX")
	pub fn url(&self) -> Option<String> {
		match self.decode_first(URL_ID)? {
			FrameData::Url(frame) => Some(frame.url),
			_ => None,
		}
	}

	/// Set the URL ("WXXX"), with no description
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	pub fn set_url(&mut self, url: &str) -> Result<()> {
		if url.is_empty() {
			return Ok(());
		}

		self.set_payload(URL_ID.0, &UrlFrame::new(url), true)
	}

	fn album_picture(&self) -> Option<PictureFrame> {
		match self.decode_first(PICTURE_ID)? {
			FrameData::Picture(picture) => Some(picture),
			FrameData::ObsoletePicture(picture) => Some(picture.into()),
			_ => None,
		}
	}

	/// The image data of the first attached picture
	pub fn album_image(&self) -> Option<Vec<u8>> {
		self.album_picture().map(|picture| picture.data)
	}

	/// The MIME type of the first attached picture
	pub fn album_image_mime_type(&self) -> Option<String> {
		self.album_picture().map(|picture| picture.mime_type)
	}

	/// Set the attached picture, replacing any others
	///
	/// The picture is written with the picture type "Other" and no description. Nothing happens
	/// if either argument is empty.
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::add_frame`]
	pub fn set_album_image(&mut self, image: &[u8], mime_type: &str) -> Result<()> {
		if image.is_empty() || mime_type.is_empty() {
			return Ok(());
		}

		let picture = PictureFrame::new(mime_type, 0, image.to_vec());
		self.set_payload(PICTURE_ID.0, &picture, true)
	}

	/// All chapter frames that can be decoded
	///
	/// Obsolete format tags have no chapters.
	pub fn chapters(&self) -> Vec<ChapterFrame> {
		if self.obsolete_format {
			return Vec::new();
		}

		self.decode_frames(CHAPTER_ID)
			.filter_map(|data| match data {
				FrameData::Chapter(chapter) => Some(chapter),
				_ => None,
			})
			.collect()
	}

	/// Replace all chapter frames
	///
	/// Embedded frames are written with [`FrameHeaderFormat::V23`] headers in every tag version.
	/// An empty list is ignored.
	///
	/// # Errors
	///
	/// * An embedded frame is in the obsolete format
	/// * See [`Id3v2Tag::add_frame`]
	pub fn set_chapters(&mut self, chapters: &[ChapterFrame]) -> Result<()> {
		for (i, chapter) in chapters.iter().enumerate() {
			let mut chapter = chapter.clone();
			Self::adapt_subframes(&mut chapter.subframes)?;
			self.set_payload(CHAPTER_ID, &chapter, i == 0)?;
		}

		Ok(())
	}

	/// All table of contents frames that can be decoded
	///
	/// Obsolete format tags have no tables of contents.
	pub fn chapter_toc(&self) -> Vec<TableOfContentsFrame> {
		if self.obsolete_format {
			return Vec::new();
		}

		self.decode_frames(TABLE_OF_CONTENTS_ID)
			.filter_map(|data| match data {
				FrameData::TableOfContents(toc) => Some(toc),
				_ => None,
			})
			.collect()
	}

	/// Replace all table of contents frames
	///
	/// See [`Id3v2Tag::set_chapters`].
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::set_chapters`]
	pub fn set_chapter_toc(&mut self, toc: &[TableOfContentsFrame]) -> Result<()> {
		for (i, toc) in toc.iter().enumerate() {
			let mut toc = toc.clone();
			Self::adapt_subframes(&mut toc.subframes)?;
			self.set_payload(TABLE_OF_CONTENTS_ID, &toc, i == 0)?;
		}

		Ok(())
	}

	fn adapt_subframes(subframes: &mut [Frame]) -> Result<()> {
		for frame in subframes {
			if frame.format() != FrameHeaderFormat::V23 {
				frame.set_format(FrameHeaderFormat::V23)?;
			}
		}

		Ok(())
	}
}

// "(13)Pop" and "(13)" are 13, as is a plain "13"
pub(crate) fn extract_genre_number(value: &str) -> Option<u32> {
	let value = value.trim();

	if let Some(rest) = value.strip_prefix('(') {
		if let Some(end) = rest.find(')') {
			return rest[..end].trim().parse().ok();
		}
	}

	value.parse().ok()
}

// The text following a "(N)", or the entire value
pub(crate) fn extract_genre_description(value: &str) -> Option<&str> {
	let value = value.trim();
	if value.is_empty() {
		return None;
	}

	if let Some(rest) = value.strip_prefix('(') {
		if let Some(end) = rest.find(')') {
			return Some(&rest[end + 1..]);
		}
	}

	Some(value)
}

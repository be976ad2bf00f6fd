use crate::error::Result;
use crate::id3::v2::items::{
	ChapterFrame, CommentFrame, FrameData, FramePayload, ObsoletePictureFrame, PictureFrame,
	TableOfContentsFrame, TextFrame, UrlFrame,
};

#[rustfmt::skip]
pub(super) fn decode_content(
	id: &str,
	content: &[u8],
	unsynchronisation: bool,
) -> Result<FrameData> {
	log::trace!("Decoding frame content for ID: {}", id);

	Ok(match id {
		"APIC" => FrameData::Picture(PictureFrame::from_frame_bytes(content, unsynchronisation)?),
		"PIC" => FrameData::ObsoletePicture(ObsoletePictureFrame::from_frame_bytes(content, unsynchronisation)?),
		"COMM" | "COM" => FrameData::Comment(CommentFrame::from_frame_bytes(content, unsynchronisation)?),
		"WXXX" | "WXX" => FrameData::Url(UrlFrame::from_frame_bytes(content, unsynchronisation)?),
		"CHAP" => FrameData::Chapter(ChapterFrame::from_frame_bytes(content, unsynchronisation)?),
		"CTOC" => FrameData::TableOfContents(TableOfContentsFrame::from_frame_bytes(content, unsynchronisation)?),
		// User defined text carries a description, which plain text frames do not
		"TXXX" | "TXX" => FrameData::Binary(content.to_vec()),
		i if i.starts_with('T') => FrameData::Text(TextFrame::from_frame_bytes(content, unsynchronisation)?),
		_ => FrameData::Binary(content.to_vec()),
	})
}

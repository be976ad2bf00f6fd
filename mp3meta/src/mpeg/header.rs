use super::constants::{BITRATES, SAMPLE_RATES};
use crate::error::Result;
use crate::macros::decode_err;

use std::fmt::{Display, Formatter};

use byteorder::{BigEndian, ByteOrder};

const FRAME_HEADER_LENGTH: usize = 4;

pub(crate) fn verify_frame_sync(frame_sync: [u8; 2]) -> bool {
	frame_sync[0] == 0xFF && frame_sync[1] >> 5 == 0b111
}

/// MPEG Audio version
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[allow(missing_docs)]
pub enum MpegVersion {
	V1,
	V2,
	V2_5,
}

impl Display for MpegVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::V1 => "1.0",
			Self::V2 => "2.0",
			Self::V2_5 => "2.5",
		})
	}
}

/// MPEG layer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Layer {
	Layer1 = 1,
	Layer2 = 2,
	Layer3 = 3,
}

impl Display for Layer {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Layer1 => "I",
			Self::Layer2 => "II",
			Self::Layer3 => "III",
		})
	}
}

/// Channel mode
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[allow(missing_docs)]
pub enum ChannelMode {
	Stereo = 0,
	JointStereo = 1,
	/// Two independent mono channels
	DualChannel = 2,
	SingleChannel = 3,
}

impl Display for ChannelMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Stereo => "Stereo",
			Self::JointStereo => "Joint stereo",
			Self::DualChannel => "Dual mono",
			Self::SingleChannel => "Mono",
		})
	}
}

/// How joint stereo is coded
///
/// The meaning of the mode extension bits depends on the layer, and they are only
/// used with [`ChannelMode::JointStereo`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ModeExtension {
	/// Intensity stereo for subbands 4-31 (layers I and II)
	Bands4To31,
	/// Intensity stereo for subbands 8-31 (layers I and II)
	Bands8To31,
	/// Intensity stereo for subbands 12-31 (layers I and II)
	Bands12To31,
	/// Intensity stereo for subbands 16-31 (layers I and II)
	Bands16To31,
	/// Neither intensity nor M/S stereo (layer III)
	None,
	/// Intensity stereo (layer III)
	IntensityStereo,
	/// M/S stereo (layer III)
	MsStereo,
	/// Intensity and M/S stereo (layer III)
	IntensityMsStereo,
	/// The channel mode is not joint stereo
	NotApplicable,
}

impl ModeExtension {
	fn from_bits(bits: u32, layer: Layer, channel_mode: ChannelMode) -> Self {
		if channel_mode != ChannelMode::JointStereo {
			return Self::NotApplicable;
		}

		match (layer, bits & 0b11) {
			(Layer::Layer1 | Layer::Layer2, 0b00) => Self::Bands4To31,
			(Layer::Layer1 | Layer::Layer2, 0b01) => Self::Bands8To31,
			(Layer::Layer1 | Layer::Layer2, 0b10) => Self::Bands12To31,
			(Layer::Layer1 | Layer::Layer2, _) => Self::Bands16To31,
			(Layer::Layer3, 0b00) => Self::None,
			(Layer::Layer3, 0b01) => Self::IntensityStereo,
			(Layer::Layer3, 0b10) => Self::MsStereo,
			(Layer::Layer3, _) => Self::IntensityMsStereo,
		}
	}
}

impl Display for ModeExtension {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Bands4To31 => "Bands 4-31",
			Self::Bands8To31 => "Bands 8-31",
			Self::Bands12To31 => "Bands 12-31",
			Self::Bands16To31 => "Bands 16-31",
			Self::None => "None",
			Self::IntensityStereo => "Intensity stereo",
			Self::MsStereo => "M/S stereo",
			Self::IntensityMsStereo => "Intensity & M/S stereo",
			Self::NotApplicable => "n/a",
		})
	}
}

/// A rarely-used decoder hint that the file must be de-emphasized
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Emphasis {
	/// No emphasis
	None,
	/// 50/15 ms
	Ms5015,
	/// CCITT J.17
	CcittJ17,
}

impl Display for Emphasis {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::None => "None",
			Self::Ms5015 => "50/15 ms",
			Self::CcittJ17 => "CCITT J.17",
		})
	}
}

/// A decoded MPEG audio frame header
///
/// ```text
/// AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
///
/// A: frame sync    E: bitrate index       I: channel mode
/// B: version       F: sample rate index   J: mode extension
/// C: layer         G: padding             K: copyright
/// D: protection    H: private             L: original
///                                         M: emphasis
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MpegFrame {
	/// MPEG version
	pub version: MpegVersion,
	/// MPEG layer
	pub layer: Layer,
	/// The protection bit
	pub protection: bool,
	/// Bitrate in kbps
	pub bitrate: u32,
	/// Sample rate in Hz
	pub sample_rate: u32,
	/// Whether the frame has a padding slot
	pub padding: bool,
	/// The private bit
	pub private: bool,
	/// Channel mode
	pub channel_mode: ChannelMode,
	/// Joint stereo coding
	pub mode_extension: ModeExtension,
	/// Whether the audio is copyrighted
	pub copyright: bool,
	/// Whether the audio is an original
	pub original: bool,
	/// De-emphasis hint
	pub emphasis: Emphasis,
}

impl MpegFrame {
	/// Decode a frame header from the first 4 bytes of `bytes`
	///
	/// # Errors
	///
	/// * `bytes` is shorter than 4 bytes
	/// * See [`MpegFrame::from_header`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::mpeg::{ChannelMode, Layer, MpegFrame, MpegVersion};
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let frame = MpegFrame::from_bytes(&[0xFF, 0xFB, 0xA2, 0x40])?;
	///
	/// assert_eq!(frame.version, MpegVersion::V1);
	/// assert_eq!(frame.layer, Layer::Layer3);
	/// assert_eq!(frame.bitrate, 160);
	/// assert_eq!(frame.sample_rate, 44100);
	/// assert_eq!(frame.channel_mode, ChannelMode::JointStereo);
	/// assert_eq!(frame.len(), 523);
	/// # Ok(()) }
	/// ```
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < FRAME_HEADER_LENGTH {
			decode_err!(@BAIL "Mpeg frame too short");
		}

		Self::from_header(BigEndian::read_u32(bytes))
	}

	/// Decode a frame header from a big endian header word
	///
	/// # Errors
	///
	/// * The frame sync is missing
	/// * The version, layer, bitrate, sample rate, or emphasis use a reserved value
	pub fn from_header(data: u32) -> Result<Self> {
		if data >> 21 != 0x7FF {
			decode_err!(@BAIL "Frame sync missing");
		}

		let version = match (data >> 19) & 0b11 {
			0b00 => MpegVersion::V2_5,
			0b10 => MpegVersion::V2,
			0b11 => MpegVersion::V1,
			_ => decode_err!(@BAIL "Invalid mpeg audio version in frame header"),
		};

		let layer = match (data >> 17) & 0b11 {
			0b01 => Layer::Layer3,
			0b10 => Layer::Layer2,
			0b11 => Layer::Layer1,
			_ => decode_err!(@BAIL "Invalid mpeg layer description in frame header"),
		};

		let version_index = if version == MpegVersion::V1 { 0 } else { 1 };
		let layer_index = layer as usize - 1;

		let bitrate = BITRATES[version_index][layer_index][((data >> 12) & 0xF) as usize];
		if bitrate == 0 {
			decode_err!(@BAIL "Invalid bitrate in frame header");
		}

		let sample_rate = match (data >> 10) & 0b11 {
			0b11 => decode_err!(@BAIL "Invalid sample rate in frame header"),
			index => SAMPLE_RATES[version as usize][index as usize],
		};

		let channel_mode = match (data >> 6) & 0b11 {
			0b00 => ChannelMode::Stereo,
			0b01 => ChannelMode::JointStereo,
			0b10 => ChannelMode::DualChannel,
			_ => ChannelMode::SingleChannel,
		};

		let emphasis = match data & 0b11 {
			0b00 => Emphasis::None,
			0b01 => Emphasis::Ms5015,
			0b11 => Emphasis::CcittJ17,
			_ => decode_err!(@BAIL "Invalid emphasis in frame header"),
		};

		Ok(Self {
			version,
			layer,
			protection: (data >> 16) & 1 == 1,
			bitrate,
			sample_rate,
			padding: (data >> 9) & 1 == 1,
			private: (data >> 8) & 1 == 1,
			channel_mode,
			mode_extension: ModeExtension::from_bits(data >> 4, layer, channel_mode),
			copyright: (data >> 3) & 1 == 1,
			original: (data >> 2) & 1 == 1,
			emphasis,
		})
	}

	/// The size of the frame in bytes, including the header
	///
	/// Every version uses the MPEG-1 slot counts (384 samples for layer I, 1152 otherwise).
	pub fn len(&self) -> u32 {
		match self.layer {
			Layer::Layer1 => 48000 * self.bitrate / self.sample_rate + 4 * u32::from(self.padding),
			Layer::Layer2 | Layer::Layer3 => {
				144_000 * self.bitrate / self.sample_rate + u32::from(self.padding)
			},
		}
	}

	/// Whether this frame is consistent with `other`
	///
	/// Frames in one stream share their version, layer, and sample rate.
	pub(crate) fn is_consistent_with(&self, other: &Self) -> bool {
		self.version == other.version
			&& self.layer == other.layer
			&& self.sample_rate == other.sample_rate
	}
}

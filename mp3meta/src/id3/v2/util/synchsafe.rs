//! Utilities for working with synchsafe integers and unsynchronised ID3v2 content
//!
//! An MPEG frame sync is 11 set bits. To keep an MPEG decoder from mistaking tag
//! contents for audio, ID3v2 stores some integers with only 7 bits per byte
//! ("synchsafe"), and can "unsynchronise" arbitrary data by inserting a `0x00` after
//! every `0xFF` that could start a false sync.

use crate::error::Result;
use crate::macros::decode_err;

use std::borrow::Cow;

/// An integer that can be converted to and from synchsafe variants
pub trait SynchsafeInteger: Sized {
	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in 28 bits
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::util::synchsafe::SynchsafeInteger;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// // Maximum value we can represent in a synchsafe u32
	/// let unsynch_number = 0xFFF_FFFF_u32;
	/// let synch_number = unsynch_number.synch()?;
	///
	/// // Each byte should have 7 set bits and an MSB of 0
	/// assert_eq!(synch_number, 0b01111111_01111111_01111111_01111111_u32);
	/// # Ok(()) }
	/// ```
	fn synch(self) -> Result<Self>;

	/// Unsynchronise a synchsafe integer
	///
	/// The most significant bit of every byte is ignored.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::util::synchsafe::SynchsafeInteger;
	///
	/// // "00 00 02 01"
	/// assert_eq!(0x0000_0201_u32.unsynch(), 257);
	/// ```
	fn unsynch(self) -> Self;
}

impl SynchsafeInteger for u32 {
	fn synch(self) -> Result<Self> {
		// 7 bits are available per byte, shave off 1 bit per byte
		const MAXIMUM_INTEGER: u32 = u32::MAX >> 4;

		if self > MAXIMUM_INTEGER {
			return Err(decode_err!(format!(
				"Value {self} is too large for a synchsafe integer"
			)));
		}

		let n = self;
		Ok((n & 0x7F)
			| ((n & (0x7F << 7)) << 1)
			| ((n & (0x7F << 14)) << 2)
			| ((n & (0x7F << 21)) << 3))
	}

	fn unsynch(self) -> Self {
		let u = self;
		((u & 0x7F00_0000) >> 3) | ((u & 0x7F_0000) >> 2) | ((u & 0x7F00) >> 1) | (u & 0x7F)
	}
}

/// Decode 4 synchsafe bytes, masking each to its low 7 bits
pub fn unpack_synchsafe(bytes: [u8; 4]) -> u32 {
	u32::from_be_bytes(bytes).unsynch()
}

/// Encode a value into 4 synchsafe bytes
///
/// # Errors
///
/// `value` doesn't fit in 28 bits
pub fn pack_synchsafe(value: u32) -> Result<[u8; 4]> {
	Ok(value.synch()?.to_be_bytes())
}

// A `0xFF` needs a zero inserted after it when followed by a byte that would
// complete a false frame sync, or by a zero that would be eaten on synchronisation
fn needs_stuffing(next: u8) -> bool {
	next & 0xE0 == 0xE0 || next == 0
}

/// The number of bytes [`unsynchronise`] would insert into `bytes`
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::util::synchsafe::size_unsynchronisation_would_add;
///
/// assert_eq!(size_unsynchronisation_would_add(&[0xFF, 0xFB]), 1);
/// assert_eq!(size_unsynchronisation_would_add(&[0xFF, 0x1A]), 0);
/// // A trailing 0xFF always needs a zero after it
/// assert_eq!(size_unsynchronisation_would_add(&[0x01, 0xFF]), 1);
/// ```
pub fn size_unsynchronisation_would_add(bytes: &[u8]) -> usize {
	let mut count = 0;

	for (i, byte) in bytes.iter().enumerate() {
		if *byte != 0xFF {
			continue;
		}

		match bytes.get(i + 1) {
			Some(next) if !needs_stuffing(*next) => {},
			_ => count += 1,
		}
	}

	count
}

/// Unsynchronise `bytes`
///
/// A zero is inserted after every `0xFF` that is followed by a byte with its top 3 bits set,
/// by a `0x00`, or that ends the buffer. When nothing needs to be inserted, the input is
/// returned as-is.
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::util::synchsafe::unsynchronise;
/// use std::borrow::Cow;
///
/// assert_eq!(&*unsynchronise(&[0xFF, 0xFB]), &[0xFF, 0x00, 0xFB]);
/// assert_eq!(&*unsynchronise(&[0xFF]), &[0xFF, 0x00]);
///
/// // No copy is made when no change is needed
/// assert!(matches!(unsynchronise(&[0xFF, 0x1A]), Cow::Borrowed(_)));
/// ```
pub fn unsynchronise(bytes: &[u8]) -> Cow<'_, [u8]> {
	let count = size_unsynchronisation_would_add(bytes);
	if count == 0 {
		return Cow::Borrowed(bytes);
	}

	let mut out = Vec::with_capacity(bytes.len() + count);
	for (i, byte) in bytes.iter().enumerate() {
		out.push(*byte);

		if *byte != 0xFF {
			continue;
		}

		match bytes.get(i + 1) {
			Some(next) if !needs_stuffing(*next) => {},
			_ => out.push(0),
		}
	}

	Cow::Owned(out)
}

// Whether the zero at `i + 1` (following an 0xFF at `i`) was inserted by unsynchronisation
fn is_stuffed_zero(bytes: &[u8], i: usize) -> bool {
	if bytes[i] != 0xFF || bytes.get(i + 1) != Some(&0) {
		return false;
	}

	match bytes.get(i + 2) {
		Some(next) => needs_stuffing(*next),
		None => true,
	}
}

/// The number of bytes [`synchronise`] would remove from `bytes`
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::util::synchsafe::size_synchronisation_would_subtract;
///
/// assert_eq!(size_synchronisation_would_subtract(&[0xFF, 0x00, 0xFB]), 1);
/// assert_eq!(size_synchronisation_would_subtract(&[0xFF, 0x00, 0x1A]), 0);
/// ```
pub fn size_synchronisation_would_subtract(bytes: &[u8]) -> usize {
	(0..bytes.len()).filter(|i| is_stuffed_zero(bytes, *i)).count()
}

/// Reverse [`unsynchronise`]
///
/// Only zeros that [`unsynchronise`] could have inserted are removed. When nothing needs to
/// be removed, the input is returned as-is.
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::util::synchsafe::synchronise;
///
/// assert_eq!(&*synchronise(&[0xFF, 0x00, 0xFB]), &[0xFF, 0xFB]);
/// assert_eq!(&*synchronise(&[0xFF, 0x00]), &[0xFF]);
/// ```
pub fn synchronise(bytes: &[u8]) -> Cow<'_, [u8]> {
	let count = size_synchronisation_would_subtract(bytes);
	if count == 0 {
		return Cow::Borrowed(bytes);
	}

	let mut out = Vec::with_capacity(bytes.len() - count);
	let mut skip_next = false;
	for (i, byte) in bytes.iter().enumerate() {
		if skip_next {
			skip_next = false;
			continue;
		}

		out.push(*byte);
		skip_next = is_stuffed_zero(bytes, i);
	}

	Cow::Owned(out)
}

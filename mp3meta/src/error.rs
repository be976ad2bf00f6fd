//! Contains the errors that can arise within mp3meta
//!
//! The primary error is [`Mp3MetaError`]. The type of error is determined by [`ErrorKind`],
//! and every error carries a message and an optional underlying cause.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, Mp3MetaError>`
pub type Result<T> = std::result::Result<T, Mp3MetaError>;

/// The types of errors that can occur
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
	/// The buffer does not hold a tag of the expected kind
	///
	/// This is recovered from wherever a tag is only looked for, such as the
	/// trailing ID3v1 tag or the leading ID3v2 tag of a file.
	NoSuchTag,
	/// A tag signature was recognized, but its version or reserved header bits are unhandled
	UnsupportedVersion,
	/// Structurally invalid content (truncated tag, bad MPEG frame header, no audio found, ...)
	InvalidData,
	/// The operation is not defined for the data's dialect, such as packing an obsolete frame
	NotSupported,
	/// Transcoding text into an encoding that cannot represent it
	UnmappableCharacter,
	/// An encoding marker outside of `0..=3`, or a string that no fallback encoding can represent
	InvalidEncoding,
	/// An argument provided by the caller is not acceptable
	InvalidArgument,
	/// Represents all cases of [`std::io::Error`]
	Io,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::NoSuchTag => "No such tag",
			Self::UnsupportedVersion => "Unsupported tag",
			Self::InvalidData => "Invalid data",
			Self::NotSupported => "Not supported",
			Self::UnmappableCharacter => "Unmappable character",
			Self::InvalidEncoding => "Invalid encoding",
			Self::InvalidArgument => "Invalid argument",
			Self::Io => "I/O",
		};

		f.write_str(name)
	}
}

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that could occur within mp3meta
pub struct Mp3MetaError {
	pub(crate) kind: ErrorKind,
	message: Cow<'static, str>,
	cause: Option<BoxedCause>,
}

impl Mp3MetaError {
	/// Create an `Mp3MetaError` from an [`ErrorKind`] and a message
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::error::{ErrorKind, Mp3MetaError};
	///
	/// let err = Mp3MetaError::new(ErrorKind::InvalidData, "Zero size tag");
	/// assert_eq!(err.to_string(), "Invalid data: Zero size tag");
	/// ```
	pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
		Self {
			kind,
			message: message.into(),
			cause: None,
		}
	}

	/// Attach an underlying cause to the error
	#[must_use]
	pub fn with_cause<E>(mut self, cause: E) -> Self
	where
		E: Into<BoxedCause>,
	{
		self.cause = Some(cause.into());
		self
	}

	pub(crate) fn invalid_data(message: impl Into<Cow<'static, str>>) -> Self {
		Self::new(ErrorKind::InvalidData, message)
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::error::{ErrorKind, Mp3MetaError};
	///
	/// let err = Mp3MetaError::new(ErrorKind::NoSuchTag, "Buffer too short");
	/// if let ErrorKind::NoSuchTag = err.kind() {
	/// 	println!("No tag here");
	/// }
	/// ```
	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	/// Returns the error message
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl std::error::Error for Mp3MetaError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.cause
			.as_deref()
			.map(|cause| -> &(dyn std::error::Error + 'static) { cause })
	}
}

impl Debug for Mp3MetaError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {:?}", self.kind, self.message)?;

		if let Some(cause) = &self.cause {
			write!(f, " (caused by {cause:?})")?;
		}

		Ok(())
	}
}

impl Display for Mp3MetaError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.kind, self.message)
	}
}

impl From<std::io::Error> for Mp3MetaError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io,
			message: Cow::Owned(input.to_string()),
			cause: Some(Box::new(input)),
		}
	}
}

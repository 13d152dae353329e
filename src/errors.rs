use crate::FieldType;
use std::fmt;

/// An error that can occur when decoding a field stream
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume self and return the error kind
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset, relative to the source being read, where the
    /// error occurred (if available)
    pub fn offset(&self) -> Option<u64> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// Fewer bytes were available than a read demanded
    Truncated { offset: u64 },

    /// A type tag outside of the defined range was encountered
    UnknownFieldType { tag: u32, offset: u64 },

    /// A field's declared length does not match the bytes its body consumed
    MalformedContainer {
        field_type: FieldType,
        length: u64,
        consumed: u64,
        offset: u64,
    },

    /// A compressed payload could not be expanded with its declared algorithm
    Decompression {
        algorithm: u32,
        cause: Option<std::io::Error>,
    },

    /// Fields are nested deeper than the decoder allows
    TooDeep { depth: usize, offset: u64 },

    /// The underlying reader failed for a reason other than running out of data
    Io(std::io::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<u64> {
        match *self {
            ErrorKind::Truncated { offset } => Some(offset),
            ErrorKind::UnknownFieldType { offset, .. } => Some(offset),
            ErrorKind::MalformedContainer { offset, .. } => Some(offset),
            ErrorKind::TooDeep { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Decompression {
                cause: Some(ref err),
                ..
            } => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Truncated { offset } => {
                write!(f, "unexpected end of data (offset: {})", offset)
            }
            ErrorKind::UnknownFieldType { tag, offset } => write!(
                f,
                "unknown field type encountered (tag: {}, offset: {})",
                tag, offset
            ),
            ErrorKind::MalformedContainer {
                field_type,
                length,
                consumed,
                offset,
            } => write!(
                f,
                "{} declared {} bytes but its body consumed {} (offset: {})",
                field_type.name(),
                length,
                consumed,
                offset
            ),
            ErrorKind::Decompression { algorithm, .. } => write!(
                f,
                "unable to decompress payload with algorithm {}",
                algorithm
            ),
            ErrorKind::TooDeep { depth, offset } => write!(
                f,
                "fields nested beyond max depth of {} (offset: {})",
                depth, offset
            ),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

use crate::{Error, ErrorKind};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// How a compressed field's payload is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompressionAlgorithm {
    /// The payload is stored verbatim
    Stored,

    /// zlib wrapped DEFLATE
    Deflate,

    /// An algorithm this decoder doesn't know. The payload is kept as is.
    Other(u32),
}

impl CompressionAlgorithm {
    pub fn new(id: u32) -> CompressionAlgorithm {
        match id {
            0 => CompressionAlgorithm::Stored,
            1 => CompressionAlgorithm::Deflate,
            x => CompressionAlgorithm::Other(x),
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            CompressionAlgorithm::Stored => 0,
            CompressionAlgorithm::Deflate => 1,
            CompressionAlgorithm::Other(x) => *x,
        }
    }
}

/// The payload of a compressed field
///
/// ```rust
/// use sisinfo::{Compressed, CompressionAlgorithm};
/// let stored = Compressed::new(0, 5, b"hello".to_vec()).unwrap();
/// assert_eq!(stored.algorithm(), CompressionAlgorithm::Stored);
/// assert_eq!(stored.data(), b"hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Compressed {
    algorithm: CompressionAlgorithm,
    uncompressed_size: u64,
    data: Vec<u8>,
}

impl Compressed {
    /// Expand `payload` according to `algorithm`.
    ///
    /// The declared uncompressed size is informational: it's neither used as
    /// a limit nor compared against what the payload expands to.
    pub fn new(algorithm: u32, uncompressed_size: u64, payload: Vec<u8>) -> Result<Self, Error> {
        let algorithm = CompressionAlgorithm::new(algorithm);
        let data = match algorithm {
            CompressionAlgorithm::Stored => payload,
            CompressionAlgorithm::Deflate => inflate(&payload, uncompressed_size)?,
            CompressionAlgorithm::Other(id) => {
                tracing::warn!(algorithm = id, "leaving payload with unknown compression as is");
                payload
            }
        };

        Ok(Compressed {
            algorithm,
            uncompressed_size,
            data,
        })
    }

    #[inline]
    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algorithm
    }

    /// The size the payload claims to expand to
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Whether [`data`](Compressed::data) holds the expanded bytes. False
    /// only for unknown algorithms.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !matches!(self.algorithm, CompressionAlgorithm::Other(_))
    }

    /// The expanded payload, or the raw payload for unknown algorithms
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

fn inflate(payload: &[u8], size_hint: u64) -> Result<Vec<u8>, Error> {
    // cap the hint so a bogus size can't trigger a huge allocation
    let capacity = usize::try_from(size_hint.min(32 * 1024)).unwrap_or_default();
    let mut out = Vec::with_capacity(capacity);
    ZlibDecoder::new(payload)
        .read_to_end(&mut out)
        .map_err(|e| {
            Error::new(ErrorKind::Decompression {
                algorithm: CompressionAlgorithm::Deflate.value(),
                cause: Some(e),
            })
        })?;
    Ok(out)
}

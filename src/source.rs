use crate::{util::padding_len, Error, ErrorKind};
use std::io::{self, Read};

/// A sequential supply of bytes that the field decoder pulls from.
///
/// Every source keeps its own running count of consumed bytes. Alignment
/// padding is computed against that count, so a source constructed over a
/// nested payload restarts alignment at zero regardless of where the payload
/// sat in the outer stream.
///
/// Once a read comes up short the source is exhausted and stays that way.
pub trait ByteSource {
    /// Fill as much of `buf` as there is data for and return how many bytes
    /// were written. Anything less than `buf.len()` exhausts the source.
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Read `len` bytes into a new allocation.
    fn read_vec(&mut self, len: u64) -> Result<Vec<u8>, Error>;

    /// Advance past `len` bytes without retaining them.
    fn skip(&mut self, len: u64) -> Result<(), Error>;

    /// True once no further bytes can be read.
    fn is_exhausted(&self) -> bool;

    /// Bytes consumed since this source was constructed.
    fn position(&self) -> u64;

    /// Fill all of `buf` or fail with [`ErrorKind::Truncated`]
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let read = self.read_up_to(buf)?;
        if read < buf.len() {
            Err(truncated(self.position()))
        } else {
            Ok(())
        }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32, Error> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64, Error> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a 4 byte type tag, returning `None` when the source can not
    /// supply a full tag. This is how a field sequence ends.
    #[inline]
    fn read_tag(&mut self) -> Result<Option<u32>, Error> {
        let mut buf = [0u8; 4];
        if self.read_up_to(&mut buf)? < buf.len() {
            Ok(None)
        } else {
            Ok(Some(u32::from_le_bytes(buf)))
        }
    }

    /// Discard the filler bytes that bring [`position`](Self::position) to a
    /// multiple of 4 and return how many were skipped.
    ///
    /// The last field of a block is allowed to omit its padding, so running
    /// out of data here is not an error. The source is exhausted instead.
    #[inline]
    fn skip_padding(&mut self) -> Result<u64, Error> {
        let mut buf = [0u8; 3];
        let len = padding_len(self.position()) as usize;
        let read = self.read_up_to(&mut buf[..len])?;
        Ok(read as u64)
    }
}

#[cold]
#[inline(never)]
fn truncated(offset: u64) -> Error {
    Error::new(ErrorKind::Truncated { offset })
}

/// A [ByteSource] that incrementally pulls from a [Read] implementation
///
/// ```rust
/// use sisinfo::{ByteSource, StreamSource};
/// let mut source = StreamSource::new(&[0x0d, 0x00, 0x00, 0x00, 0xff][..]);
/// assert_eq!(source.read_u32().unwrap(), 13);
/// assert_eq!(source.position(), 4);
/// assert!(source.read_u32().is_err());
/// assert!(source.is_exhausted());
/// ```
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    position: u64,
    exhausted: bool,
}

impl<R> StreamSource<R>
where
    R: Read,
{
    #[inline]
    pub fn new(reader: R) -> Self {
        StreamSource {
            reader,
            position: 0,
            exhausted: false,
        }
    }

    /// Consume the source and return the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    #[inline]
    fn advance(&mut self, amt: u64, requested: u64) -> Result<(), Error> {
        self.position += amt;
        if amt < requested {
            self.exhausted = true;
            Err(truncated(self.position))
        } else {
            Ok(())
        }
    }
}

impl<R> ByteSource for StreamSource<R>
where
    R: Read,
{
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.exhausted {
            return Ok(0);
        }

        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.exhausted = true;
                    return Err(Error::from(e));
                }
            }
        }

        self.position += filled as u64;
        if filled < buf.len() {
            self.exhausted = true;
        }
        Ok(filled)
    }

    fn read_vec(&mut self, len: u64) -> Result<Vec<u8>, Error> {
        if self.exhausted && len != 0 {
            return Err(truncated(self.position));
        }

        // read_to_end grows the allocation as data arrives, so a corrupted
        // length can't force a huge up front allocation
        let mut out = Vec::new();
        let result = (&mut self.reader).take(len).read_to_end(&mut out);
        match result {
            Ok(read) => {
                self.advance(read as u64, len)?;
                Ok(out)
            }
            Err(e) => {
                self.exhausted = true;
                Err(Error::from(e))
            }
        }
    }

    fn skip(&mut self, len: u64) -> Result<(), Error> {
        if self.exhausted && len != 0 {
            return Err(truncated(self.position));
        }

        let result = io::copy(&mut (&mut self.reader).take(len), &mut io::sink());
        match result {
            Ok(skipped) => self.advance(skipped, len),
            Err(e) => {
                self.exhausted = true;
                Err(Error::from(e))
            }
        }
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }
}

/// A [ByteSource] over data that is already in memory, like a decompressed
/// payload or the pre-read body of a controller block
///
/// ```rust
/// use sisinfo::{ByteSource, SliceSource};
/// let mut source = SliceSource::new(&[0x01, 0x02, 0x00, 0x00, 0x07]);
/// assert_eq!(source.read_u16().unwrap(), 0x0201);
/// assert_eq!(source.skip_padding().unwrap(), 2);
/// assert_eq!(source.read_u8().unwrap(), 7);
/// assert!(source.is_exhausted());
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, position: 0 }
    }

    /// The bytes that have yet to be consumed
    #[inline]
    pub fn remainder(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Consume up to `len` bytes, failing if fewer were available
    #[inline]
    fn take(&mut self, len: u64) -> Result<&'a [u8], Error> {
        let rest = self.remainder();
        match usize::try_from(len).ok().filter(|&l| l <= rest.len()) {
            Some(l) => {
                self.position += l;
                Ok(&rest[..l])
            }
            None => {
                self.position = self.data.len();
                Err(truncated(self.position as u64))
            }
        }
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let rest = self.remainder();
        let len = buf.len().min(rest.len());
        buf[..len].copy_from_slice(&rest[..len]);
        self.position += len;
        Ok(len)
    }

    #[inline]
    fn read_vec(&mut self, len: u64) -> Result<Vec<u8>, Error> {
        self.take(len).map(|data| data.to_vec())
    }

    #[inline]
    fn skip(&mut self, len: u64) -> Result<(), Error> {
        self.take(len).map(|_| ())
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position as u64
    }
}

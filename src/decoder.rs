use crate::{
    registry, ByteSource, Compressed, Error, ErrorKind, Field, FieldData, FieldType, SliceSource,
};

/// Nesting limit applied when no other is configured
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Decodes fields out of a [ByteSource]
///
/// ```rust
/// use sisinfo::{FieldData, FieldDecoder, FieldType, SliceSource};
/// let data = [
///     0x09, 0x00, 0x00, 0x00, // uid field
///     0x04, 0x00, 0x00, 0x00, // 4 byte payload
///     0x7a, 0x1a, 0x20, 0x10,
/// ];
/// let fields = FieldDecoder::new()
///     .decode_field_sequence(&mut SliceSource::new(&data))
///     .unwrap();
/// assert_eq!(fields.len(), 1);
/// assert_eq!(fields[0].field_type(), FieldType::Uid);
/// assert_eq!(fields[0].data(), &FieldData::Uid(0x10201a7a));
/// ```
#[derive(Debug, Clone)]
pub struct FieldDecoder {
    max_depth: usize,
}

impl FieldDecoder {
    /// Convenience method for constructing the default decoder
    #[inline]
    pub fn new() -> Self {
        FieldDecoder::builder().build()
    }

    /// Initializes a default [FieldDecoderBuilder]
    pub fn builder() -> FieldDecoderBuilder {
        FieldDecoderBuilder::default()
    }

    /// Decode the next field, returning `None` when the source can't supply
    /// another type tag.
    pub fn decode_field<S: ByteSource>(&self, source: &mut S) -> Result<Option<Field>, Error> {
        self.context().field(source)
    }

    /// Decode fields until the source is exhausted
    pub fn decode_field_sequence<S: ByteSource>(&self, source: &mut S) -> Result<Vec<Field>, Error> {
        self.context().sequence(source)
    }

    fn context(&self) -> Context {
        Context {
            max_depth: self.max_depth,
            depth: 0,
        }
    }
}

impl Default for FieldDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a [FieldDecoder]
#[derive(Debug, Clone)]
pub struct FieldDecoderBuilder {
    max_depth: usize,
}

impl Default for FieldDecoderBuilder {
    fn default() -> Self {
        FieldDecoderBuilder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FieldDecoderBuilder {
    /// Set how deeply fields may nest before decoding is aborted with
    /// [`ErrorKind::TooDeep`]. Each field counts as one level, including the
    /// fields decoded out of compressed payloads and controller blocks.
    #[inline]
    pub fn max_depth(mut self, val: usize) -> FieldDecoderBuilder {
        self.max_depth = val;
        self
    }

    #[inline]
    pub fn build(self) -> FieldDecoder {
        FieldDecoder {
            max_depth: self.max_depth,
        }
    }
}

/// Decode the next field from the source with the default decoder
#[inline]
pub fn decode_field<S: ByteSource>(source: &mut S) -> Result<Option<Field>, Error> {
    FieldDecoder::new().decode_field(source)
}

/// Decode fields until the source is exhausted with the default decoder
#[inline]
pub fn decode_field_sequence<S: ByteSource>(source: &mut S) -> Result<Vec<Field>, Error> {
    FieldDecoder::new().decode_field_sequence(source)
}

/// What a kind specific body decoder produces
#[derive(Debug, Default)]
pub(crate) struct Body {
    pub(crate) children: Vec<Field>,
    pub(crate) data: FieldData,
}

impl Body {
    #[inline]
    pub(crate) fn empty() -> Body {
        Body::default()
    }

    #[inline]
    pub(crate) fn data(data: FieldData) -> Body {
        Body {
            children: Vec::new(),
            data,
        }
    }

    #[inline]
    pub(crate) fn children(children: Vec<Field>) -> Body {
        Body {
            children,
            data: FieldData::None,
        }
    }

    #[inline]
    pub(crate) fn with_data(mut self, data: FieldData) -> Body {
        self.data = data;
        self
    }
}

/// Recursion state shared by the body decoders of a single decode
#[derive(Debug)]
pub(crate) struct Context {
    max_depth: usize,
    depth: usize,
}

impl Context {
    /// Read a type tag and the field it introduces
    pub(crate) fn field(&mut self, src: &mut dyn ByteSource) -> Result<Option<Field>, Error> {
        let offset = src.position();
        let Some(tag) = src.read_tag()? else {
            return Ok(None);
        };

        let field_type = FieldType::new(tag)
            .ok_or_else(|| Error::new(ErrorKind::UnknownFieldType { tag, offset }))?;
        self.element(src, field_type).map(Some)
    }

    /// A field that the enclosing body requires to be present
    pub(crate) fn required_field(&mut self, src: &mut dyn ByteSource) -> Result<Field, Error> {
        match self.field(src)? {
            Some(field) => Ok(field),
            None => Err(Error::new(ErrorKind::Truncated {
                offset: src.position(),
            })),
        }
    }

    pub(crate) fn required_fields(
        &mut self,
        src: &mut dyn ByteSource,
        count: usize,
    ) -> Result<Vec<Field>, Error> {
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            fields.push(self.required_field(src)?);
        }
        Ok(fields)
    }

    /// Fields until the source runs dry
    pub(crate) fn sequence(&mut self, src: &mut dyn ByteSource) -> Result<Vec<Field>, Error> {
        let mut fields = Vec::new();
        while let Some(field) = self.field(src)? {
            fields.push(field);
        }
        Ok(fields)
    }

    /// A field whose type is already known, so only its length, body, and
    /// padding are on the wire. This is how array elements are encoded.
    pub(crate) fn element(
        &mut self,
        src: &mut dyn ByteSource,
        field_type: FieldType,
    ) -> Result<Field, Error> {
        let field = self.untagged(src, field_type)?;
        src.skip_padding()?;
        Ok(field)
    }

    /// Decode the single field held within a compressed field's payload
    pub(crate) fn expand(&mut self, payload: &Compressed) -> Result<Option<Field>, Error> {
        if !payload.is_expanded() {
            return Err(Error::new(ErrorKind::Decompression {
                algorithm: payload.algorithm().value(),
                cause: None,
            }));
        }

        tracing::debug!(len = payload.data().len(), "decoding field from decompressed payload");
        let mut sub = SliceSource::new(payload.data());
        self.field(&mut sub)
    }

    /// Decode the fields of a pre-read, self contained block
    pub(crate) fn block(&mut self, data: &[u8]) -> Result<Vec<Field>, Error> {
        tracing::debug!(len = data.len(), "decoding fields from block");
        let mut sub = SliceSource::new(data);
        self.sequence(&mut sub)
    }

    fn untagged(&mut self, src: &mut dyn ByteSource, field_type: FieldType) -> Result<Field, Error> {
        let offset = src.position();
        if self.depth >= self.max_depth {
            return Err(Error::new(ErrorKind::TooDeep {
                depth: self.max_depth,
                offset,
            }));
        }

        let length = read_length(src)?;
        tracing::trace!(field = field_type.name(), length, offset, "decoding field");

        let start = src.position();
        self.depth += 1;
        let body = (registry::body_decoder(field_type))(self, src, length);
        self.depth -= 1;
        let Body { children, data } = body?;

        // Contents is the one body that may legitimately stop short: it ends
        // early when the source runs out at a field boundary
        let consumed = src.position() - start;
        let underrun_ok = field_type == FieldType::Contents && src.is_exhausted();
        if consumed > length || (consumed < length && !underrun_ok) {
            return Err(Error::new(ErrorKind::MalformedContainer {
                field_type,
                length,
                consumed,
                offset,
            }));
        }

        Ok(Field::new(field_type, length, children, data))
    }
}

/// Lengths with the top bit of the first word set continue into a second
/// word. The first word is shifted whole, flag bit included.
#[inline]
fn read_length(src: &mut dyn ByteSource) -> Result<u64, Error> {
    let first = src.read_u32()?;
    if first & 0x8000_0000 == 0 {
        return Ok(u64::from(first));
    }

    let low = src.read_u32()?;
    Ok((u64::from(first) << 32) | u64::from(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamSource;
    use rstest::*;

    fn encode(tag: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out
    }

    #[test]
    fn test_read_length() {
        let mut src = SliceSource::new(&[0x10, 0, 0, 0]);
        assert_eq!(read_length(&mut src).unwrap(), 0x10);

        let mut src = SliceSource::new(&[0, 0, 0, 0x80, 0x20, 0, 0, 0]);
        assert_eq!(read_length(&mut src).unwrap(), 0x8000_0000_0000_0020);
        assert_eq!(src.position(), 8);
    }

    #[test]
    fn test_extended_length_field_cannot_be_satisfied() {
        let mut data = Vec::new();
        data.extend_from_slice(&37u32.to_le_bytes());
        data.extend_from_slice(&0x8000_0000u32.to_le_bytes());
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);
        let err = decode_field(&mut SliceSource::new(&data)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
    }

    #[test]
    fn test_end_of_sequence() {
        assert!(decode_field(&mut SliceSource::new(&[])).unwrap().is_none());
        assert!(decode_field(&mut SliceSource::new(&[9, 0])).unwrap().is_none());
    }

    #[rstest]
    #[case(0)]
    #[case(42)]
    #[case(99)]
    #[case(u32::MAX)]
    fn test_unknown_tag(#[case] tag: u32) {
        let data = encode(tag, &[0, 0, 0, 0]);
        let err = decode_field(&mut SliceSource::new(&data)).unwrap_err();
        match err.kind() {
            ErrorKind::UnknownFieldType { tag: found, offset } => {
                assert_eq!(*found, tag);
                assert_eq!(*offset, 0);
            }
            x => panic!("unexpected error: {:?}", x),
        }
    }

    #[test]
    fn test_padding_follows_field() {
        let mut data = encode(34, &[0xef, 0xbe]);
        data.extend(encode(9, &[1, 0, 0, 0]));
        let mut src = SliceSource::new(&data);
        let first = decode_field(&mut src).unwrap().unwrap();
        assert_eq!(first.data(), &FieldData::Checksum(0xbeef));
        assert_eq!(src.position(), 12);
        let second = decode_field(&mut src).unwrap().unwrap();
        assert_eq!(second.data(), &FieldData::Uid(1));
    }

    #[test]
    fn test_length_mismatch_is_malformed() {
        // a uid declaring 8 bytes only consumes 4
        let data = encode(9, &[1, 0, 0, 0, 0, 0, 0, 0]);
        let err = decode_field(&mut SliceSource::new(&data)).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedContainer {
                field_type: FieldType::Uid,
                length: 8,
                consumed: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_max_depth() {
        let mut data = encode(9, &[1, 0, 0, 0]);
        for _ in 0..4 {
            data = encode(13, &data);
        }

        let decoder = FieldDecoder::builder().max_depth(5).build();
        assert!(decoder
            .decode_field(&mut SliceSource::new(&data))
            .unwrap()
            .is_some());

        let decoder = FieldDecoder::builder().max_depth(4).build();
        let err = decoder
            .decode_field(&mut SliceSource::new(&data))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TooDeep { depth: 4, .. }));
    }

    #[test]
    fn test_stream_and_slice_agree() {
        let mut data = encode(1, &[b'h', 0, b'i', 0]);
        data.extend(encode(6, &[0xd7, 0x07, 3, 9]));
        let from_slice = decode_field_sequence(&mut SliceSource::new(&data)).unwrap();
        let from_stream = decode_field_sequence(&mut StreamSource::new(data.as_slice())).unwrap();
        assert_eq!(from_slice, from_stream);
        assert_eq!(from_slice[0].readable_str(), "hi");
        assert_eq!(from_slice[1].readable_str(), "2007.3.9");
    }
}

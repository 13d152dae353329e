use crate::{
    decoder::FieldDecoder, ByteSource, Error, Field, FieldType, FieldVisitor, FileDescription,
    SliceSource, StreamSource,
};
use std::io::Read;
use std::path::{Component, Path};

/// The four identifiers that open every installation package
///
/// ```rust
/// use sisinfo::SisHeader;
/// let data = [
///     0x7a, 0x1a, 0x20, 0x10, 0x00, 0x00, 0x00, 0x00,
///     0x34, 0x12, 0x00, 0x20, 0xaa, 0xbb, 0xcc, 0xdd,
/// ];
/// let header = SisHeader::from_slice(&data).unwrap();
/// assert_eq!(header.uid1(), 0x10201a7a);
/// assert_eq!(header.uid3(), 0x20001234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SisHeader {
    uid1: u32,
    uid2: u32,
    uid3: u32,
    uid_checksum: u32,
}

impl SisHeader {
    pub const SIZE: usize = 16;

    /// Parse the header from the start of the slice. The identifiers are not
    /// validated.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        SisHeader::read_from(&mut SliceSource::new(data))
    }

    /// Parse the header from the next 16 bytes of the source
    pub fn read_from<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self, Error> {
        Ok(SisHeader {
            uid1: source.read_u32()?,
            uid2: source.read_u32()?,
            uid3: source.read_u32()?,
            uid_checksum: source.read_u32()?,
        })
    }

    pub fn uid1(&self) -> u32 {
        self.uid1
    }

    pub fn uid2(&self) -> u32 {
        self.uid2
    }

    /// The identifier of the packaged application
    pub fn uid3(&self) -> u32 {
        self.uid3
    }

    pub fn uid_checksum(&self) -> u32 {
        self.uid_checksum
    }
}

/// A decoded installation package: its header and the top level fields
/// that follow it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SisFile {
    header: SisHeader,
    fields: Vec<Field>,
}

impl SisFile {
    /// Decode a package incrementally from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        SisFile::from_reader_with(reader, &FieldDecoder::new())
    }

    pub fn from_reader_with<R: Read>(reader: R, decoder: &FieldDecoder) -> Result<Self, Error> {
        let mut source = StreamSource::new(reader);
        SisFile::decode(&mut source, decoder)
    }

    /// Decode a package that is already in memory
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        SisFile::from_slice_with(data, &FieldDecoder::new())
    }

    pub fn from_slice_with(data: &[u8], decoder: &FieldDecoder) -> Result<Self, Error> {
        let mut source = SliceSource::new(data);
        SisFile::decode(&mut source, decoder)
    }

    fn decode<S: ByteSource>(source: &mut S, decoder: &FieldDecoder) -> Result<Self, Error> {
        let header = SisHeader::read_from(source)?;
        tracing::debug!(uid3 = header.uid3, "decoding package");
        let fields = decoder.decode_field_sequence(source)?;
        Ok(SisFile { header, fields })
    }

    pub fn header(&self) -> &SisHeader {
        &self.header
    }

    /// The top level fields in the order they were decoded
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Walk every field in the package. The package itself acts as an unseen
    /// root, so top level fields are visited at depth 1.
    pub fn traverse<V: FieldVisitor + ?Sized>(&self, visitor: &mut V) {
        for field in &self.fields {
            field.traverse_at(visitor, 1);
        }
    }

    /// All fields of the given type, in traversal order
    pub fn collect(&self, field_type: FieldType) -> Vec<&Field> {
        fn walk<'a>(field: &'a Field, field_type: FieldType, out: &mut Vec<&'a Field>) {
            if field.field_type() == field_type {
                out.push(field);
            }
            for child in field.children() {
                walk(child, field_type, out);
            }
        }

        let mut out = Vec::new();
        for field in &self.fields {
            walk(field, field_type, &mut out);
        }
        out
    }

    /// The files the package installs
    pub fn files(&self) -> Vec<PackagedFile<'_>> {
        let datas = self.collect(FieldType::FileData);
        self.collect(FieldType::FileDescription)
            .into_iter()
            .filter_map(|field| {
                let description = field.as_file_description()?;
                let data = usize::try_from(description.file_index)
                    .ok()
                    .and_then(|i| datas.get(i).copied());
                Some(PackagedFile {
                    field,
                    description,
                    data,
                })
            })
            .collect()
    }
}

/// A file description joined with the file data it refers to
#[derive(Debug, Clone, Copy)]
pub struct PackagedFile<'a> {
    field: &'a Field,
    description: &'a FileDescription,
    data: Option<&'a Field>,
}

impl<'a> PackagedFile<'a> {
    pub fn description(&self) -> &'a FileDescription {
        self.description
    }

    /// Where the file is installed on the device
    pub fn target(&self) -> &'a str {
        self.field
            .find_child(FieldType::String, 0)
            .and_then(|(_, x)| x.as_text())
            .unwrap_or_default()
    }

    /// The final component of the backslash separated target path, when it
    /// can stand on its own as a file name. Empty names, `.` and `..`, and
    /// names that still hold a separator or a drive prefix yield `None`.
    pub fn file_name(&self) -> Option<&'a str> {
        let target = self.target();
        plain_file_name(target.rsplit('\\').next().unwrap_or(target))
    }

    /// Names of the capabilities the file requests
    pub fn capabilities(&self) -> Option<&'a [&'static str]> {
        self.field
            .find_child(FieldType::Capabilities, 0)
            .and_then(|(_, x)| x.as_capabilities())
            .map(|x| x.names())
    }

    /// The file's contents, expanded from the compressed payload of the
    /// referenced file data
    pub fn contents(&self) -> Option<&'a [u8]> {
        let data = self.data?;
        let (_, compressed) = data.find_child(FieldType::Compressed, 0)?;
        compressed.as_compressed().map(|x| x.data())
    }
}

fn plain_file_name(name: &str) -> Option<&str> {
    if name.contains('/') || name == "." || name == ".." {
        return None;
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

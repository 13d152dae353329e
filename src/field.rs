use crate::{Capabilities, Compressed, Expression};
use std::borrow::Cow;
use std::fmt;

/// The closed set of field kinds, keyed by their on-wire type tag.
///
/// Tag 0 is not a field: it is never produced by the decoder and
/// [`FieldType::new`] rejects it along with anything above 41.
///
/// ```rust
/// use sisinfo::FieldType;
/// assert_eq!(FieldType::new(13), Some(FieldType::Controller));
/// assert_eq!(FieldType::Controller.tag(), 13);
/// assert_eq!(FieldType::Controller.name(), "ControllerField");
/// assert_eq!(FieldType::new(0), None);
/// assert_eq!(FieldType::new(42), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum FieldType {
    String = 1,
    Array,
    Compressed,
    Version,
    VersionRange,
    Date,
    Time,
    DateTime,
    Uid,
    Unused,
    Language,
    Contents,
    Controller,
    Info,
    SupportedLanguages,
    SupportedOptions,
    Prerequisites,
    Dependency,
    Properties,
    Property,
    Signatures,
    CertificateChain,
    Logo,
    FileDescription,
    Hash,
    If,
    ElseIf,
    InstallBlock,
    Expression,
    Data,
    DataUnit,
    FileData,
    SupportedOption,
    ControllerChecksum,
    DataChecksum,
    Signature,
    Blob,
    SignatureAlgorithm,
    SignatureCertificateChain,
    DataIndex,
    Capabilities,
}

impl FieldType {
    /// Every field type, ordered by tag
    pub const ALL: [FieldType; 41] = [
        FieldType::String,
        FieldType::Array,
        FieldType::Compressed,
        FieldType::Version,
        FieldType::VersionRange,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Uid,
        FieldType::Unused,
        FieldType::Language,
        FieldType::Contents,
        FieldType::Controller,
        FieldType::Info,
        FieldType::SupportedLanguages,
        FieldType::SupportedOptions,
        FieldType::Prerequisites,
        FieldType::Dependency,
        FieldType::Properties,
        FieldType::Property,
        FieldType::Signatures,
        FieldType::CertificateChain,
        FieldType::Logo,
        FieldType::FileDescription,
        FieldType::Hash,
        FieldType::If,
        FieldType::ElseIf,
        FieldType::InstallBlock,
        FieldType::Expression,
        FieldType::Data,
        FieldType::DataUnit,
        FieldType::FileData,
        FieldType::SupportedOption,
        FieldType::ControllerChecksum,
        FieldType::DataChecksum,
        FieldType::Signature,
        FieldType::Blob,
        FieldType::SignatureAlgorithm,
        FieldType::SignatureCertificateChain,
        FieldType::DataIndex,
        FieldType::Capabilities,
    ];

    /// Look up the field type for an on-wire tag
    #[inline]
    pub fn new(tag: u32) -> Option<FieldType> {
        let index = usize::try_from(tag).ok()?.checked_sub(1)?;
        FieldType::ALL.get(index).copied()
    }

    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// The display name used when printing a field tree
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::String => "StringField",
            FieldType::Array => "ArrayField",
            FieldType::Compressed => "CompressedField",
            FieldType::Version => "VersionField",
            FieldType::VersionRange => "VersionRangeField",
            FieldType::Date => "DateField",
            FieldType::Time => "TimeField",
            FieldType::DateTime => "DateTimeField",
            FieldType::Uid => "UidField",
            FieldType::Unused => "UnusedField",
            FieldType::Language => "LanguageField",
            FieldType::Contents => "ContentsField",
            FieldType::Controller => "ControllerField",
            FieldType::Info => "InfoField",
            FieldType::SupportedLanguages => "SupportedLanguagesField",
            FieldType::SupportedOptions => "SupportedOptionsField",
            FieldType::Prerequisites => "PrerequisitiesField",
            FieldType::Dependency => "DependencyField",
            FieldType::Properties => "PropertiesField",
            FieldType::Property => "PropertyField",
            FieldType::Signatures => "SignaturesField",
            FieldType::CertificateChain => "CertificateChainField",
            FieldType::Logo => "LogoField",
            FieldType::FileDescription => "FileDescriptionField",
            FieldType::Hash => "HashField",
            FieldType::If => "IfField",
            FieldType::ElseIf => "ElseIfField",
            FieldType::InstallBlock => "InstallBlockField",
            FieldType::Expression => "ExpressionField",
            FieldType::Data => "DataField",
            FieldType::DataUnit => "DataUnitField",
            FieldType::FileData => "FileDataField",
            FieldType::SupportedOption => "SupportedOptionField",
            FieldType::ControllerChecksum => "ControllerChecksumField",
            FieldType::DataChecksum => "DataChecksumField",
            FieldType::Signature => "SignatureField",
            FieldType::Blob => "BlobField",
            FieldType::SignatureAlgorithm => "SignatureAlgorithmField",
            FieldType::SignatureCertificateChain => "SignatureCertificateChainField",
            FieldType::DataIndex => "DataIndexField",
            FieldType::Capabilities => "CapabilitiesField",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub build: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Time {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// The trailing scalars of an info field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InstallInfo {
    pub install_type: u8,
    pub install_flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Property {
    pub key: i32,
    pub value: i32,
}

/// Where an installable file goes and where its bytes live. The file's
/// target path, mime type, capabilities and hash are the description's
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileDescription {
    pub operation: u32,
    pub operation_options: u32,
    pub compressed_length: u64,
    pub uncompressed_length: u64,

    /// Index of the file data entry within a data unit
    pub file_index: u32,
}

/// Data carried by a field in addition to its children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldData {
    /// Purely structural fields and fields that were skipped
    #[default]
    None,
    Text(String),
    Compressed(Compressed),
    Version(Version),
    Date(Date),
    Time(Time),
    Uid(u32),
    Language(u32),
    Info(InstallInfo),
    Property(Property),
    FileDescription(FileDescription),
    HashAlgorithm(u32),
    Expression(Expression),
    /// Controller and data checksums. Stored, never verified.
    Checksum(u16),
    Blob(Vec<u8>),
    DataIndex(u32),
    Capabilities(Capabilities),
}

/// A single decoded node of the field tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    field_type: FieldType,
    length: u64,
    children: Vec<Field>,
    data: FieldData,
}

impl Field {
    pub fn new(field_type: FieldType, length: u64, children: Vec<Field>, data: FieldData) -> Self {
        Field {
            field_type,
            length,
            children,
            data,
        }
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Declared byte length of the payload. Excludes the type tag, the
    /// length encoding, and trailing padding.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Whether the length was written in the two word form. The first word
    /// is kept whole when the words are combined, so extended lengths always
    /// have the top bit set.
    #[inline]
    pub fn is_extended_length(&self) -> bool {
        self.length & (1 << 63) != 0
    }

    /// Size in bytes of the length encoding that preceded the payload
    #[inline]
    pub fn length_size(&self) -> u64 {
        if self.is_extended_length() {
            8
        } else {
            4
        }
    }

    #[inline]
    pub fn children(&self) -> &[Field] {
        &self.children
    }

    #[inline]
    pub fn data(&self) -> &FieldData {
        &self.data
    }

    /// Linear scan of the immediate children, starting at `start`, for the
    /// first child of the given type. Returns its index alongside it.
    ///
    /// ```rust
    /// use sisinfo::{Field, FieldData, FieldType};
    /// let child = |t| Field::new(t, 0, Vec::new(), FieldData::None);
    /// let parent = Field::new(
    ///     FieldType::Array,
    ///     0,
    ///     vec![child(FieldType::Uid), child(FieldType::Date), child(FieldType::Uid)],
    ///     FieldData::None,
    /// );
    /// assert_eq!(parent.find_child(FieldType::Uid, 0).map(|(i, _)| i), Some(0));
    /// assert_eq!(parent.find_child(FieldType::Uid, 1).map(|(i, _)| i), Some(2));
    /// assert!(parent.find_child(FieldType::Time, 0).is_none());
    /// ```
    pub fn find_child(&self, field_type: FieldType, start: usize) -> Option<(usize, &Field)> {
        self.children
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, child)| child.field_type == field_type)
    }

    /// Depth first, pre-order walk of this field and its descendants. This
    /// field is visited at depth 0.
    pub fn traverse<V: FieldVisitor + ?Sized>(&self, visitor: &mut V) {
        self.traverse_at(visitor, 0)
    }

    pub(crate) fn traverse_at<V: FieldVisitor + ?Sized>(&self, visitor: &mut V, depth: usize) {
        visitor.visit(self, depth);
        for child in &self.children {
            child.traverse_at(visitor, depth + 1);
        }
    }

    /// Human readable rendering of the field's scalar data. Kinds without a
    /// natural rendering yield an empty string.
    pub fn readable_str(&self) -> Cow<'_, str> {
        match &self.data {
            FieldData::Text(text) => Cow::Borrowed(text.as_str()),
            FieldData::Version(v) => Cow::Owned(format!("{}.{}.{}", v.major, v.minor, v.build)),
            FieldData::Date(d) => Cow::Owned(format!("{}.{}.{}", d.year, d.month, d.day)),
            FieldData::Time(t) => Cow::Owned(format!("{}:{}:{}", t.hours, t.minutes, t.seconds)),
            FieldData::Uid(uid) => Cow::Owned(format!("{:#x}", uid)),
            FieldData::Language(language) => Cow::Owned(language.to_string()),
            FieldData::Capabilities(caps) => Cow::Owned(caps.names().join(" ")),
            FieldData::FileDescription(desc) => Cow::Owned(format!("index: {}", desc.file_index)),
            _ => Cow::Borrowed(""),
        }
    }

    /// The decoded text of a string field
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            FieldData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_compressed(&self) -> Option<&Compressed> {
        match &self.data {
            FieldData::Compressed(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_capabilities(&self) -> Option<&Capabilities> {
        match &self.data {
            FieldData::Capabilities(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_file_description(&self) -> Option<&FileDescription> {
        match &self.data {
            FieldData::FileDescription(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match &self.data {
            FieldData::Blob(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match &self.data {
            FieldData::Expression(x) => Some(x),
            _ => None,
        }
    }
}

/// Receives every node of a [Field::traverse] walk along with its depth
///
/// Implemented for closures:
///
/// ```rust
/// use sisinfo::{Field, FieldData, FieldType};
/// let leaf = Field::new(FieldType::Uid, 4, Vec::new(), FieldData::Uid(0x2000_1234));
/// let root = Field::new(FieldType::Array, 12, vec![leaf], FieldData::None);
/// let mut seen = Vec::new();
/// root.traverse(&mut |field: &Field, depth: usize| {
///     seen.push((field.field_type(), depth));
/// });
/// assert_eq!(seen, vec![(FieldType::Array, 0), (FieldType::Uid, 1)]);
/// ```
pub trait FieldVisitor {
    fn visit(&mut self, field: &Field, depth: usize);
}

impl<F> FieldVisitor for F
where
    F: FnMut(&Field, usize),
{
    #[inline]
    fn visit(&mut self, field: &Field, depth: usize) {
        self(field, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn leaf(field_type: FieldType, data: FieldData) -> Field {
        Field::new(field_type, 0, Vec::new(), data)
    }

    #[test]
    fn test_field_type_tags_are_dense() {
        for (i, field_type) in FieldType::ALL.iter().enumerate() {
            assert_eq!(field_type.tag() as usize, i + 1);
            assert_eq!(FieldType::new(field_type.tag()), Some(*field_type));
        }
    }

    #[rstest]
    #[case(FieldData::Text(String::from("!:\\sys\\bin\\app.exe")), "!:\\sys\\bin\\app.exe")]
    #[case(FieldData::Version(Version { major: 1, minor: 2, build: 345 }), "1.2.345")]
    #[case(FieldData::Date(Date { year: 2007, month: 3, day: 9 }), "2007.3.9")]
    #[case(FieldData::Time(Time { hours: 14, minutes: 5, seconds: 0 }), "14:5:0")]
    #[case(FieldData::Uid(0x2000_1a7a), "0x20001a7a")]
    #[case(FieldData::Language(1), "1")]
    #[case(FieldData::Property(Property { key: 3, value: -1 }), "")]
    #[case(FieldData::DataIndex(4), "")]
    #[case(FieldData::Capabilities(Capabilities::from_bits(0b1_0000_0000_0100_0000)), "DRM WriteUserData")]
    #[case(FieldData::FileDescription(FileDescription {
        operation: 1,
        operation_options: 0,
        compressed_length: 10,
        uncompressed_length: 20,
        file_index: 3,
    }), "index: 3")]
    #[case(FieldData::Checksum(0xbeef), "")]
    #[case(FieldData::Blob(vec![1, 2, 3]), "")]
    #[case(FieldData::None, "")]
    fn test_readable_str(#[case] data: FieldData, #[case] expected: &str) {
        assert_eq!(leaf(FieldType::String, data).readable_str(), expected);
    }

    #[test]
    fn test_find_child_from_start() {
        let parent = Field::new(
            FieldType::Array,
            0,
            vec![
                leaf(FieldType::Uid, FieldData::Uid(1)),
                leaf(FieldType::Date, FieldData::None),
                leaf(FieldType::Uid, FieldData::Uid(2)),
            ],
            FieldData::None,
        );

        let (index, child) = parent.find_child(FieldType::Uid, 0).unwrap();
        assert_eq!(index, 0);
        assert_eq!(child.data(), &FieldData::Uid(1));

        let (index, child) = parent.find_child(FieldType::Uid, 1).unwrap();
        assert_eq!(index, 2);
        assert_eq!(child.data(), &FieldData::Uid(2));

        assert!(parent.find_child(FieldType::Uid, 3).is_none());
        assert!(parent.find_child(FieldType::Uid, 10).is_none());
    }

    #[test]
    fn test_traverse_is_preorder() {
        let tree = Field::new(
            FieldType::Controller,
            0,
            vec![
                Field::new(
                    FieldType::Info,
                    0,
                    vec![leaf(FieldType::Uid, FieldData::Uid(7))],
                    FieldData::None,
                ),
                leaf(FieldType::DataIndex, FieldData::DataIndex(0)),
            ],
            FieldData::None,
        );

        let mut seen = Vec::new();
        tree.traverse(&mut |field: &Field, depth: usize| seen.push((field.field_type(), depth)));
        assert_eq!(
            seen,
            vec![
                (FieldType::Controller, 0),
                (FieldType::Info, 1),
                (FieldType::Uid, 2),
                (FieldType::DataIndex, 1),
            ]
        );
    }

    #[test]
    fn test_length_size() {
        assert_eq!(leaf(FieldType::Blob, FieldData::None).length_size(), 4);
        let extended = Field::new(FieldType::Blob, 0x8000_0000_0000_0010, Vec::new(), FieldData::None);
        assert!(extended.is_extended_length());
        assert_eq!(extended.length_size(), 8);
    }
}

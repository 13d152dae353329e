use crate::{
    decoder::{Body, Context},
    kinds, ByteSource, Error, FieldType,
};

/// Decodes the body of a field once its type and length are known
pub(crate) type BodyDecoder = fn(&mut Context, &mut dyn ByteSource, u64) -> Result<Body, Error>;

/// One entry per field type, indexed by tag - 1
static REGISTRY: [(FieldType, BodyDecoder); 41] = [
    (FieldType::String, kinds::string),
    (FieldType::Array, kinds::array),
    (FieldType::Compressed, kinds::compressed),
    (FieldType::Version, kinds::version),
    (FieldType::VersionRange, kinds::version_range),
    (FieldType::Date, kinds::date),
    (FieldType::Time, kinds::time),
    (FieldType::DateTime, kinds::two_fields),
    (FieldType::Uid, kinds::uid),
    (FieldType::Unused, kinds::unsupported),
    (FieldType::Language, kinds::language),
    (FieldType::Contents, kinds::contents),
    (FieldType::Controller, kinds::controller),
    (FieldType::Info, kinds::info),
    (FieldType::SupportedLanguages, kinds::one_field),
    (FieldType::SupportedOptions, kinds::one_field),
    (FieldType::Prerequisites, kinds::two_fields),
    (FieldType::Dependency, kinds::three_fields),
    (FieldType::Properties, kinds::one_field),
    (FieldType::Property, kinds::property),
    (FieldType::Signatures, kinds::unsupported),
    (FieldType::CertificateChain, kinds::one_field),
    (FieldType::Logo, kinds::one_field),
    (FieldType::FileDescription, kinds::file_description),
    (FieldType::Hash, kinds::hash),
    (FieldType::If, kinds::three_fields),
    (FieldType::ElseIf, kinds::two_fields),
    (FieldType::InstallBlock, kinds::three_fields),
    (FieldType::Expression, kinds::expression),
    (FieldType::Data, kinds::one_field),
    (FieldType::DataUnit, kinds::one_field),
    (FieldType::FileData, kinds::one_field),
    (FieldType::SupportedOption, kinds::one_field),
    (FieldType::ControllerChecksum, kinds::checksum),
    (FieldType::DataChecksum, kinds::checksum),
    (FieldType::Signature, kinds::two_fields),
    (FieldType::Blob, kinds::blob),
    (FieldType::SignatureAlgorithm, kinds::one_field),
    (FieldType::SignatureCertificateChain, kinds::two_fields),
    (FieldType::DataIndex, kinds::data_index),
    (FieldType::Capabilities, kinds::capabilities),
];

#[inline]
pub(crate) fn body_decoder(field_type: FieldType) -> BodyDecoder {
    let (registered, decoder) = REGISTRY[field_type.tag() as usize - 1];
    debug_assert_eq!(registered, field_type);
    decoder
}

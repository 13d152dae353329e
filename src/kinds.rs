//! Body decoders for each field kind. Each is handed the source positioned
//! just past the field's length encoding along with the declared length, and
//! must consume exactly that many bytes.

use crate::{
    decoder::{Body, Context},
    operator_arity,
    util::le_uint,
    ByteSource, Capabilities, Compressed, Date, Error, ErrorKind, Expression, FieldData, FieldType,
    FileDescription, InstallInfo, Property, Time, Version,
};

/// Field kinds whose contents are either undefined or deliberately ignored
pub(crate) fn unsupported(
    _cx: &mut Context,
    src: &mut dyn ByteSource,
    length: u64,
) -> Result<Body, Error> {
    src.skip(length)?;
    Ok(Body::empty())
}

pub(crate) fn string(_cx: &mut Context, src: &mut dyn ByteSource, length: u64) -> Result<Body, Error> {
    let data = src.read_vec(length)?;

    // Little endian unless a byte order mark says otherwise
    let (text, _, _) = encoding_rs::UTF_16LE.decode(&data);
    Ok(Body::data(FieldData::Text(text.into_owned())))
}

/// An element type followed by elements of that type (without their tags)
/// until the declared length is used up
pub(crate) fn array(cx: &mut Context, src: &mut dyn ByteSource, length: u64) -> Result<Body, Error> {
    let offset = src.position();
    let budget = length.checked_sub(4).ok_or_else(|| {
        Error::new(ErrorKind::MalformedContainer {
            field_type: FieldType::Array,
            length,
            consumed: 0,
            offset,
        })
    })?;

    let tag = src.read_u32()?;
    let element = FieldType::new(tag)
        .ok_or_else(|| Error::new(ErrorKind::UnknownFieldType { tag, offset }))?;

    let start = src.position();
    let mut children = Vec::new();
    while src.position() - start < budget {
        children.push(cx.element(src, element)?);
    }

    Ok(Body::children(children))
}

pub(crate) fn compressed(
    _cx: &mut Context,
    src: &mut dyn ByteSource,
    length: u64,
) -> Result<Body, Error> {
    let offset = src.position();
    let payload_len = length.checked_sub(12).ok_or_else(|| {
        Error::new(ErrorKind::MalformedContainer {
            field_type: FieldType::Compressed,
            length,
            consumed: 0,
            offset,
        })
    })?;

    let algorithm = src.read_u32()?;
    let uncompressed_size = src.read_u64()?;
    let payload = src.read_vec(payload_len)?;
    let compressed = Compressed::new(algorithm, uncompressed_size, payload)?;
    Ok(Body::data(FieldData::Compressed(compressed)))
}

pub(crate) fn version(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let major = src.read_i32()?;
    let minor = src.read_i32()?;
    let build = src.read_i32()?;
    Ok(Body::data(FieldData::Version(Version {
        major,
        minor,
        build,
    })))
}

/// A lower bound version, optionally followed by an upper bound
pub(crate) fn version_range(
    cx: &mut Context,
    src: &mut dyn ByteSource,
    length: u64,
) -> Result<Body, Error> {
    let start = src.position();
    let mut children = vec![cx.required_field(src)?];
    if src.position() - start < length {
        children.push(cx.required_field(src)?);
    }
    Ok(Body::children(children))
}

pub(crate) fn date(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let year = src.read_u16()?;
    let month = src.read_u8()?;
    let day = src.read_u8()?;
    Ok(Body::data(FieldData::Date(Date { year, month, day })))
}

pub(crate) fn time(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let hours = src.read_u8()?;
    let minutes = src.read_u8()?;
    let seconds = src.read_u8()?;
    Ok(Body::data(FieldData::Time(Time {
        hours,
        minutes,
        seconds,
    })))
}

pub(crate) fn uid(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    Ok(Body::data(FieldData::Uid(src.read_u32()?)))
}

pub(crate) fn language(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    Ok(Body::data(FieldData::Language(src.read_u32()?)))
}

/// Top level fields where compressed fields are transparently replaced with
/// the field they decompress to
pub(crate) fn contents(cx: &mut Context, src: &mut dyn ByteSource, length: u64) -> Result<Body, Error> {
    let start = src.position();
    let mut children = Vec::new();
    while src.position() - start < length {
        let Some(field) = cx.field(src)? else {
            break;
        };

        if let Some(payload) = field.as_compressed() {
            if let Some(inner) = cx.expand(payload)? {
                children.push(inner);
            }
        } else {
            children.push(field);
        }
    }

    Ok(Body::children(children))
}

/// A block that is read out whole and then decoded as its own field stream
pub(crate) fn controller(
    cx: &mut Context,
    src: &mut dyn ByteSource,
    length: u64,
) -> Result<Body, Error> {
    let data = src.read_vec(length)?;
    let children = cx.block(&data)?;
    Ok(Body::children(children))
}

/// Uid, unique vendor name, names, vendor names, version, creation time,
/// then the install type and flags
pub(crate) fn info(cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let children = cx.required_fields(src, 6)?;
    let install_type = src.read_u8()?;
    let install_flags = src.read_u8()?;
    Ok(Body::children(children).with_data(FieldData::Info(InstallInfo {
        install_type,
        install_flags,
    })))
}

pub(crate) fn one_field(cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    Ok(Body::children(cx.required_fields(src, 1)?))
}

pub(crate) fn two_fields(cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    Ok(Body::children(cx.required_fields(src, 2)?))
}

pub(crate) fn three_fields(
    cx: &mut Context,
    src: &mut dyn ByteSource,
    _length: u64,
) -> Result<Body, Error> {
    Ok(Body::children(cx.required_fields(src, 3)?))
}

pub(crate) fn property(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let key = src.read_i32()?;
    let value = src.read_i32()?;
    Ok(Body::data(FieldData::Property(Property { key, value })))
}

/// Target, mime type, optional capabilities, hash, then the fixed width
/// placement details
pub(crate) fn file_description(
    cx: &mut Context,
    src: &mut dyn ByteSource,
    _length: u64,
) -> Result<Body, Error> {
    let mut children = cx.required_fields(src, 3)?;
    if children[2].field_type() == FieldType::Capabilities {
        children.push(cx.required_field(src)?);
    }

    let operation = src.read_u32()?;
    let operation_options = src.read_u32()?;
    let compressed_length = src.read_u64()?;
    let uncompressed_length = src.read_u64()?;
    let file_index = src.read_u32()?;
    let desc = FileDescription {
        operation,
        operation_options,
        compressed_length,
        uncompressed_length,
        file_index,
    };
    Ok(Body::children(children).with_data(FieldData::FileDescription(desc)))
}

pub(crate) fn hash(cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    let algorithm = src.read_u32()?;
    let children = cx.required_fields(src, 1)?;
    Ok(Body::children(children).with_data(FieldData::HashAlgorithm(algorithm)))
}

pub(crate) fn expression(
    cx: &mut Context,
    src: &mut dyn ByteSource,
    _length: u64,
) -> Result<Body, Error> {
    let operator = src.read_u32()?;
    let integer_value = src.read_i32()?;
    let children = cx.required_fields(src, operator_arity(operator))?;
    Ok(Body::children(children).with_data(FieldData::Expression(Expression {
        operator,
        integer_value,
    })))
}

pub(crate) fn checksum(_cx: &mut Context, src: &mut dyn ByteSource, _length: u64) -> Result<Body, Error> {
    Ok(Body::data(FieldData::Checksum(src.read_u16()?)))
}

pub(crate) fn blob(_cx: &mut Context, src: &mut dyn ByteSource, length: u64) -> Result<Body, Error> {
    Ok(Body::data(FieldData::Blob(src.read_vec(length)?)))
}

pub(crate) fn data_index(
    _cx: &mut Context,
    src: &mut dyn ByteSource,
    _length: u64,
) -> Result<Body, Error> {
    Ok(Body::data(FieldData::DataIndex(src.read_u32()?)))
}

/// The whole payload is one little endian bitmask
pub(crate) fn capabilities(
    _cx: &mut Context,
    src: &mut dyn ByteSource,
    length: u64,
) -> Result<Body, Error> {
    let data = src.read_vec(length)?;
    let caps = Capabilities::from_bits(le_uint(&data));
    Ok(Body::data(FieldData::Capabilities(caps)))
}

/*!

A decoder for [SIS](https://en.wikipedia.org/wiki/.sis) installation packages
used by Symbian OS 9 and later.

A package is a 16 byte header followed by a tree of type-length-value
fields. Sisinfo turns the field stream into an owned tree of [Field]s:
compressed payloads are inflated on the fly, controller blocks are decoded as
nested field streams, and every container is checked to consume exactly the
length it declares.

## Features

- ✔ Incremental: Decode from any [Read](std::io::Read) or from memory
- ✔ Strict: Containers that disagree with their declared lengths are rejected
- ✔ Safe: Recursion is bounded and corrupted lengths can't force large allocations
- ✔ Inspectable: Walk the tree with a [FieldVisitor] or serialize it with serde

## Quick Start

```rust
use sisinfo::{FieldData, FieldType, SisFile};

let mut data = Vec::new();

// header: uid1, uid2, uid3, uid checksum
for uid in [0x10201a7au32, 0, 0x2000_1234, 0] {
    data.extend_from_slice(&uid.to_le_bytes());
}

// a uid field with a 4 byte body
data.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00]);
data.extend_from_slice(&0x2000_1234u32.to_le_bytes());

let file = SisFile::from_slice(&data).unwrap();
assert_eq!(file.header().uid3(), 0x2000_1234);
assert_eq!(file.fields()[0].field_type(), FieldType::Uid);
assert_eq!(file.fields()[0].data(), &FieldData::Uid(0x2000_1234));
assert_eq!(file.fields()[0].readable_str(), "0x20001234");
```

## Decoding fields

Packages aren't the only place fields are found. A [FieldDecoder] decodes
fields from any [ByteSource], which comes in two flavors: [StreamSource]
wraps a reader and [SliceSource] borrows bytes already in memory. Padding is
always relative to the source, so a source created over an extracted payload
aligns from the start of that payload.

```rust
use sisinfo::{FieldDecoder, FieldType, SliceSource};

let data = [
    0x22, 0x00, 0x00, 0x00, // controller checksum
    0x02, 0x00, 0x00, 0x00, // 2 byte body
    0xef, 0xbe, 0x00, 0x00, // checksum and padding
];

let decoder = FieldDecoder::builder().max_depth(16).build();
let field = decoder.decode_field(&mut SliceSource::new(&data)).unwrap().unwrap();
assert_eq!(field.field_type(), FieldType::ControllerChecksum);
```

## Walking the tree

```rust
use sisinfo::{Field, FieldData, FieldType};

let uid = Field::new(FieldType::Uid, 4, Vec::new(), FieldData::Uid(1));
let array = Field::new(FieldType::Array, 12, vec![uid], FieldData::None);

let mut lines = Vec::new();
array.traverse(&mut |field: &Field, depth: usize| {
    lines.push(format!("{}{}", "  ".repeat(depth), field.field_type()));
});
assert_eq!(lines, vec!["ArrayField", "  UidField"]);
```
*/

mod capabilities;
mod compressed;
mod decoder;
mod errors;
mod expression;
mod field;
mod header;
mod kinds;
mod registry;
mod source;
pub(crate) mod util;

pub use self::capabilities::{Capabilities, CAPABILITY_NAMES};
pub use self::compressed::{Compressed, CompressionAlgorithm};
pub use self::decoder::{
    decode_field, decode_field_sequence, FieldDecoder, FieldDecoderBuilder, DEFAULT_MAX_DEPTH,
};
pub use self::errors::*;
pub use self::expression::{operator_arity, Expression};
pub use self::field::*;
pub use self::header::{PackagedFile, SisFile, SisHeader};
pub use self::source::{ByteSource, SliceSource, StreamSource};

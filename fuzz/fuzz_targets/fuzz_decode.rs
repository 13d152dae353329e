#![no_main]
use libfuzzer_sys::fuzz_target;
use sisinfo::{Field, FieldDecoder, SisFile, SliceSource, StreamSource};

fuzz_target!(|data: &[u8]| {
    let decoder = FieldDecoder::builder().max_depth(32).build();
    let from_slice = decoder.decode_field_sequence(&mut SliceSource::new(data));
    let from_stream = decoder.decode_field_sequence(&mut StreamSource::new(data));

    // Both sources must agree on the outcome
    match (&from_slice, &from_stream) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.offset(), b.offset()),
        _ => panic!("sources disagree: {:?} {:?}", from_slice, from_stream),
    }

    if let Ok(fields) = from_slice {
        for field in &fields {
            field.traverse(&mut |x: &Field, _depth: usize| {
                let _ = x.readable_str();
            });
        }
    }

    if let Ok(file) = SisFile::from_slice(data) {
        for packaged in file.files() {
            let _ = packaged.file_name();
            let _ = packaged.contents();
        }
    }
});

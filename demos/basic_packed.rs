use sectorkit::error::InsertError;
use sectorkit::policy::packed::PackedLruCache;
use sectorkit::schema::{FieldValue, Schema};

fn main() {
    // fixed: id (uint32), score (float); variable: samples (int16)
    let schema = Schema::parse(&["uint32", "float"], Some("int16")).unwrap();
    let mut cache = PackedLruCache::new(schema, 64, 100, 2);

    let record = [
        FieldValue::Uint32(7),
        FieldValue::Float64(0.1),
        FieldValue::Int16(-2),
        FieldValue::Int16(5),
    ];
    cache.insert("player", &record).unwrap();
    println!("stored {} bytes", cache.write_offset());
    println!("decoded: {:?}", cache.get(&"player").unwrap());

    let too_big: Vec<FieldValue> = [FieldValue::Uint32(1), FieldValue::Float32(0.0)]
        .into_iter()
        .chain((0..40).map(FieldValue::Int16))
        .collect();
    match cache.insert("huge", &too_big) {
        Err(InsertError::TooLarge { size, capacity }) => {
            println!("rejected: {size} bytes > {capacity}")
        },
        other => println!("unexpected: {other:?}"),
    }
}

// Expected output:
// stored 14 bytes
// decoded: [Uint32(7), Float32(0.1), Int16(-2), Int16(5)]
// rejected: 90 bytes > 64
//
// Explanation: 4 + 4 + 2 (count) + 2 * 2 = 14 bytes. The float field keeps
// single precision only. 40 samples need 10 + 80 = 90 bytes, more than one
// 64-byte arena, so the insert fails and the cache is unchanged.

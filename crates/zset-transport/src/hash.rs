use std::io::Cursor;

/// MurmurHash3 (x86, 32-bit, seed 0) of an endpoint string.
pub fn endpoint_hash(endpoint: &str) -> u32 {
    // Reading from an in-memory cursor cannot fail.
    murmur3::murmur3_32(&mut Cursor::new(endpoint.as_bytes()), 0).unwrap_or(0)
}

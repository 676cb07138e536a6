use sha2::{Digest, Sha256};
use std::io::{self, Read};

pub const CHUNK_SIZE: usize = 1024 * 15; // 15kb

/// Everything read from a source, plus what was learned while reading it.
#[derive(Debug)]
pub struct ChunkedContent {
    pub data: Vec<u8>,
    pub chunk_count: usize,
    /// Hex SHA-256 of `data`, computed chunk by chunk
    pub sha256: String,
}

/// Reads `reader` to completion in `chunk_size` pieces.
///
/// Interrupted reads are retried; any other error aborts the whole read so a
/// partially read file is never returned.
pub fn read_chunks<R: Read + ?Sized>(
    reader: &mut R,
    chunk_size: usize,
) -> io::Result<ChunkedContent> {
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut hasher = Sha256::new();
    let mut data = Vec::new();
    let mut chunk_count = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if bytes_read == 0 {
            break;
        }

        let chunk = &buffer[..bytes_read];
        hasher.update(chunk);
        data.extend_from_slice(chunk);
        chunk_count += 1;
    }

    Ok(ChunkedContent {
        data,
        chunk_count,
        sha256: hex::encode(hasher.finalize()),
    })
}

/// Hash a given data slice and return a hexadecimal string.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::xxh3::{Hash128, HasherExt as _};

const HASH_CHUNK_LENGTH: usize = 8192; // 8KB

/// Streaming whole-file digest via XXH3-128. Collision resistance is
/// not a security requirement here; this only has to tell "same bytes"
/// from "different bytes" with negligible accident probability.
pub fn content_hash(file: &Path) -> io::Result<u128> {
    let mut f = File::open(file)?;
    let mut hasher = Hash128::with_seed(0);
    let mut buffer = vec![0u8; HASH_CHUNK_LENGTH];

    loop {
        let bytes_read = f.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.write(&buffer[..bytes_read]);
    }

    Ok(hasher.finish_ext())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_same_content_same_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");
        // Larger than one chunk to exercise the streaming loop.
        let content = vec![0x5Au8; HASH_CHUNK_LENGTH * 3 + 17];
        fs::write(&a, &content).unwrap();
        fs::write(&b, &content).unwrap();

        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn test_different_content_different_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");
        fs::write(&a, b"hello world").unwrap();
        fs::write(&b, b"hello worle").unwrap();

        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(content_hash(&tmp.path().join("nope.bin")).is_err());
    }
}

//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{random}.{extension}`, where `random` is 128 bits
//! from the thread-local CSPRNG, hex encoded (32 lowercase characters).

use crate::traits::{StorageError, StorageResult};

/// Bytes of randomness in a generated file name.
const RANDOM_NAME_BYTES: usize = 16;

/// Reject keys that could escape a backend's root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key has an empty or relative segment: {}",
            key
        )));
    }
    Ok(())
}

/// Random hex file stem with 128 bits of entropy.
pub fn random_name() -> String {
    let bytes: [u8; RANDOM_NAME_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Generate a fresh storage key for an image in `folder`.
///
/// Uniqueness is probabilistic: there is no existence check and no retry, so
/// two calls collide only if the 128-bit random names do. The chance is
/// negligible but not zero.
pub fn generate_image_key(folder: &str, extension: &str) -> StorageResult<String> {
    let folder = folder.trim_matches('/');
    validate_key(folder)?;
    Ok(format!("{}/{}.{}", folder, random_name(), extension))
}

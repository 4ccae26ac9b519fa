use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AllowlistError, Result};
use crate::hash::{Hash, HASH_LEN};

/// Encodes a byte string as lowercase `0x`-prefixed hex.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte hash (a Merkle root, leaf or sibling) from hex.
///
/// # Arguments
/// * `hash_str` - `0x`-prefixed, 64 hex characters, either case
///
/// # Errors
/// Returns [`AllowlistError::InvalidHash`] if the prefix, length or characters are wrong.
pub fn parse_hash(hash_str: &str) -> Result<Hash> {
    let trimmed = hash_str.trim();
    let invalid = || AllowlistError::InvalidHash {
        input: hash_str.to_string(),
    };
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if cleaned.len() != 2 * HASH_LEN {
        return Err(invalid());
    }
    let mut hash = [0u8; HASH_LEN];
    hex::decode_to_slice(cleaned, &mut hash).map_err(|_| invalid())?;
    Ok(hash)
}

/// Writes `contents` to `path` via a sibling temp file and a rename, so readers
/// never observe a half-written file. The temp file is removed on failure.
pub fn write_file_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let temp_path = temp_path_for(path);
    let result = File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// `root.json` -> `root.json.tmp`, so outputs sharing a stem never collide.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serde adapter for a [`Hash`] stored as a `0x` hex string.
pub mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{hex_encode, parse_hash};
    use crate::hash::Hash;

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hash(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional [`Hash`].
pub mod hex_hash_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{hex_encode, parse_hash};
    use crate::hash::Hash;

    pub fn serialize<S: Serializer>(hash: &Option<Hash>, serializer: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(hash) => serializer.serialize_some(&hex_encode(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Hash>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_hash(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

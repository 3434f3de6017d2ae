use sha2::{Digest, Sha256};
use std::{convert::TryFrom, fmt};

/// A 256-bit hash kept in internal (little-endian) byte order.
///
/// Displayed and parsed in the reversed, big-endian hex form that block
/// explorers and the reference client print.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    pub fn zero() -> Self {
        Hash256([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<&str> for Hash256 {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(s).map_err(|e| e.to_string())?;

        if bytes.len() != 32 {
            return Err(format!(
                "Invalid hex string length: expected 64 chars (32 bytes), found {} bytes",
                bytes.len()
            ));
        }

        bytes.reverse();
        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Hash256(array))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

pub fn sha256d(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash256(second.into())
}

/// Computes the identity hash of a serialized 80-byte block header.
///
/// The identity hash is chosen by the consensus layer, so profile
/// construction takes it as a collaborator instead of hardcoding one.
pub trait HeaderHasher: Send + Sync {
    fn hash_header(&self, header: &[u8; 80]) -> Hash256;
}

/// Bitcoin-style double SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleSha256;

impl HeaderHasher for DoubleSha256 {
    fn hash_header(&self, header: &[u8; 80]) -> Hash256 {
        sha256d(header)
    }
}

impl<F> HeaderHasher for F
where
    F: Fn(&[u8; 80]) -> Hash256 + Send + Sync,
{
    fn hash_header(&self, header: &[u8; 80]) -> Hash256 {
        self(header)
    }
}

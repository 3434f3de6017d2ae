use anyhow::{anyhow, Result};
use std::{fmt, str::FromStr};

/// The closed set of networks this node knows how to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkId {
    Main,
    Testnet,
}

impl NetworkId {
    pub const ALL: [NetworkId; 2] = [NetworkId::Main, NetworkId::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Main => "main",
            NetworkId::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(NetworkId::Main),
            "test" | "testnet" => Ok(NetworkId::Testnet),
            other => Err(anyhow!("Unknown network identifier: {:?}", other)),
        }
    }
}

impl TryFrom<u8> for NetworkId {
    type Error = anyhow::Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(NetworkId::Main),
            1 => Ok(NetworkId::Testnet),
            other => Err(anyhow!("Unknown network identifier: {}", other)),
        }
    }
}

/// Kinds of base58 payloads that carry a network version prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base58Type {
    PubkeyAddress,
    ScriptAddress,
    SecretKey,
    ExtPublicKey,
    ExtSecretKey,
}

impl Base58Type {
    pub const ALL: [Base58Type; 5] = [
        Base58Type::PubkeyAddress,
        Base58Type::ScriptAddress,
        Base58Type::SecretKey,
        Base58Type::ExtPublicKey,
        Base58Type::ExtSecretKey,
    ];

    pub fn prefix_len(&self) -> usize {
        match self {
            Base58Type::PubkeyAddress | Base58Type::ScriptAddress | Base58Type::SecretKey => 1,
            Base58Type::ExtPublicKey | Base58Type::ExtSecretKey => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base58Prefixes {
    pub pubkey_address: [u8; 1],
    pub script_address: [u8; 1],
    pub secret_key: [u8; 1],
    pub ext_public_key: [u8; 4],
    pub ext_secret_key: [u8; 4],
}

impl Base58Prefixes {
    pub fn get(&self, kind: Base58Type) -> &[u8] {
        match kind {
            Base58Type::PubkeyAddress => &self.pubkey_address,
            Base58Type::ScriptAddress => &self.script_address,
            Base58Type::SecretKey => &self.secret_key,
            Base58Type::ExtPublicKey => &self.ext_public_key,
            Base58Type::ExtSecretKey => &self.ext_secret_key,
        }
    }

    /// True when no prefix of one kind repeats another kind's prefix.
    pub fn is_internally_unique(&self) -> bool {
        Base58Type::ALL.iter().enumerate().all(|(i, a)| {
            Base58Type::ALL[i + 1..]
                .iter()
                .all(|b| self.get(*a) != self.get(*b))
        })
    }

    /// True when no prefix here equals any prefix of `other`.
    pub fn is_disjoint_from(&self, other: &Base58Prefixes) -> bool {
        Base58Type::ALL.iter().all(|a| {
            Base58Type::ALL
                .iter()
                .all(|b| self.get(*a) != other.get(*b))
        })
    }
}

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};

use crate::{
    encode::{write_compact_size, write_var_bytes, ScriptBuilder},
    hash::{sha256d, Hash256, HeaderHasher},
    pow::target_from_compact,
    U256,
};

pub const GENESIS_VERSION: i32 = 1;
pub const GENESIS_TIMESTAMP: u32 = 1511976360;

// Value of UK's housing stock soars past £6 trillion
pub const GENESIS_HEADLINE: &str =
    "https://www.theguardian.com/money/2017/nov/29/value-of-uks-housing-stock-soars-past-6tn";
pub const GENESIS_SCRIPT_TOKENS: (i64, i64) = (4867235, 42);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutPoint {
    pub hash: Hash256,
    pub index: u32,
}

impl OutPoint {
    pub fn null() -> Self {
        OutPoint {
            hash: Hash256::zero(),
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == u32::MAX
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    pub fn empty() -> Self {
        TxOut {
            value: 0,
            script_pubkey: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }
}

/// A timestamped transaction, as carried by proof-of-stake chains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn coinbase(time: u32, script_sig: Vec<u8>) -> Self {
        Transaction {
            version: 1,
            time,
            inputs: vec![TxIn {
                prevout: OutPoint::null(),
                script_sig,
                sequence: u32::MAX,
            }],
            outputs: vec![TxOut::empty()],
            lock_time: 0,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.time.to_le_bytes());

        write_compact_size(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(input.prevout.hash.as_bytes());
            out.extend_from_slice(&input.prevout.index.to_le_bytes());
            write_var_bytes(&mut out, &input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(&mut out, &output.script_pubkey);
        }

        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn txid(&self) -> Hash256 {
        sha256d(&self.serialize())
    }
}

pub fn merkle_root(transactions: &[Transaction]) -> Hash256 {
    let mut layer: Vec<Hash256> = transactions.iter().map(Transaction::txid).collect();

    if layer.is_empty() {
        return Hash256::zero();
    }

    while layer.len() > 1 {
        let mut new_layer = Vec::with_capacity((layer.len() + 1) / 2);
        for pair in layer.chunks(2) {
            let left = pair[0];
            let right = pair.get(1).unwrap_or(&pair[0]);

            let mut concat = [0u8; 64];
            concat[..32].copy_from_slice(left.as_bytes());
            concat[32..].copy_from_slice(right.as_bytes());
            new_layer.push(sha256d(&concat));
        }
        layer = new_layer;
    }

    layer[0]
}

/// Script signature of the genesis coinbase: two numeric tokens followed by
/// the headline bytes.
pub fn genesis_coinbase_script(headline: &str, tokens: (i64, i64)) -> Vec<u8> {
    ScriptBuilder::new()
        .push_int(tokens.0)
        .push_num(tokens.1)
        .push_slice(headline.as_bytes())
        .into_bytes()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisBlock {
    pub version: i32,
    pub previous_hash: Hash256,
    pub merkle_root: Hash256,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub coinbase: Transaction,
}

impl GenesisBlock {
    /// Builds the genesis block around a single coinbase whose input script
    /// is `coinbase_script` and whose only output is empty.
    pub fn build(
        version: i32,
        timestamp: u32,
        bits: u32,
        nonce: u32,
        coinbase_script: Vec<u8>,
    ) -> Self {
        let coinbase = Transaction::coinbase(timestamp, coinbase_script);
        let merkle_root = merkle_root(std::slice::from_ref(&coinbase));
        debug!(
            "Built genesis block: time={} bits={:#010x} nonce={} merkle={}",
            timestamp, bits, nonce, merkle_root
        );

        GenesisBlock {
            version,
            previous_hash: Hash256::zero(),
            merkle_root,
            timestamp,
            bits,
            nonce,
            coinbase,
        }
    }

    /// Same block with different difficulty bits and nonce. The coinbase and
    /// therefore the merkle root are unchanged.
    pub fn with_pow(&self, bits: u32, nonce: u32) -> Self {
        GenesisBlock {
            bits,
            nonce,
            ..self.clone()
        }
    }

    pub fn header_bytes(&self) -> [u8; 80] {
        let mut header = [0u8; 80];
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(self.previous_hash.as_bytes());
        header[36..68].copy_from_slice(self.merkle_root.as_bytes());
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.header_bytes().to_vec();
        write_compact_size(&mut out, 1);
        out.extend_from_slice(&self.coinbase.serialize());
        out
    }

    pub fn hash(&self, hasher: &dyn HeaderHasher) -> Hash256 {
        hasher.hash_header(&self.header_bytes())
    }

    pub fn target(&self) -> Result<U256> {
        target_from_compact(self.bits)
            .with_context(|| format!("Genesis block carries invalid bits {:#010x}", self.bits))
    }
}

/// Whether a profile checks its genesis block against known constants.
///
/// `Enforce` pins the serialized header and merkle root, which this crate
/// computes itself, and the identity hash, which comes from the injected
/// [`HeaderHasher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenesisCheck {
    Enforce {
        header: &'static str,
        hash: &'static str,
        merkle_root: &'static str,
    },
    Skip,
}

impl GenesisCheck {
    pub fn is_enforced(&self) -> bool {
        matches!(self, GenesisCheck::Enforce { .. })
    }

    /// Compares the block's merkle root, header bytes and hash with the
    /// pinned values, in that order. `Skip` accepts any block.
    pub fn verify(&self, block: &GenesisBlock, hash: &Hash256) -> Result<()> {
        let (pinned_header, pinned_hash, pinned_merkle) = match self {
            GenesisCheck::Skip => {
                debug!("Genesis verification skipped for block {}", hash);
                return Ok(());
            }
            GenesisCheck::Enforce {
                header,
                hash,
                merkle_root,
            } => (*header, *hash, *merkle_root),
        };

        let expected_merkle = Hash256::try_from(pinned_merkle)
            .map_err(|e| anyhow!("Bad expected merkle root: {}", e))?;
        if block.merkle_root != expected_merkle {
            bail!(
                "Genesis merkle root mismatch. Expected: {}, Calculated: {}",
                expected_merkle,
                block.merkle_root
            );
        }

        let header = hex::encode(block.header_bytes());
        if header != pinned_header {
            bail!(
                "Genesis header mismatch. Expected: {}, Calculated: {}",
                pinned_header,
                header
            );
        }

        let expected_hash = Hash256::try_from(pinned_hash)
            .map_err(|e| anyhow!("Bad expected genesis hash: {}", e))?;
        if *hash != expected_hash {
            bail!(
                "Genesis hash mismatch. Expected: {}, Calculated: {}",
                expected_hash,
                hash
            );
        }

        info!("Genesis block {} verified", hash);
        Ok(())
    }
}

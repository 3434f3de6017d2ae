use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::{
    genesis::{
        genesis_coinbase_script, GenesisBlock, GenesisCheck, GENESIS_HEADLINE,
        GENESIS_SCRIPT_TOKENS, GENESIS_TIMESTAMP, GENESIS_VERSION,
    },
    hash::{Hash256, HeaderHasher},
    network::{Base58Prefixes, Base58Type, NetworkId},
    pow::proof_of_work_limit,
    seeds::{bootstrap, SeedAddress, SeedSpec, MAIN_FIXED_SEEDS, TESTNET_FIXED_SEEDS},
    ALERT_PUBLIC_KEY_HEX, U256,
};

/// Consensus serialization of the main genesis header.
pub const MAIN_GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000000d98c2f8767305d45ccca397bfb214bdfeaf7c0b9dbe51c6ab249c5c199243b3a8ed1e5affff001f850c0800";
pub const MAIN_GENESIS_HASH: &str =
    "d2e6738f0f0f436fd639462ffe49433802c793e439ea2af5fd6cc4f000fa19d5";
pub const MAIN_GENESIS_MERKLE_ROOT: &str =
    "b34392195c9c24abc651be9d0b7caffebd14b2bf97a3cc5cd4057376f8c2980d";
pub const MAIN_GENESIS_BITS: u32 = 0x1f00ffff;
pub const MAIN_GENESIS_NONCE: u32 = 527493;

/// The main network genesis block, before any hash check.
pub fn main_genesis() -> GenesisBlock {
    GenesisBlock::build(
        GENESIS_VERSION,
        GENESIS_TIMESTAMP,
        MAIN_GENESIS_BITS,
        MAIN_GENESIS_NONCE,
        genesis_coinbase_script(GENESIS_HEADLINE, GENESIS_SCRIPT_TOKENS),
    )
}

/// Genesis block of `network`, built the same way its profile builds it.
pub fn genesis_block(network: NetworkId) -> GenesisBlock {
    match network {
        NetworkId::Main => main_genesis(),
        NetworkId::Testnet => TestnetOverrides::default().genesis(&main_genesis()),
    }
}

/// Compiled-in seed table of `network`.
pub fn fixed_seed_table(network: NetworkId) -> &'static [SeedSpec] {
    match network {
        NetworkId::Main => &MAIN_FIXED_SEEDS,
        NetworkId::Testnet => TestnetOverrides::default().fixed_seeds,
    }
}

/// Where the testnet profile takes its stored genesis hash from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestnetGenesisHash {
    /// Keep the main network's genesis hash even though the header differs.
    #[default]
    InheritMain,
    /// Hash testnet's own header with the injected hasher.
    Recompute,
}

/// Every consensus and wire constant a node needs for one network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkProfile {
    pub network: NetworkId,
    pub message_start: [u8; 4],
    pub default_port: u16,
    pub rpc_port: u16,
    pub proof_of_work_limit: U256,
    pub alert_public_key: Vec<u8>,
    pub base58_prefixes: Base58Prefixes,
    pub fixed_seeds: Vec<SeedAddress>,
    pub genesis: GenesisBlock,
    pub genesis_hash: Hash256,
    pub genesis_check: GenesisCheck,
    pub pos_start_height: u64,
    pub data_dir_suffix: &'static str,
}

/// The fields testnet replaces on top of the main network profile.
#[derive(Debug, Clone)]
pub struct TestnetOverrides {
    pub message_start: [u8; 4],
    pub default_port: u16,
    pub rpc_port: u16,
    pub genesis_bits: u32,
    pub genesis_nonce: u32,
    pub genesis_check: GenesisCheck,
    pub genesis_hash: TestnetGenesisHash,
    pub fixed_seeds: &'static [SeedSpec],
    pub base58_prefixes: Base58Prefixes,
    pub pos_start_height: u64,
    pub data_dir_suffix: &'static str,
}

impl Default for TestnetOverrides {
    fn default() -> Self {
        TestnetOverrides {
            message_start: [0x9a, 0x4e, 0xb6, 0xd0],
            default_port: 21628,
            rpc_port: 21629,
            genesis_bits: 510649249,
            genesis_nonce: 94387,
            // The testnet genesis hash has never been pinned.
            genesis_check: GenesisCheck::Skip,
            genesis_hash: TestnetGenesisHash::InheritMain,
            fixed_seeds: &TESTNET_FIXED_SEEDS,
            base58_prefixes: Base58Prefixes {
                pubkey_address: [13],
                script_address: [26],
                secret_key: [52],
                ext_public_key: [0x05, 0x66, 0xd2, 0xc4],
                ext_secret_key: [0x05, 0x66, 0x9b, 0x3f],
            },
            pos_start_height: 150,
            data_dir_suffix: "testnet",
        }
    }
}

impl TestnetOverrides {
    /// The main genesis block with this record's bits and nonce.
    pub fn genesis(&self, main: &GenesisBlock) -> GenesisBlock {
        main.with_pow(self.genesis_bits, self.genesis_nonce)
    }
}

impl NetworkProfile {
    /// Builds and verifies the main network profile.
    ///
    /// `hasher` must be the chain's block identity hash. The header bytes
    /// and merkle root are checked independently of it, but the stored hash
    /// is whatever it returns, and [`DoubleSha256`](crate::hash::DoubleSha256)
    /// does not produce the published main hash.
    pub fn main(hasher: &dyn HeaderHasher) -> Result<Self> {
        let alert_public_key =
            hex::decode(ALERT_PUBLIC_KEY_HEX).context("Failed to decode alert public key")?;

        let genesis = main_genesis();
        let genesis_hash = genesis.hash(hasher);
        let genesis_check = GenesisCheck::Enforce {
            header: MAIN_GENESIS_HEADER,
            hash: MAIN_GENESIS_HASH,
            merkle_root: MAIN_GENESIS_MERKLE_ROOT,
        };
        genesis_check
            .verify(&genesis, &genesis_hash)
            .context("Main network genesis block does not match its published constants")?;

        let profile = NetworkProfile {
            network: NetworkId::Main,
            message_start: [0xb4, 0xa2, 0x83, 0xe7],
            default_port: 11628,
            rpc_port: 11629,
            proof_of_work_limit: proof_of_work_limit(),
            alert_public_key,
            base58_prefixes: Base58Prefixes {
                pubkey_address: [12],
                script_address: [24],
                secret_key: [48],
                ext_public_key: [0x04, 0x44, 0xa6, 0x9c],
                ext_secret_key: [0x04, 0x44, 0xd7, 0x3b],
            },
            fixed_seeds: bootstrap(fixed_seed_table(NetworkId::Main)),
            genesis,
            genesis_hash,
            genesis_check,
            pos_start_height: 1,
            data_dir_suffix: "",
        };
        info!("Built {} profile, genesis {}", profile.network, profile.genesis_hash);
        Ok(profile)
    }

    pub fn testnet(hasher: &dyn HeaderHasher) -> Result<Self> {
        let main = Self::main(hasher)?;
        main.into_testnet(TestnetOverrides::default(), hasher)
    }

    /// Applies testnet overrides to a main profile. Fields the overrides do
    /// not name (alert key, proof-of-work limit, genesis version, timestamp
    /// and coinbase) carry over unchanged. The genesis hash follows
    /// `overrides.genesis_hash`.
    pub fn into_testnet(
        self,
        overrides: TestnetOverrides,
        hasher: &dyn HeaderHasher,
    ) -> Result<Self> {
        let genesis = overrides.genesis(&self.genesis);
        let genesis_hash = match overrides.genesis_hash {
            TestnetGenesisHash::InheritMain => self.genesis_hash,
            TestnetGenesisHash::Recompute => genesis.hash(hasher),
        };
        overrides
            .genesis_check
            .verify(&genesis, &genesis_hash)
            .context("Testnet genesis block does not match its published constants")?;

        let profile = NetworkProfile {
            network: NetworkId::Testnet,
            message_start: overrides.message_start,
            default_port: overrides.default_port,
            rpc_port: overrides.rpc_port,
            base58_prefixes: overrides.base58_prefixes,
            fixed_seeds: bootstrap(overrides.fixed_seeds),
            genesis,
            genesis_hash,
            genesis_check: overrides.genesis_check,
            pos_start_height: overrides.pos_start_height,
            data_dir_suffix: overrides.data_dir_suffix,
            ..self
        };
        info!("Built {} profile, genesis {}", profile.network, profile.genesis_hash);
        Ok(profile)
    }

    pub fn build(network: NetworkId, hasher: &dyn HeaderHasher) -> Result<Self> {
        match network {
            NetworkId::Main => Self::main(hasher),
            NetworkId::Testnet => Self::testnet(hasher),
        }
    }

    pub fn base58_prefix(&self, kind: Base58Type) -> &[u8] {
        self.base58_prefixes.get(kind)
    }

    /// Data directory for this network under `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        if self.data_dir_suffix.is_empty() {
            root.to_path_buf()
        } else {
            root.join(self.data_dir_suffix)
        }
    }

    pub fn is_pos_active(&self, height: u64) -> bool {
        height >= self.pos_start_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::tests::{pinned_header_hasher, MAIN_HEADER_HEX, TESTNET_HEADER_HEX};
    use crate::hash::{sha256d, DoubleSha256};

    #[test]
    fn test_main_profile_constants() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        assert_eq!(main.network, NetworkId::Main);
        assert_eq!(main.message_start, [0xb4, 0xa2, 0x83, 0xe7]);
        assert_eq!(main.default_port, 11628);
        assert_eq!(main.rpc_port, 11629);
        assert_eq!(main.pos_start_height, 1);
        assert_eq!(main.genesis_hash.to_string(), MAIN_GENESIS_HASH);
        assert_eq!(main.genesis.merkle_root.to_string(), MAIN_GENESIS_MERKLE_ROOT);
        assert_eq!(main.alert_public_key.len(), 65);
        assert_eq!(main.alert_public_key[0], 0x04);
        assert_eq!(main.proof_of_work_limit, U256::MAX >> 16);
        assert_eq!(main.fixed_seeds.len(), MAIN_FIXED_SEEDS.len());
        assert!(main.genesis_check.is_enforced());
    }

    #[test]
    fn test_main_header_constant() {
        assert_eq!(MAIN_GENESIS_HEADER, MAIN_HEADER_HEX);
        assert_eq!(hex::encode(main_genesis().header_bytes()), MAIN_GENESIS_HEADER);
    }

    #[test]
    fn test_main_rejects_hasher_ignoring_header() {
        // Answers the published hash for every header, so only the pinned
        // header bytes can tell a wrong genesis apart.
        let constant = |_: &[u8; 80]| Hash256::try_from(MAIN_GENESIS_HASH).unwrap();
        let main = NetworkProfile::main(&constant).unwrap();
        assert_eq!(main.genesis_hash.to_string(), MAIN_GENESIS_HASH);

        let altered = main_genesis().with_pow(MAIN_GENESIS_BITS, MAIN_GENESIS_NONCE + 1);
        let err = main
            .genesis_check
            .verify(&altered, &altered.hash(&constant))
            .unwrap_err();
        assert!(err.to_string().contains("Genesis header mismatch"));
    }

    #[test]
    fn test_main_rejects_wrong_identity_hash() {
        // SHA-256d is not this chain's header hash, so the pinned constant
        // cannot match.
        let err = NetworkProfile::main(&DoubleSha256).unwrap_err();
        assert!(format!("{:#}", err).contains("Genesis hash mismatch"));
    }

    #[test]
    fn test_testnet_overrides_and_inherits() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let test = NetworkProfile::testnet(&pinned_header_hasher).unwrap();

        assert_eq!(test.network, NetworkId::Testnet);
        assert_eq!(test.message_start, [0x9a, 0x4e, 0xb6, 0xd0]);
        assert_eq!(test.default_port, 21628);
        assert_eq!(test.rpc_port, 21629);
        assert_eq!(test.pos_start_height, 150);
        assert_eq!(test.base58_prefix(Base58Type::PubkeyAddress), &[13]);
        assert_eq!(main.base58_prefix(Base58Type::PubkeyAddress), &[12]);
        assert_eq!(test.data_dir_suffix, "testnet");
        assert_eq!(test.fixed_seeds.len(), TESTNET_FIXED_SEEDS.len());

        assert_eq!(test.alert_public_key, main.alert_public_key);
        assert_eq!(test.proof_of_work_limit, main.proof_of_work_limit);
        assert_eq!(test.genesis.coinbase, main.genesis.coinbase);
        assert_eq!(test.genesis.merkle_root, main.genesis.merkle_root);
        assert_eq!(test.genesis.timestamp, main.genesis.timestamp);
        assert_eq!(test.genesis.bits, 510649249);
        assert_eq!(test.genesis.nonce, 94387);
    }

    #[test]
    fn test_testnet_genesis_is_not_verified() {
        let test = NetworkProfile::testnet(&pinned_header_hasher).unwrap();
        assert_eq!(test.genesis_check, GenesisCheck::Skip);
        assert_eq!(hex::encode(test.genesis.header_bytes()), TESTNET_HEADER_HEX);
    }

    #[test]
    fn test_testnet_inherits_main_genesis_hash() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let test = NetworkProfile::testnet(&pinned_header_hasher).unwrap();
        assert_eq!(TestnetOverrides::default().genesis_hash, TestnetGenesisHash::InheritMain);
        assert_eq!(test.genesis_hash, main.genesis_hash);
        assert_eq!(test.genesis_hash.to_string(), MAIN_GENESIS_HASH);
        assert_ne!(test.genesis.header_bytes(), main.genesis.header_bytes());
    }

    #[test]
    fn test_testnet_hash_can_be_recomputed() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let overrides = TestnetOverrides {
            genesis_hash: TestnetGenesisHash::Recompute,
            ..TestnetOverrides::default()
        };
        let test = main.into_testnet(overrides, &pinned_header_hasher).unwrap();
        assert_eq!(test.genesis_hash, sha256d(&test.genesis.header_bytes()));
        assert_ne!(test.genesis_hash.to_string(), MAIN_GENESIS_HASH);
    }

    #[test]
    fn test_testnet_check_can_be_enforced() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let overrides = TestnetOverrides {
            genesis_check: GenesisCheck::Enforce {
                header: MAIN_GENESIS_HEADER,
                hash: MAIN_GENESIS_HASH,
                merkle_root: MAIN_GENESIS_MERKLE_ROOT,
            },
            ..TestnetOverrides::default()
        };
        let err = main.into_testnet(overrides, &pinned_header_hasher).unwrap_err();
        assert!(format!("{:#}", err).contains("Genesis header mismatch"));
    }

    #[test]
    fn test_prefix_sets_are_disjoint() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let test = NetworkProfile::testnet(&pinned_header_hasher).unwrap();
        assert!(main.base58_prefixes.is_internally_unique());
        assert!(test.base58_prefixes.is_internally_unique());
        assert!(main.base58_prefixes.is_disjoint_from(&test.base58_prefixes));
        for kind in Base58Type::ALL {
            assert_eq!(main.base58_prefix(kind).len(), kind.prefix_len());
            assert_eq!(test.base58_prefix(kind).len(), kind.prefix_len());
        }
    }

    #[test]
    fn test_data_dir_and_pos_activation() {
        let main = NetworkProfile::main(&pinned_header_hasher).unwrap();
        let test = NetworkProfile::testnet(&pinned_header_hasher).unwrap();
        let root = Path::new("/var/lib/ember");
        assert_eq!(main.data_dir(root), PathBuf::from("/var/lib/ember"));
        assert_eq!(test.data_dir(root), PathBuf::from("/var/lib/ember/testnet"));

        assert!(!main.is_pos_active(0));
        assert!(main.is_pos_active(1));
        assert!(!test.is_pos_active(149));
        assert!(test.is_pos_active(150));
    }

    #[test]
    fn test_build_dispatches_on_network() {
        for id in NetworkId::ALL {
            let profile = NetworkProfile::build(id, &pinned_header_hasher).unwrap();
            assert_eq!(profile.network, id);
            assert_eq!(profile.genesis, genesis_block(id));
            assert_eq!(profile.fixed_seeds.len(), fixed_seed_table(id).len());
        }
    }
}

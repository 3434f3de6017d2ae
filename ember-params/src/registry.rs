//! Process-wide network selection.
//!
//! Both profiles are built once at startup. The active network is written at
//! most once, before the node starts reading it, and is then shared without
//! locking. Code that prefers explicit wiring can hold a [`ProfileRegistry`]
//! value directly; everything else goes through [`params`].

use anyhow::{Context, Result};
use log::info;
use std::sync::OnceLock;

use crate::{
    hash::HeaderHasher,
    network::NetworkId,
    profile::{NetworkProfile, TestnetOverrides},
};

pub struct ProfileRegistry {
    main: NetworkProfile,
    testnet: NetworkProfile,
    active: OnceLock<NetworkId>,
}

impl ProfileRegistry {
    /// Builds both profiles. `hasher` must be the chain's block identity
    /// hash: main's genesis is checked against its published hash, so
    /// [`DoubleSha256`](crate::hash::DoubleSha256) fails here.
    pub fn new(hasher: &dyn HeaderHasher) -> Result<Self> {
        let main = NetworkProfile::main(hasher).context("Failed to build main network profile")?;
        let testnet = main
            .clone()
            .into_testnet(TestnetOverrides::default(), hasher)
            .context("Failed to build testnet profile")?;

        Ok(ProfileRegistry {
            main,
            testnet,
            active: OnceLock::new(),
        })
    }

    pub fn profile(&self, network: NetworkId) -> &NetworkProfile {
        match network {
            NetworkId::Main => &self.main,
            NetworkId::Testnet => &self.testnet,
        }
    }

    /// Pins `network` as the active profile.
    ///
    /// Selecting the already active network again is a no-op. Switching to a
    /// different network once one is pinned panics.
    pub fn select_network(&self, network: NetworkId) -> &NetworkProfile {
        let active = *self.active.get_or_init(|| {
            info!("Selected {} network", network);
            network
        });
        if active != network {
            panic!(
                "Cannot select {} network: {} is already active for this process",
                network, active
            );
        }
        self.profile(active)
    }

    /// Selects a network from its raw identifier. Identifiers outside the
    /// compiled-in set are fatal.
    pub fn select_network_raw(&self, raw: u8) -> &NetworkProfile {
        match NetworkId::try_from(raw) {
            Ok(network) => self.select_network(network),
            Err(e) => panic!("Unimplemented network: {}", e),
        }
    }

    pub fn select_from_startup_flag(&self, testnet_requested: bool) -> &NetworkProfile {
        if testnet_requested {
            self.select_network(NetworkId::Testnet)
        } else {
            self.select_network(NetworkId::Main)
        }
    }

    /// The selected profile, or main while nothing is selected. Reading
    /// never pins a network.
    pub fn active_profile(&self) -> &NetworkProfile {
        self.profile(self.active.get().copied().unwrap_or(NetworkId::Main))
    }

    pub fn active_network(&self) -> Option<NetworkId> {
        self.active.get().copied()
    }
}

static REGISTRY: OnceLock<ProfileRegistry> = OnceLock::new();

/// Installs the process-wide registry. Panics if one is already installed.
pub fn install(registry: ProfileRegistry) -> &'static ProfileRegistry {
    if REGISTRY.set(registry).is_err() {
        panic!("Network profile registry installed twice");
    }
    registry_ref()
}

/// Builds both profiles with `hasher` and installs them. A genesis block that
/// fails its check aborts startup, which is what happens when `hasher` is not
/// the chain's block identity hash.
pub fn init(hasher: &dyn HeaderHasher) -> &'static ProfileRegistry {
    match ProfileRegistry::new(hasher) {
        Ok(registry) => install(registry),
        Err(e) => panic!("Invalid network parameters: {:#}", e),
    }
}

pub fn is_installed() -> bool {
    REGISTRY.get().is_some()
}

fn registry_ref() -> &'static ProfileRegistry {
    match REGISTRY.get() {
        Some(registry) => registry,
        None => panic!("Network profile registry used before init"),
    }
}

/// The active network profile.
pub fn params() -> &'static NetworkProfile {
    registry_ref().active_profile()
}

pub fn select_params(network: NetworkId) -> &'static NetworkProfile {
    registry_ref().select_network(network)
}

pub fn select_params_from_flag(testnet_requested: bool) -> &'static NetworkProfile {
    registry_ref().select_from_startup_flag(testnet_requested)
}

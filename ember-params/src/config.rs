use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::network::NetworkId;

/// Network selection flags, meant to be `#[command(flatten)]`ed into a
/// binary's own CLI.
#[derive(Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Use the test network
    #[arg(long)]
    pub testnet: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    #[serde(default = "default_testnet")]
    pub testnet: bool,
}

fn default_testnet() -> bool {
    false
}

impl Default for StartupConfig {
    fn default() -> Self {
        StartupConfig {
            testnet: default_testnet(),
        }
    }
}

impl StartupConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse startup configuration")
    }

    /// Reads the config file, falling back to defaults when it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(StartupConfig::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// A `--testnet` on the command line wins over the file.
    pub fn merge_args(mut self, args: &NetworkArgs) -> Self {
        if args.testnet {
            self.testnet = true;
        }
        self
    }

    pub fn network(&self) -> NetworkId {
        if self.testnet {
            NetworkId::Testnet
        } else {
            NetworkId::Main
        }
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ember_params::{
    config::{NetworkArgs, StartupConfig},
    pow::proof_of_work_limit,
    profile::{fixed_seed_table, genesis_block},
    seeds::bootstrap,
};
use log::info;

/// Prints the genesis block and fixed seeds of an Ember network.
///
/// The header bytes are printed raw so the identity hash can be computed
/// with the consensus hasher and compared to the published constant.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    network: NetworkArgs,

    /// Optional startup configuration file.
    #[arg(short, long, default_value = "ember.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = StartupConfig::load(&cli.config)?.merge_args(&cli.network);
    let network = config.network();
    info!("Describing {} network", network);

    // The identity hash needs the consensus hasher, so this tool stops short
    // of a full profile and prints the bytes that hash covers.
    let genesis = genesis_block(network);
    let seeds = bootstrap(fixed_seed_table(network));

    println!("network:      {}", network);
    println!("header:       {}", hex::encode(genesis.header_bytes()));
    println!("merkle root:  {}", genesis.merkle_root);
    println!("coinbase:     {}", hex::encode(genesis.coinbase.serialize()));
    println!("bits:         {:#010x}", genesis.bits);
    println!("target:       {:#x}", genesis.target()?);
    println!("pow limit:    {:#x}", proof_of_work_limit());
    for seed in seeds {
        println!(
            "seed:         {} (last seen {})",
            seed.socket_addr(),
            seed.last_seen
        );
    }

    Ok(())
}

pub mod config;
pub mod encode;
pub mod genesis;
pub mod hash;
pub mod network;
pub mod pow;
pub mod profile;
pub mod registry;
pub mod seeds;

use uint::construct_uint;

construct_uint! {
   pub struct U256(4);
}

pub use network::{Base58Prefixes, Base58Type, NetworkId};
pub use profile::NetworkProfile;
pub use registry::{params, select_params, select_params_from_flag, ProfileRegistry};

pub const ONE_WEEK_SECS: i64 = 7 * 24 * 60 * 60;

// Hex-encoded uncompressed secp256k1 key used to verify network alerts.
pub const ALERT_PUBLIC_KEY_HEX: &str = "04a2f222989769417eb053cd9f16a9a2894ad5eb9fd13c016ed91528241bcf3bd55023679be17f0bd3a16e6fbebbbd551be1a4bd2d10cdb679228c91e26e26900e";

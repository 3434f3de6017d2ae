use crate::U256;
use anyhow::{bail, Result};

/// Highest target any block may claim: `~uint256(0) >> 16`.
pub fn proof_of_work_limit() -> U256 {
    U256::MAX >> 16
}

/// Expands compact difficulty bits into a full 256-bit target.
///
/// Negative and overflowing encodings are rejected; the genesis constants
/// never produce either.
pub fn target_from_compact(bits: u32) -> Result<U256> {
    let exponent = bits >> 24;
    let mantissa = bits & 0x007f_ffff;

    if mantissa != 0 && bits & 0x0080_0000 != 0 {
        bail!("Compact bits {:#010x} encode a negative target", bits);
    }

    if mantissa == 0 {
        return Ok(U256::zero());
    }

    if exponent <= 3 {
        return Ok(U256::from(mantissa >> (8 * (3 - exponent))));
    }

    if exponent > 34 || (mantissa > 0xff && exponent > 33) || (mantissa > 0xffff && exponent > 32) {
        bail!("Compact bits {:#010x} overflow a 256-bit target", bits);
    }

    let shift = 8 * (exponent - 3) as usize;
    Ok(U256::from(mantissa) << shift)
}

//! Random salts for hiding votes.

use rand::rngs::OsRng;
use rand::RngCore;

/// Draw a 128-bit salt from the operating system's CSPRNG.
pub fn generate_salt() -> u128 {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    u128::from_be_bytes(bytes)
}

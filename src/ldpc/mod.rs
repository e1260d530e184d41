//! LDPC (Low-Density Parity Check) Error Correction for FT8 and FT4
//!
//! Both protocols use the same LDPC(174,91) code.
//!
//! **Encoding**: a 91-bit message (77 payload bits + 14 CRC bits) is extended with
//! 83 parity bits computed from the generator matrix in GF(2).
//!
//! **Decoding**: belief propagation (sum-product) over the Tanner graph turns 174
//! soft bits back into the most likely 91-bit message.

mod constants;
mod decode;
mod encode;

pub use constants::{K, M, N};
pub use decode::{decode, parity_check, BpResult};
pub use encode::encode;

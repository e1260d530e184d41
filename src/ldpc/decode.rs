//! LDPC(174,91) belief propagation decoder (sum-product)

use bitvec::prelude::*;
use tracing::trace;

use super::constants::{BITS_OF_CHECK, CHECKS_OF_BIT, COLUMN_WEIGHT, K, M, MAX_ROW_WEIGHT, N};

/// Outcome of a belief propagation run
#[derive(Debug, Clone, PartialEq)]
pub struct BpResult {
    /// Best hard decision for the 91 message bits (payload + CRC)
    pub plain: BitVec<u8, Msb0>,
    /// Unsatisfied parity checks of that hard decision (0 on success)
    pub errors: usize,
    /// Iterations run before the checks passed or the limit was reached
    pub iterations: usize,
}

impl BpResult {
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }
}

/// Piecewise linear atanh from WSJT-X (`platanh.f90`), saturating at ±7
#[inline]
fn platanh(x: f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs();

    if z <= 0.664 {
        x / 0.83
    } else if z <= 0.9217 {
        sign * (z - 0.4064) / 0.322
    } else if z <= 0.9951 {
        sign * (z - 0.8378) / 0.0524
    } else if z <= 0.9998 {
        sign * (z - 0.9914) / 0.0012
    } else {
        sign * 7.0
    }
}

/// Count parity checks a 174-bit hard decision fails
pub fn parity_check(codeword: &BitSlice<u8, Msb0>) -> usize {
    BITS_OF_CHECK
        .iter()
        .filter(|row| row.iter().filter(|&bit| codeword[bit]).count() % 2 == 1)
        .count()
}

/// Decode 174 soft bits with the sum-product algorithm
///
/// # Arguments
/// * `llr` - log-likelihood ratio per codeword bit; positive means the bit is more
///   likely 0, negative more likely 1
/// * `max_iterations` - BP iteration limit
///
/// # Returns
/// The hard decision with the fewest failed checks seen during the run. A clean input
/// passes before the first message exchange and reports 0 iterations.
///
/// Inputs shorter than 174 values are treated as erasures for the missing bits.
pub fn decode(llr: &[f32], max_iterations: usize) -> BpResult {
    let channel = |i: usize| llr.get(i).copied().unwrap_or(0.0);

    // bit -> check messages, indexed by the check's row slot
    let mut toc = [[0.0f32; MAX_ROW_WEIGHT]; M];
    // check -> bit messages, indexed by the bit's column slot
    let mut tov = [[0.0f32; COLUMN_WEIGHT]; N];
    let mut zn = [0.0f32; N];
    let mut hard: BitArr!(for N, in u8, Msb0) = BitArray::ZERO;

    let mut best = BpResult {
        plain: BitVec::repeat(false, K),
        errors: M + 1,
        iterations: 0,
    };

    for iter in 0..=max_iterations {
        for i in 0..N {
            zn[i] = channel(i) + tov[i].iter().sum::<f32>();
            hard.set(i, zn[i] < 0.0);
        }

        let errors = parity_check(&hard[..N]);
        if errors < best.errors {
            best.plain = hard[..K].to_bitvec();
            best.errors = errors;
        }
        best.iterations = iter;

        if errors == 0 {
            trace!(iterations = iter, "bp converged");
            return best;
        }
        if iter == max_iterations {
            break;
        }

        // bit -> check: everything the bit knows except what this check told it
        for (check, row) in BITS_OF_CHECK.iter().enumerate() {
            for (slot, bit) in row.iter().enumerate() {
                let from_check = CHECKS_OF_BIT[bit]
                    .iter()
                    .position(|&c| c == check)
                    .map(|col| tov[bit][col])
                    .unwrap_or(0.0);
                toc[check][slot] = zn[bit] - from_check;
            }
        }

        // check -> bit: product of the other bits' beliefs
        for (bit, checks) in CHECKS_OF_BIT.iter().enumerate() {
            for (col, &check) in checks.iter().enumerate() {
                let row = &BITS_OF_CHECK[check];
                let product: f32 = row
                    .iter()
                    .enumerate()
                    .filter(|&(_, other)| other != bit)
                    .map(|(slot, _)| (toc[check][slot] / 2.0).tanh())
                    .product();
                tov[bit][col] = 2.0 * platanh(product);
            }
        }
    }

    trace!(errors = best.errors, "bp gave up");
    best
}

//! Likelihood scratch buffers — pre-sized matrices reused across evaluations.
//!
//! Purpose
//! -------
//! The profile likelihood is evaluated thousands of times per estimation
//! (every annealing step and every L-BFGS cost call). Each evaluation only
//! needs `β` (`p × r`), one `p × r` temporary, and the two `r × r` quadratic
//! forms `βᵗ·S11m·β` and `βᵗ·S11·β`. [`BetaScratch`] owns exactly those
//! buffers so the hot path allocates only the `vec(β)` intermediate.
//!
//! Key behaviors
//! -------------
//! - Buffers are sized once from `(p, r)` and never resized.
//! - Interior mutability (`RefCell`) lets a `&self` likelihood reuse them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Single-threaded use: a second live `borrow_mut` on the same buffer is
//!   a programming error and panics, as with any `RefCell`.
//! - Contents are meaningless between calls; every user overwrites before
//!   reading.
use std::cell::RefCell;

use ndarray::Array2;

#[derive(Debug, Clone, PartialEq)]
pub struct BetaScratch {
    pub beta: RefCell<Array2<f64>>,
    pub tmp: RefCell<Array2<f64>>,
    /// `βᵗ·S11m·β`
    pub m1: RefCell<Array2<f64>>,
    /// `βᵗ·S11·β`
    pub m2: RefCell<Array2<f64>>,
}

impl BetaScratch {
    pub fn new(p: usize, r: usize) -> BetaScratch {
        BetaScratch {
            beta: RefCell::new(Array2::zeros((p, r))),
            tmp: RefCell::new(Array2::zeros((p, r))),
            m1: RefCell::new(Array2::zeros((r, r))),
            m2: RefCell::new(Array2::zeros((r, r))),
        }
    }

    /// `(p, r)` the buffers were sized for.
    pub fn dims(&self) -> (usize, usize) {
        self.beta.borrow().dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sizes_every_buffer() {
        let ws = BetaScratch::new(4, 2);

        assert_eq!(ws.dims(), (4, 2));
        assert_eq!(ws.tmp.borrow().dim(), (4, 2));
        assert_eq!(ws.m1.borrow().dim(), (2, 2));
        assert_eq!(ws.m2.borrow().dim(), (2, 2));
    }
}

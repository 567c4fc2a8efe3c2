//! Identification of restricted cointegrating vectors.
//!
//! Purpose
//! -------
//! Certify, before any optimization, that the restrictions pin down a locally
//! unique beta, using Johansen's rank conditions for linear restrictions and a
//! numerical Jacobian-rank probe where those conditions cannot be formed.
//!
//! Key behaviors
//! -------------
//! - For each vector `i`, build the augmented basis `H̃ᵢ = [Hᵢ sᵢ]` (just `sᵢ`
//!   when pinned, just `Hᵢ` when the restrictions are homogeneous) and its
//!   complement `R̃ᵢ`, so that `R̃ᵢ·βᵢ = 0` encodes the restrictions
//!   homogeneously.
//! - For every `k = 1..r−1` and every set `{j₁..j_k}` of other vectors,
//!   require `rank(R̃ᵢ·[H̃_{j₁} … H̃_{j_k}]) ≥ k`. The product is exactly zero
//!   when the condition fails, so its rank is taken with a floor scaled to
//!   `‖R̃ᵢ‖_F·‖H̃‖_F` that discards rounding residue.
//! - If some `H̃ᵢ` already spans `ℝᵖ` (so `R̃ᵢ` is empty), switch to
//!   [`jacobian_probe`]: at a seeded random point, the Jacobian of
//!   `vec(βαᵗ)` with respect to `(φ, alpha parameters)` must have full column
//!   rank.
//!
//! Invariants & assumptions
//! ------------------------
//! - The probe is a numerical certificate at one point, not an algebraic
//!   proof; it is reported as [`IdentificationMethod::JacobianProbe`] and
//!   logged at `warn` level.
//! - Failures abort with [`VecmError::NotIdentified`] naming the failing
//!   vectors.
use ndarray::{Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};
use tracing::warn;

use crate::{
    linalg::{RANK_TOL, frobenius_norm, hconcat, kron, random_normal, rank, rank_with_tol},
    vecm::{
        core::restrictions::{AlphaBasis, RestrictionDesign},
        errors::{VecmError, VecmResult},
    },
};

/// How identification was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentificationMethod {
    /// Johansen's rank conditions hold for every vector and combination.
    RankConditions,
    /// Full-rank Jacobian at one random point of the restricted space.
    JacobianProbe { rank: usize, required: usize },
}

/// Check that `design` identifies beta.
///
/// `neqs` is the number of equations `n`; `alpha` carries any loading
/// restrictions; `seed` drives the probe's random point.
///
/// # Errors
/// [`VecmError::NotIdentified`] when a rank condition or the probe fails;
/// linear-algebra failures are propagated.
pub fn check_identification(
    design: &RestrictionDesign, neqs: usize, alpha: Option<&AlphaBasis>, seed: u64,
) -> VecmResult<IdentificationMethod> {
    let augmented: Vec<Array2<f64>> =
        design.blocks.iter().map(|b| b.augmented()).collect::<VecmResult<_>>()?;

    if augmented.iter().any(|a| rank(a.view()) >= design.p) {
        let (got, required) = jacobian_probe(design, neqs, alpha, seed)?;
        if got < required {
            return Err(VecmError::NotIdentified {
                detail: format!(
                    "Jacobian of vec(beta alpha') has rank {got} < {required} at a random point"
                ),
            });
        }
        warn!(
            rank = got,
            required,
            seed,
            "identification certified numerically by a Jacobian rank probe at one random point"
        );
        return Ok(IdentificationMethod::JacobianProbe { rank: got, required });
    }

    let complements: Vec<Array2<f64>> = design
        .blocks
        .iter()
        .map(|b| b.complement().map(|c| c.t().to_owned()))
        .collect::<VecmResult<_>>()?;

    for (i, r_tilde) in complements.iter().enumerate() {
        let others: Vec<usize> = (0..design.r).filter(|&j| j != i).collect();
        for k in 1..design.r {
            let mut chosen = Vec::with_capacity(k);
            check_combinations(&others, k, 0, &mut chosen, &mut |set: &[usize]| {
                let views: Vec<ArrayView2<f64>> = set.iter().map(|&j| augmented[j].view()).collect();
                let stacked = hconcat(&views)?;
                let product = r_tilde.dot(&stacked);
                let (m, n) = product.dim();
                let floor = RANK_TOL
                    * (m.max(n) as f64)
                    * frobenius_norm(r_tilde.view())
                    * frobenius_norm(stacked.view());
                let got = rank_with_tol(product.view(), floor);
                if got < k {
                    return Err(VecmError::NotIdentified {
                        detail: format!(
                            "restrictions on vector {i} against vectors {set:?} have rank \
                             {got} < {k}"
                        ),
                    });
                }
                Ok(())
            })?;
        }
    }
    Ok(IdentificationMethod::RankConditions)
}

/// Visit every `k`-subset of `pool[start..]` extending `chosen`.
fn check_combinations<F>(
    pool: &[usize], k: usize, start: usize, chosen: &mut Vec<usize>, visit: &mut F,
) -> VecmResult<()>
where
    F: FnMut(&[usize]) -> VecmResult<()>,
{
    if chosen.len() == k {
        return visit(chosen);
    }
    for idx in start..pool.len() {
        chosen.push(pool[idx]);
        check_combinations(pool, k, idx + 1, chosen, visit)?;
        chosen.pop();
    }
    Ok(())
}

/// Rank of `∂vec(βαᵗ)/∂(φ, ψ)` at a seeded random point, and the rank needed
/// for local identification.
///
/// `vec(βαᵗ) = (α ⊗ I_p)·vec(β) = (I_n ⊗ β)·vec(αᵗ)`, with `vec(β) = Hφ + s`
/// and `vec(αᵗ) = G·vec(ψᵗ)`: `G = I_{nr}` for free loadings and
/// `G = A ⊗ I_r` when `α = A·ψ`.
///
/// A homogeneous vector keeps one direction of indeterminacy (`βᵢc`,
/// `αᵢ/c`) that its reported normalization removes, so each such vector
/// lowers the required rank by one.
pub fn jacobian_probe(
    design: &RestrictionDesign, neqs: usize, alpha: Option<&AlphaBasis>, seed: u64,
) -> VecmResult<(usize, usize)> {
    let (p, r) = (design.p, design.r);
    let mut rng = StdRng::seed_from_u64(seed);
    let phi = random_normal(&mut rng, design.n_free(), 1);
    let beta = design.beta(phi.column(0));
    let eye_r = Array2::<f64>::eye(r);
    let (alpha_mat, g) = match alpha {
        None => (random_normal(&mut rng, neqs, r), Array2::<f64>::eye(neqs * r)),
        Some(basis) => {
            let psi = random_normal(&mut rng, basis.a.ncols(), r);
            (basis.a.dot(&psi), kron(basis.a.view(), eye_r.view()))
        }
    };

    let j_beta = kron(alpha_mat.view(), Array2::<f64>::eye(p).view()).dot(&design.h);
    let j_alpha = kron(Array2::<f64>::eye(neqs).view(), beta.view()).dot(&g);
    let jac = hconcat(&[j_beta.view(), j_alpha.view()])?;
    let scale_free = design.blocks.iter().filter(|b| b.is_homogeneous()).count();
    Ok((rank(jac.view()), design.n_free() + g.ncols() - scale_free))
}

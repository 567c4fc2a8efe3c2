//! Linear restrictions on cointegrating vectors and their affine translation.
//!
//! Purpose
//! -------
//! Turn a global restriction system `R·vec(β) = q` into the free
//! parametrization `vec(β) = H·φ + s` used by the likelihood and optimizer,
//! one cointegrating vector (block) at a time.
//!
//! Key behaviors
//! -------------
//! - [`split_blocks`] assigns each row of `R` to the vector whose `p`-column
//!   window holds its nonzero coefficients; rows of one block must be
//!   contiguous.
//! - [`translate_block`] maps `(R_i, q_i)` to `(H_i, s_i)`:
//!   - `rank(R_i) = p`: the vector is pinned; `s_i` solves `R_i·s_i = q_i`
//!     and `H_i` is `None`;
//!   - otherwise `H_i` spans the right nullspace of `R_i` and
//!     `s_i = R_iᵗ(R_iR_iᵗ)⁻¹q_i` is the minimum-norm particular solution.
//! - [`RestrictionDesign`] stacks the blocks into block-diagonal `H` and `s`.
//! - [`AlphaRestriction`] carries homogeneous restrictions `R_a·αⱼ = 0` on
//!   every column of the loading matrix; [`AlphaBasis`] splits `ℝⁿ` into the
//!   admissible span `A` and its complement `A⊥ = R_aᵗ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `R_i·(H_i·φ + s_i) = q_i` for every `φ`.
//! - Every vector carries at least one restriction.
//! - A vector whose restrictions are all homogeneous (`q_i = 0`) is
//!   determined only up to scale. It is estimated in that form and pinned
//!   afterwards by [`RestrictionDesign::normalize_homogeneous`], which fixes
//!   its largest-magnitude entry to one.
//!
//! Conventions
//! -----------
//! - `vec(β)` stacks columns, so vector `i` occupies rows `i·p..(i+1)·p`.
//! - Block and row numbers in errors are 0-based.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis, s};

use crate::{
    linalg::{
        LinalgError, hconcat, lstsq, orth_complement, rank, right_nullspace, solve, spd_solve,
        unvec_into, vec_cols,
    },
    vecm::errors::{VecmError, VecmResult},
};

/// Absolute tolerance for treating a coefficient as zero when scanning rows.
const ZERO_TOL: f64 = 1e-12;

/// Residual tolerance for over-determined pinned blocks.
const CONSISTENCY_TOL: f64 = 1e-8;

/// Global restriction system `R·vec(β) = q` on a `p × r` beta.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionSet {
    pub r: Array2<f64>,
    pub q: Array1<f64>,
    pub rank: usize,
    pub alpha: Option<AlphaRestriction>,
}

impl RestrictionSet {
    /// Build a restriction set for cointegrating rank `rank`.
    ///
    /// # Errors
    /// - [`VecmError::InvalidRank`] if `rank == 0`.
    /// - [`VecmError::DimensionMismatch`] if `R` has no rows, its column count
    ///   is not a multiple of `rank`, or `q` does not match its rows.
    /// - [`VecmError::MalformedRestriction`] for non-finite entries.
    pub fn new(r: Array2<f64>, q: Array1<f64>, rank: usize) -> VecmResult<Self> {
        if rank == 0 {
            return Err(VecmError::InvalidRank { rank, reason: "Rank must be positive." });
        }
        let (m, cols) = r.dim();
        if m == 0 || cols == 0 || cols % rank != 0 {
            return Err(VecmError::DimensionMismatch {
                what: "R",
                expected: (m.max(1), rank * (cols / rank).max(1)),
                found: (m, cols),
            });
        }
        if q.len() != m {
            return Err(VecmError::DimensionMismatch {
                what: "q",
                expected: (m, 1),
                found: (q.len(), 1),
            });
        }
        for (row, line) in r.axis_iter(Axis(0)).enumerate() {
            if line.iter().any(|v| !v.is_finite()) || !q[row].is_finite() {
                return Err(VecmError::MalformedRestriction {
                    row,
                    reason: "Restriction coefficients must be finite.",
                });
            }
        }
        Ok(Self { r, q, rank, alpha: None })
    }

    /// Apply the same restriction `R_c·βᵢ = q_c` to every cointegrating
    /// vector: `R = I_r ⊗ R_c`, `q = 1_r ⊗ q_c`.
    ///
    /// # Errors
    /// As [`RestrictionSet::new`].
    pub fn common(r_c: Array2<f64>, q_c: Array1<f64>, rank: usize) -> VecmResult<Self> {
        let (m, p) = r_c.dim();
        if q_c.len() != m {
            return Err(VecmError::DimensionMismatch {
                what: "q",
                expected: (m, 1),
                found: (q_c.len(), 1),
            });
        }
        let mut r = Array2::zeros((m * rank, p * rank));
        let mut q = Array1::zeros(m * rank);
        for i in 0..rank {
            r.slice_mut(s![i * m..(i + 1) * m, i * p..(i + 1) * p]).assign(&r_c);
            q.slice_mut(s![i * m..(i + 1) * m]).assign(&q_c);
        }
        Self::new(r, q, rank)
    }

    pub fn with_alpha(mut self, alpha: AlphaRestriction) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Rows of beta implied by the column count.
    pub fn nvars(&self) -> usize {
        self.r.ncols() / self.rank
    }
}

/// Homogeneous restrictions `R_a·αⱼ = 0` applied to every column of alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaRestriction {
    pub r_a: Array2<f64>,
}

impl AlphaRestriction {
    /// # Errors
    /// [`VecmError::MalformedRestriction`] for non-finite entries, linearly
    /// dependent rows, or as many rows as columns (no admissible alpha).
    pub fn new(r_a: Array2<f64>) -> VecmResult<Self> {
        let (m, n) = r_a.dim();
        if let Some(pos) = r_a.iter().position(|v| !v.is_finite()) {
            return Err(VecmError::MalformedRestriction {
                row: pos / n.max(1),
                reason: "Alpha restriction coefficients must be finite.",
            });
        }
        if m == 0 || m >= n {
            return Err(VecmError::MalformedRestriction {
                row: m,
                reason: "Alpha restrictions need between 1 and n - 1 rows.",
            });
        }
        if rank(r_a.view()) < m {
            return Err(VecmError::MalformedRestriction {
                row: m - 1,
                reason: "Alpha restriction rows are linearly dependent.",
            });
        }
        Ok(Self { r_a })
    }
}

/// Decomposition of `ℝⁿ` induced by an [`AlphaRestriction`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaBasis {
    /// `n × (n − m_a)` orthonormal basis of admissible loadings.
    pub a: Array2<f64>,
    /// `n × m_a`, equal to `R_aᵗ`.
    pub a_perp: Array2<f64>,
}

impl AlphaBasis {
    pub fn new(restriction: &AlphaRestriction) -> VecmResult<Self> {
        let a = right_nullspace(restriction.r_a.view())?;
        Ok(Self { a, a_perp: restriction.r_a.t().to_owned() })
    }

    pub fn restricted_rows(&self) -> usize {
        self.a_perp.ncols()
    }
}

/// Rows of the global system that restrict one cointegrating vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionBlock {
    pub index: usize,
    pub r: Array2<f64>,
    pub q: Array1<f64>,
}

/// Assign restriction rows to cointegrating vectors.
///
/// # Errors
/// - [`VecmError::MalformedRestriction`] for an all-zero row, a row touching
///   two vectors, or a block whose rows are not contiguous.
/// - [`VecmError::NotIdentified`] for a vector with no restrictions.
pub fn split_blocks(set: &RestrictionSet) -> VecmResult<Vec<RestrictionBlock>> {
    let p = set.nvars();
    let mut owner = Vec::with_capacity(set.r.nrows());
    for (row, line) in set.r.axis_iter(Axis(0)).enumerate() {
        let mut window = None;
        for (col, v) in line.iter().enumerate() {
            if v.abs() <= ZERO_TOL {
                continue;
            }
            match window {
                None => window = Some(col / p),
                Some(w) if w != col / p => {
                    return Err(VecmError::MalformedRestriction {
                        row,
                        reason: "A restriction row may only involve one cointegrating vector.",
                    });
                }
                Some(_) => {}
            }
        }
        let w = window.ok_or(VecmError::MalformedRestriction {
            row,
            reason: "Restriction row has no nonzero coefficient.",
        })?;
        if let Some(&prev) = owner.last() {
            if prev != w && owner.contains(&w) {
                return Err(VecmError::MalformedRestriction {
                    row,
                    reason: "Restrictions on one cointegrating vector must be contiguous rows.",
                });
            }
        }
        owner.push(w);
    }

    (0..set.rank)
        .map(|index| {
            let rows: Vec<usize> = (0..owner.len()).filter(|&k| owner[k] == index).collect();
            if rows.is_empty() {
                return Err(VecmError::NotIdentified {
                    detail: format!("cointegrating vector {index} has no restrictions"),
                });
            }
            let r = set.r.select(Axis(0), &rows);
            let r = r.slice(s![.., index * p..(index + 1) * p]).to_owned();
            let q = set.q.select(Axis(0), &rows);
            Ok(RestrictionBlock { index, r, q })
        })
        .collect()
}

/// Free parametrization `βᵢ = Hᵢ·φᵢ + sᵢ` of one cointegrating vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedBlock {
    pub index: usize,
    /// `p × kᵢ`, `None` when the vector is pinned.
    pub h: Option<Array2<f64>>,
    pub s: Array1<f64>,
}

impl TranslatedBlock {
    /// Number of free parameters `kᵢ`.
    pub fn free(&self) -> usize {
        self.h.as_ref().map_or(0, |h| h.ncols())
    }

    /// `sᵢ = 0`: the restrictions fix the vector only up to scale.
    pub fn is_homogeneous(&self) -> bool {
        self.s.iter().all(|v| v.abs() <= ZERO_TOL)
    }

    /// `[Hᵢ sᵢ]`; just `sᵢ` for a pinned vector and just `Hᵢ` for a
    /// homogeneous one.
    pub fn augmented(&self) -> VecmResult<Array2<f64>> {
        let s_col = self.s.view().insert_axis(Axis(1));
        match &self.h {
            Some(h) if self.is_homogeneous() => Ok(h.clone()),
            Some(h) => Ok(hconcat(&[h.view(), s_col])?),
            None => Ok(s_col.to_owned()),
        }
    }

    /// Basis (as columns) of the orthogonal complement of `[Hᵢ sᵢ]`.
    pub fn complement(&self) -> VecmResult<Array2<f64>> {
        Ok(orth_complement(self.augmented()?.view())?)
    }
}

/// Translate one block into its affine parametrization.
///
/// # Errors
/// - [`VecmError::SingularRestriction`] if `R_iR_iᵗ` is singular (dependent
///   rows) or a pinned system is inconsistent.
/// - [`VecmError::NotIdentified`] if homogeneous restrictions of full rank
///   force the vector to zero.
pub fn translate_block(block: &RestrictionBlock) -> VecmResult<TranslatedBlock> {
    let (m, p) = block.r.dim();
    let singular = |_: LinalgError| VecmError::SingularRestriction { block: block.index };
    let rk = rank(block.r.view());
    let q_col = block.q.view().insert_axis(Axis(1));

    if rk == p && block.q.iter().all(|v| v.abs() <= ZERO_TOL) {
        return Err(VecmError::NotIdentified {
            detail: format!(
                "homogeneous restrictions force cointegrating vector {} to zero",
                block.index
            ),
        });
    }
    if rk == p {
        let s = if m == p {
            solve(block.r.view(), q_col).map_err(singular)?
        } else {
            let s = lstsq(block.r.view(), q_col).map_err(singular)?;
            let resid = &block.r.dot(&s) - &q_col;
            let scale = 1.0 + block.q.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if resid.iter().any(|v| v.abs() > CONSISTENCY_TOL * scale) {
                return Err(VecmError::SingularRestriction { block: block.index });
            }
            s
        };
        return Ok(TranslatedBlock { index: block.index, h: None, s: s.column(0).to_owned() });
    }

    if rk < m {
        return Err(VecmError::SingularRestriction { block: block.index });
    }
    let h = right_nullspace(block.r.view())?;
    let rrt = block.r.dot(&block.r.t());
    let w = spd_solve(rrt.view(), q_col).map_err(singular)?;
    let s = block.r.t().dot(&w).column(0).to_owned();
    Ok(TranslatedBlock { index: block.index, h: Some(h), s })
}

/// Stacked parametrization `vec(β) = H·φ + s` over all vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionDesign {
    pub blocks: Vec<TranslatedBlock>,
    /// `p·r × Σkᵢ`, block diagonal.
    pub h: Array2<f64>,
    /// `p·r`.
    pub s: Array1<f64>,
    pub p: usize,
    pub r: usize,
    /// Column offset of each block inside `H` (and inside `φ`).
    pub offsets: Vec<usize>,
}

impl RestrictionDesign {
    /// Split, translate and stack a restriction set.
    ///
    /// # Errors
    /// Propagates errors from [`split_blocks`] and [`translate_block`].
    pub fn from_set(set: &RestrictionSet) -> VecmResult<Self> {
        let blocks: Vec<TranslatedBlock> =
            split_blocks(set)?.iter().map(translate_block).collect::<VecmResult<_>>()?;
        Ok(Self::from_blocks(blocks, set.nvars()))
    }

    pub fn from_blocks(blocks: Vec<TranslatedBlock>, p: usize) -> Self {
        let r = blocks.len();
        let mut offsets = Vec::with_capacity(r);
        let mut total = 0;
        for b in &blocks {
            offsets.push(total);
            total += b.free();
        }
        let mut h = Array2::zeros((p * r, total));
        let mut s_vec = Array1::zeros(p * r);
        for (i, b) in blocks.iter().enumerate() {
            s_vec.slice_mut(s![i * p..(i + 1) * p]).assign(&b.s);
            if let Some(hi) = &b.h {
                h.slice_mut(s![i * p..(i + 1) * p, offsets[i]..offsets[i] + hi.ncols()]).assign(hi);
            }
        }
        Self { blocks, h, s: s_vec, p, r, offsets }
    }

    /// Total free parameters `Σkᵢ`.
    pub fn n_free(&self) -> usize {
        self.h.ncols()
    }

    /// `true` when every vector is pinned and there is nothing to estimate.
    pub fn noest(&self) -> bool {
        self.n_free() == 0
    }

    /// `vec(β) = H·φ + s`.
    pub fn vec_beta(&self, phi: ArrayView1<f64>) -> Array1<f64> {
        self.h.dot(&phi) + &self.s
    }

    /// Write `β(φ)` into a preallocated `p × r` matrix.
    pub fn beta_into(&self, phi: ArrayView1<f64>, out: ArrayViewMut2<f64>) {
        unvec_into(self.vec_beta(phi).view(), out);
    }

    pub fn beta(&self, phi: ArrayView1<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.p, self.r));
        self.beta_into(phi, out.view_mut());
        out
    }

    /// Least-squares free parameters of `beta`:
    /// `φ = (HᵗH)⁻¹·Hᵗ·(vec(β) − s)`; empty when nothing is free.
    ///
    /// # Errors
    /// [`VecmError::SingularProjection`] if `HᵗH` cannot be inverted.
    pub fn project(&self, beta: ArrayView2<f64>) -> VecmResult<Array1<f64>> {
        if self.noest() {
            return Ok(Array1::zeros(0));
        }
        let resid = vec_cols(beta) - &self.s;
        let hth = self.h.t().dot(&self.h);
        let rhs = self.h.t().dot(&resid).insert_axis(Axis(1));
        Ok(spd_solve(hth.view(), rhs.view())
            .map_err(|_| VecmError::SingularProjection)?
            .column(0)
            .to_owned())
    }

    /// Scale every homogeneous vector of `beta` so its largest-magnitude
    /// entry equals one, and return the rescaled beta together with the
    /// design in which those normalizations are restrictions.
    ///
    /// The profile likelihood is invariant to column scaling, so the
    /// rescaled beta has the same likelihood. In the returned design vector
    /// `i` keeps `span(Hᵢ) ∩ {xₖ = 0}` as its free space (one parameter
    /// fewer) and the minimum-norm point of its normalized affine set as
    /// `sᵢ`; that design is the one to use for standard errors and degrees
    /// of freedom. Without homogeneous vectors both outputs equal the inputs.
    ///
    /// # Errors
    /// [`VecmError::NonFiniteResult`] if a homogeneous vector is zero or not
    /// finite.
    pub fn normalize_homogeneous(
        &self, beta: ArrayView2<f64>,
    ) -> VecmResult<(Array2<f64>, RestrictionDesign)> {
        let mut scaled = beta.to_owned();
        let mut blocks = self.blocks.clone();
        for block in blocks.iter_mut().filter(|b| b.is_homogeneous()) {
            let i = block.index;
            let (pivot, top) = scaled.column(i).iter().enumerate().fold(
                (0, 0.0_f64),
                |(k, best), (j, &v)| if v.abs() > best.abs() { (j, v) } else { (k, best) },
            );
            if !top.is_finite() || top.abs() <= ZERO_TOL {
                return Err(VecmError::NonFiniteResult {
                    context: "normalization of a homogeneous cointegrating vector",
                });
            }
            scaled.column_mut(i).mapv_inplace(|v| v / top);

            let Some(h) = &block.h else { continue };
            let pivot_row = h.row(pivot).insert_axis(Axis(0)).to_owned();
            let free = h.dot(&right_nullspace(pivot_row.view())?);
            let col = scaled.column(i).to_owned();
            let s_i = &col - &free.dot(&free.t().dot(&col));
            block.h = if free.ncols() == 0 { None } else { Some(free) };
            block.s = s_i;
        }
        Ok((scaled, RestrictionDesign::from_blocks(blocks, self.p)))
    }
}

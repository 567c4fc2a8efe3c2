//! linalg::dense — dense real matrix primitives for restriction algebra.
//!
//! Purpose
//! -------
//! Provide the small set of dense operations the restricted-cointegration
//! engine needs (rank, nullspaces, generalized symmetric eigenproblems,
//! Kronecker products, log-determinants, linear solves) on `ndarray`
//! containers, delegating the heavy decompositions to `nalgebra`.
//!
//! Key behaviors
//! -------------
//! - Bridge `ndarray` ⇄ `nalgebra` by copying ([`to_dmatrix`],
//!   [`from_dmatrix`]); all public routines take and return `ndarray` types.
//! - Rank and nullspaces are computed from singular values with a relative
//!   tolerance ([`RANK_TOL`]); [`rank_with_tol`] adds an absolute floor for
//!   products that may be zero up to rounding.
//! - The generalized problem `A v = λ B v` (B positive definite) is reduced to
//!   a symmetric one through the Cholesky factor of `B`; eigenvectors are
//!   returned `B`-orthonormal and sorted by descending eigenvalue.
//! - [`chol_logdet_in_place`] and [`quad_form_into`] are allocation-free and
//!   intended for the likelihood hot loop.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite. Symmetric inputs are only read through their lower
//!   triangle where noted.
//! - Failures are reported as [`LinalgError`]; nothing here panics on
//!   numerically bad input, though shape mismatches in the `*_into` helpers
//!   are programmer errors.
//!
//! Conventions
//! -----------
//! - `vec(·)` stacks columns, matching the econometric convention
//!   `vec(β) = [β₁; β₂; …; β_r]`.
//! - Nullspace bases are orthonormal and returned as columns.
use std::cmp::Ordering;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2, linalg::general_mat_mul, s};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::linalg::errors::{LinalgError, LinalgResult};

/// Relative singular-value threshold used for rank decisions.
pub const RANK_TOL: f64 = 1e-9;

/// Eigenvalues at or below this magnitude are treated as zero in
/// pseudoinverses.
pub const EIGEN_EPS: f64 = 1e-12;

/// Copy an `ndarray` matrix into a `nalgebra::DMatrix`.
pub fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| a[[i, j]])
}

/// Copy a `nalgebra::DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(a: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.nrows(), a.ncols()), |(i, j)| a[(i, j)])
}

/// Column-stacking `vec(a)`.
pub fn vec_cols(a: ArrayView2<f64>) -> Array1<f64> {
    Array1::from_iter(a.t().iter().copied())
}

/// Inverse of [`vec_cols`]: reshape a column-stacked vector into `rows × cols`.
pub fn unvec_cols(v: ArrayView1<f64>, rows: usize, cols: usize) -> Array2<f64> {
    let mut out = Array2::zeros((rows, cols));
    unvec_into(v, out.view_mut());
    out
}

/// Write a column-stacked vector into a preallocated matrix.
pub fn unvec_into(v: ArrayView1<f64>, mut out: ArrayViewMut2<f64>) {
    let rows = out.nrows();
    for ((i, j), x) in out.indexed_iter_mut() {
        *x = v[j * rows + i];
    }
}

/// Numerical rank of `a`.
///
/// Counts singular values above `RANK_TOL · max(m, n) · σ_max`. Empty and
/// all-zero matrices have rank 0. A matrix made of rounding noise only is
/// judged full rank by this relative rule; use [`rank_with_tol`] when `a` is
/// a product whose exact value may vanish.
pub fn rank(a: ArrayView2<f64>) -> usize {
    rank_with_tol(a, 0.0)
}

/// Numerical rank of `a` with an absolute floor.
///
/// Counts singular values above `max(RANK_TOL · max(m, n) · σ_max, abs_tol)`.
/// For a product `X·Y`, `abs_tol = RANK_TOL · max(m, n) · ‖X‖_F · ‖Y‖_F`
/// (see [`frobenius_norm`]) treats rounding residue of an exactly zero
/// product as rank 0.
pub fn rank_with_tol(a: ArrayView2<f64>, abs_tol: f64) -> usize {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return 0;
    }
    let sv = to_dmatrix(a).singular_values();
    let smax = sv.iter().copied().fold(0.0_f64, f64::max);
    if smax <= 0.0 {
        return 0;
    }
    let tol = (RANK_TOL * smax * (m.max(n) as f64)).max(abs_tol);
    sv.iter().filter(|&&s| s > tol).count()
}

/// `‖a‖_F`.
pub fn frobenius_norm(a: ArrayView2<f64>) -> f64 {
    a.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Orthonormal basis (as columns) of `{x : a·x = 0}`.
///
/// The input is zero-padded to at least `n` rows so that the SVD yields a
/// full `n × n` right singular basis. A matrix with no rows has the whole
/// space as its nullspace.
pub fn right_nullspace(a: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    let (m, n) = a.dim();
    if n == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let rows = m.max(n);
    let mut padded = DMatrix::<f64>::zeros(rows, n);
    for ((i, j), &x) in a.indexed_iter() {
        padded[(i, j)] = x;
    }
    let svd = padded.svd(false, true);
    let v_t = svd.v_t.ok_or(LinalgError::NonFinite { context: "right_nullspace" })?;
    let smax = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tol = RANK_TOL * smax * (rows as f64);
    let null_idx: Vec<usize> = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, s)| smax <= 0.0 || **s <= tol)
        .map(|(k, _)| k)
        .collect();
    let mut basis = Array2::zeros((n, null_idx.len()));
    for (c, &k) in null_idx.iter().enumerate() {
        for i in 0..n {
            basis[[i, c]] = v_t[(k, i)];
        }
    }
    if basis.iter().any(|x| !x.is_finite()) {
        return Err(LinalgError::NonFinite { context: "right_nullspace" });
    }
    Ok(basis)
}

/// Orthonormal basis of the orthogonal complement of `span(a)`, i.e. the
/// left nullspace of `a`.
pub fn orth_complement(a: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    right_nullspace(a.t())
}

/// Horizontal concatenation of matrices with equal row counts.
pub fn hconcat(blocks: &[ArrayView2<f64>]) -> LinalgResult<Array2<f64>> {
    let rows = blocks.first().map(|b| b.nrows()).unwrap_or(0);
    let cols: usize = blocks.iter().map(|b| b.ncols()).sum();
    let mut out = Array2::zeros((rows, cols));
    let mut offset = 0;
    for b in blocks {
        if b.nrows() != rows {
            return Err(LinalgError::DimensionMismatch {
                context: "hconcat",
                expected: (rows, b.ncols()),
                found: b.dim(),
            });
        }
        out.slice_mut(s![.., offset..offset + b.ncols()]).assign(b);
        offset += b.ncols();
    }
    Ok(out)
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let (ma, na) = a.dim();
    let (mb, nb) = b.dim();
    let mut out = Array2::zeros((ma * mb, na * nb));
    for ((i, j), &aij) in a.indexed_iter() {
        if aij == 0.0 {
            continue;
        }
        let mut block = out.slice_mut(s![i * mb..(i + 1) * mb, j * nb..(j + 1) * nb]);
        block.scaled_add(aij, &b);
    }
    out
}

/// Solve the square system `a·x = b` by LU decomposition.
pub fn solve(a: ArrayView2<f64>, b: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.nrows() != n {
        return Err(LinalgError::DimensionMismatch {
            context: "solve",
            expected: (n, n),
            found: a.dim(),
        });
    }
    if rank(a) < n {
        return Err(LinalgError::Singular { context: "solve" });
    }
    let x = to_dmatrix(a)
        .lu()
        .solve(&to_dmatrix(b))
        .ok_or(LinalgError::Singular { context: "solve" })?;
    let out = from_dmatrix(&x);
    if out.iter().any(|v| !v.is_finite()) {
        return Err(LinalgError::NonFinite { context: "solve" });
    }
    Ok(out)
}

/// Solve `a·x = b` for symmetric positive definite `a` via Cholesky.
pub fn spd_solve(a: ArrayView2<f64>, b: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    let chol =
        to_dmatrix(a).cholesky().ok_or(LinalgError::NotPositiveDefinite { context: "spd_solve" })?;
    Ok(from_dmatrix(&chol.solve(&to_dmatrix(b))))
}

/// Ordinary least squares `argmin_x ‖a·x − b‖` through the normal equations.
///
/// Fails with [`LinalgError::Singular`] when `a` lacks full column rank.
pub fn lstsq(a: ArrayView2<f64>, b: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    if a.nrows() != b.nrows() {
        return Err(LinalgError::DimensionMismatch {
            context: "lstsq",
            expected: (a.nrows(), b.ncols()),
            found: b.dim(),
        });
    }
    if rank(a) < a.ncols() {
        return Err(LinalgError::Singular { context: "lstsq" });
    }
    let ata = a.t().dot(&a);
    let atb = a.t().dot(&b);
    spd_solve(ata.view(), atb.view()).map_err(|_| LinalgError::Singular { context: "lstsq" })
}

/// Inverse of a symmetric positive definite matrix.
pub fn sym_inverse(a: ArrayView2<f64>) -> LinalgResult<Array2<f64>> {
    let chol = to_dmatrix(a)
        .cholesky()
        .ok_or(LinalgError::NotPositiveDefinite { context: "sym_inverse" })?;
    Ok(from_dmatrix(&chol.inverse()))
}

/// Moore–Penrose pseudoinverse of a symmetric matrix.
///
/// Eigen-directions with eigenvalue `≤ EIGEN_EPS · λ_max` are dropped, so
/// nearly flat directions contribute nothing instead of blowing up.
pub fn pinv_sym(a: ArrayView2<f64>) -> Array2<f64> {
    let n = a.nrows();
    let eig = to_dmatrix(a).symmetric_eigen();
    let lmax = eig.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = EIGEN_EPS * lmax.max(1.0);
    let q = eig.eigenvectors;
    let mut out = Array2::zeros((n, n));
    for (k, &lambda) in eig.eigenvalues.iter().enumerate() {
        if lambda <= cutoff {
            continue;
        }
        for i in 0..n {
            let qi = q[(i, k)] / lambda;
            for j in 0..n {
                out[[i, j]] += qi * q[(j, k)];
            }
        }
    }
    out
}

/// `ln|a|` for symmetric positive definite `a`.
pub fn log_det_pd(a: ArrayView2<f64>) -> LinalgResult<f64> {
    let chol = to_dmatrix(a)
        .cholesky()
        .ok_or(LinalgError::NotPositiveDefinite { context: "log_det_pd" })?;
    let l = chol.l_dirty();
    Ok((0..a.nrows()).map(|i| 2.0 * l[(i, i)].ln()).sum())
}

/// In-place Cholesky of a small symmetric matrix, returning `ln|m|`.
///
/// Reads and overwrites the lower triangle only. Returns `None` when a pivot
/// is non-positive or non-finite.
pub fn chol_logdet_in_place(mut m: ArrayViewMut2<f64>) -> Option<f64> {
    let n = m.nrows();
    let mut logdet = 0.0;
    for j in 0..n {
        let mut d = m[[j, j]];
        for k in 0..j {
            d -= m[[j, k]] * m[[j, k]];
        }
        if !(d > 0.0 && d.is_finite()) {
            return None;
        }
        let ljj = d.sqrt();
        m[[j, j]] = ljj;
        logdet += 2.0 * ljj.ln();
        for i in (j + 1)..n {
            let mut acc = m[[i, j]];
            for k in 0..j {
                acc -= m[[i, k]] * m[[j, k]];
            }
            m[[i, j]] = acc / ljj;
        }
    }
    Some(logdet)
}

/// Quadratic form `out = bᵗ·s·b` using `tmp` (shape of `b`) as scratch.
pub fn quad_form_into(
    b: ArrayView2<f64>, s: ArrayView2<f64>, tmp: &mut Array2<f64>, out: &mut Array2<f64>,
) {
    general_mat_mul(1.0, &s, &b, 0.0, &mut *tmp);
    general_mat_mul(1.0, &b.t(), &*tmp, 0.0, &mut *out);
}

/// Generalized symmetric eigenproblem `a·v = λ·b·v` for positive definite `b`.
///
/// Returns the `r` largest eigenvalues (descending) and their eigenvectors as
/// columns, normalized so that `vᵗ·b·v = I`.
pub fn gen_sym_eigen(
    a: ArrayView2<f64>, b: ArrayView2<f64>, r: usize,
) -> LinalgResult<(Array1<f64>, Array2<f64>)> {
    let p = b.nrows();
    if b.ncols() != p || a.dim() != (p, p) || r > p {
        return Err(LinalgError::DimensionMismatch {
            context: "gen_sym_eigen",
            expected: (p, p),
            found: a.dim(),
        });
    }
    let l = to_dmatrix(b)
        .cholesky()
        .ok_or(LinalgError::NotPositiveDefinite { context: "gen_sym_eigen" })?
        .l();
    let l_inv = l.try_inverse().ok_or(LinalgError::Singular { context: "gen_sym_eigen" })?;
    let c = &l_inv * to_dmatrix(a) * l_inv.transpose();
    let c = (&c + c.transpose()) * 0.5;
    let eig = c.symmetric_eigen();
    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&i, &j| {
        eig.eigenvalues[j].partial_cmp(&eig.eigenvalues[i]).unwrap_or(Ordering::Equal)
    });
    let vecs = l_inv.transpose() * &eig.eigenvectors;
    let mut values = Array1::zeros(r);
    let mut out = Array2::zeros((p, r));
    for (col, &k) in order.iter().take(r).enumerate() {
        values[col] = eig.eigenvalues[k];
        for i in 0..p {
            out[[i, col]] = vecs[(i, k)];
        }
    }
    if values.iter().chain(out.iter()).any(|x| !x.is_finite()) {
        return Err(LinalgError::NonFinite { context: "gen_sym_eigen" });
    }
    Ok((values, out))
}

/// Matrix of independent standard normal draws.
pub fn random_normal<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, cols), || rng.sample::<f64, _>(StandardNormal))
}

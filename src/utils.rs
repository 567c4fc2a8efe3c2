//! Python conversion helpers for the `python-bindings` feature.
//!
//! Everything here turns Python inputs (numpy arrays, nested sequences,
//! optional keyword arguments) into validated Rust values and maps failures
//! into `PyErr`. No numerical work happens here.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
    PyUntypedArrayMethods, // .shape()
};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::{
        annealing::AnnealOptions,
        loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    },
    vecm::{
        core::options::{DEFAULT_JACOBIAN_SEED, RestrictOptions},
        errors::VecmError,
    },
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// 1-D input as an owned `Array1`.
#[cfg(feature = "python-bindings")]
pub fn extract_vector<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr
        .as_slice()
        .map_err(|_| PyValueError::new_err("expected a contiguous 1-D float64 array"))?;
    Ok(Array1::from(slice.to_vec()))
}

/// 2-D input (C-contiguous numpy array or list of rows) as an owned `Array2`.
#[cfg(feature = "python-bindings")]
pub fn extract_matrix(raw: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        let shape = arr.shape().to_vec();
        if let Ok(slice) = arr.as_slice() {
            return Array2::from_shape_vec((shape[0], shape[1]), slice.to_vec())
                .map_err(|e| PyValueError::new_err(e.to_string()));
        }
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 2-D numpy.ndarray or a sequence of float64 rows",
        )
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(PyValueError::new_err("matrix rows must all have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((flat.len() / ncols.max(1), ncols), flat)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// `Array2` → row-major `Vec<Vec<f64>>` for Python.
#[cfg(feature = "python-bindings")]
pub fn matrix_to_rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|r| r.to_vec()).collect()
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    // Tolerances::new -> OptResult<Tolerances> -> VecmError -> PyErr
    let tols = match (tol_grad, tol_cost, max_iter) {
        (None, None, None) => MLEOptions::default().tols,
        _ => Tolerances::new(tol_grad, tol_cost, max_iter).map_err(VecmError::from)?,
    };

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(VecmError::from)?,
        None => LineSearcher::MoreThuente,
    };

    Ok(MLEOptions::new(tols, ls, lbfgs_mem).map_err(VecmError::from)?)
}

/// Assemble [`RestrictOptions`] from Python keyword arguments.
///
/// `anneal_iterations = Some(0)` disables the annealing phase; `seed` drives
/// both the annealer and the identification probe.
#[cfg(feature = "python-bindings")]
pub fn build_restrict_options(
    verbose: bool, fold: bool, anneal_iterations: Option<usize>, seed: Option<u64>,
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<RestrictOptions> {
    let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
    let defaults = AnnealOptions::default();
    let anneal = match anneal_iterations {
        Some(0) => None,
        iterations => Some(
            AnnealOptions::new(
                iterations.unwrap_or(defaults.iterations),
                defaults.initial_temp,
                defaults.initial_radius,
                defaults.temp_decay,
                defaults.radius_decay,
                seed.unwrap_or(defaults.seed),
            )
            .map_err(VecmError::from)?,
        ),
    };
    let jacobian_seed = seed.unwrap_or(DEFAULT_JACOBIAN_SEED);
    Ok(RestrictOptions::new(verbose, fold, anneal, mle_opts, jacobian_seed))
}

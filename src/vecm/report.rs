//! Plain-text report of a restricted cointegration estimate.
//!
//! [`RestrictedOutcome`] implements `Display`: log-likelihoods, the LR test
//! of the restrictions, how identification was established, optimizer
//! counters, and the restricted beta with standard errors in parentheses
//! beneath each coefficient (one row per variable, including deterministic
//! terms).
use std::fmt;

use crate::vecm::{core::identification::IdentificationMethod, models::RestrictedOutcome};

const NAME_WIDTH: usize = 10;
const COL_WIDTH: usize = 13;

impl fmt::Display for RestrictedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = self.beta.ncols();
        writeln!(f, "Restricted cointegration, rank {rank}")?;
        writeln!(f)?;
        writeln!(f, "Unrestricted loglikelihood (lu) = {:.6}", self.loglik_unrestricted)?;
        writeln!(f, "Restricted loglikelihood (lr) = {:.6}", self.loglik)?;
        writeln!(f, "2 * (lu - lr) = {:.6}", self.lr.statistic)?;
        match self.lr.p_value {
            Some(p) => writeln!(
                f,
                "P(Chi-square({}) > {:.6}) = {:.6}",
                self.lr.df, self.lr.statistic, p
            )?,
            None => writeln!(f, "LR test not applicable (df = {})", self.lr.df)?,
        }
        writeln!(f)?;

        match self.identification {
            IdentificationMethod::RankConditions => {
                writeln!(f, "Identification: rank conditions satisfied")?
            }
            IdentificationMethod::JacobianProbe { rank, required } => writeln!(
                f,
                "Identification: Jacobian rank {rank} of {required} at one random point \
                 (numerical check)"
            )?,
        }
        if self.noest {
            writeln!(f, "All cointegrating vectors are fully restricted; nothing estimated")?;
        } else {
            writeln!(
                f,
                "Function evaluations: {}, gradient evaluations: {}",
                self.fncount, self.grcount
            )?;
        }
        writeln!(f)?;

        writeln!(f, "beta (standard errors in parentheses)")?;
        writeln!(f)?;
        write!(f, "{:NAME_WIDTH$}", "")?;
        for j in 0..rank {
            write!(f, "{:>COL_WIDTH$}", format!("vec{}", j + 1))?;
        }
        writeln!(f)?;
        for (i, name) in self.names.iter().enumerate().take(self.beta.nrows()) {
            write!(f, "{:<NAME_WIDTH$}", name)?;
            for j in 0..rank {
                write!(f, "{:>COL_WIDTH$.6}", self.beta[[i, j]])?;
            }
            writeln!(f)?;
            write!(f, "{:NAME_WIDTH$}", "")?;
            for j in 0..rank {
                write!(f, "{:>COL_WIDTH$}", format!("({:.6})", self.beta_se[[i, j]]))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

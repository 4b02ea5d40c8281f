//! Klobuchar ionospheric model parameters

use serde::Serialize;
use std::io::{self, Write};

/// Broadcast Klobuchar coefficients (n-th term in seconds/semicircle^n)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IonoData {
    pub alpha: [f64; 4],
    pub beta: [f64; 4],
}

impl IonoData {
    pub fn validate(&self) -> bool {
        self.alpha.iter().chain(self.beta.iter()).all(|v| v.is_finite())
    }

    pub(crate) fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "  alpha: {:e} {:e} {:e} {:e}",
            self.alpha[0], self.alpha[1], self.alpha[2], self.alpha[3]
        )?;
        writeln!(
            out,
            "  beta:  {:e} {:e} {:e} {:e}",
            self.beta[0], self.beta[1], self.beta[2], self.beta[3]
        )
    }
}

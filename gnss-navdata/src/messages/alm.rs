//! CNAV-2 midi almanac

use crate::time::NavTime;
use crate::types::{DumpDetail, SvHealth};
use serde::Serialize;
use std::io::{self, Write};

/// Almanac decoded from CNAV-2 subframe 3 page 4
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CNav2Alm {
    pub xmit_time: NavTime,
    pub wna: u64,
    pub toa: f64,
    pub toe: NavTime,
    pub toc: NavTime,
    pub m0: f64,
    pub ecc: f64,
    pub ahalf: f64,
    pub a: f64,
    pub omega0: f64,
    pub i0: f64,
    pub delta_i: f64,
    pub w: f64,
    pub omega_dot: f64,
    pub af0: f64,
    pub af1: f64,
    pub health_l1: bool,
    pub health_l2: bool,
    pub health_l5: bool,
    pub health: SvHealth,
    pub begin_fit: NavTime,
    pub end_fit: NavTime,
}

impl CNav2Alm {
    /// Reference inclination for GPS (semicircles)
    pub const REF_I_OFFSET_GPS: f64 = 0.30;
    /// Reference inclination for QZSS (semicircles)
    pub const REF_I_OFFSET_QZSS: f64 = 0.25;

    const FIT_BEFORE_TOA: f64 = 70.0 * 3600.0;
    const FIT_AFTER_TOA: f64 = 74.0 * 3600.0;

    pub fn fix_fit(&mut self) {
        self.begin_fit = self.toe.add_seconds(-Self::FIT_BEFORE_TOA);
        self.end_fit = self.toe.add_seconds(Self::FIT_AFTER_TOA);
    }

    pub fn validate(&self) -> bool {
        [self.m0, self.omega0, self.i0, self.w, self.omega_dot, self.af0, self.af1]
            .iter()
            .all(|v| v.is_finite())
            && (0.0..1.0).contains(&self.ecc)
            && self.a > 0.0
    }

    pub(crate) fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        writeln!(out, "  toa:          {} (WNa {})", self.toe, self.wna)?;
        writeln!(
            out,
            "  Health:       {} (L1 {} L2 {} L5 {})",
            self.health, self.health_l1 as u8, self.health_l2 as u8, self.health_l5 as u8
        )?;
        if detail == DumpDetail::Full {
            writeln!(out, "  Ahalf   {:>22.12e}  ecc    {:>22.12e}", self.ahalf, self.ecc)?;
            writeln!(out, "  OMEGA0  {:>22.12e}  i0     {:>22.12e}", self.omega0, self.i0)?;
            writeln!(out, "  w       {:>22.12e}  M0     {:>22.12e}", self.w, self.m0)?;
            writeln!(out, "  OMEGAd  {:>22.12e}", self.omega_dot)?;
            writeln!(out, "  af0     {:>22.12e}  af1    {:>22.12e}", self.af0, self.af1)?;
        }
        Ok(())
    }
}

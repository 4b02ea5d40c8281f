//! CNAV-2 ephemeris

use crate::time::NavTime;
use crate::types::{DumpDetail, SvHealth};
use serde::Serialize;
use std::io::{self, Write};

/// Ephemeris decoded from CNAV-2 subframe 2
///
/// Angles are in radians, distances in meters, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CNav2Eph {
    pub xmit_time: NavTime,
    pub toe: NavTime,
    pub toc: NavTime,
    pub cuc: f64,
    pub cus: f64,
    pub crc: f64,
    pub crs: f64,
    pub cic: f64,
    pub cis: f64,
    pub m0: f64,
    pub dn: f64,
    pub dndot: f64,
    pub ecc: f64,
    pub delta_a: f64,
    pub a: f64,
    pub ahalf: f64,
    pub adot: f64,
    pub omega0: f64,
    pub i0: f64,
    pub w: f64,
    pub d_omega_dot: f64,
    pub omega_dot: f64,
    pub idot: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    pub health_l1c: bool,
    pub health: SvHealth,
    pub ura_ed: i64,
    pub top: NavTime,
    pub ura_ned0: i64,
    pub ura_ned1: u64,
    pub ura_ned2: u64,
    /// Group delay, NaN when the satellite flags it unavailable
    pub tgd: f64,
    pub isc_l1cp: f64,
    pub isc_l1cd: f64,
    pub integrity_status: bool,
    pub begin_fit: NavTime,
    pub end_fit: NavTime,
}

impl CNav2Eph {
    /// Reference semi-major axis for GPS (meters)
    pub const REF_A_GPS: f64 = 26_559_710.0;
    /// Reference semi-major axis for QZSS (meters)
    pub const REF_A_QZSS: f64 = 42_164_200.0;
    /// Reference rate of right ascension (semicircles/second)
    pub const REF_OMEGA_DOT_SEMICIRCLES: f64 = -2.6e-9;

    /// Half of the three hour curve fit interval centered on toe
    const HALF_FIT_SECONDS: f64 = 5400.0;

    /// Set the fit interval from the transmit time and toe
    pub fn fix_fit(&mut self) {
        self.begin_fit = self.xmit_time;
        self.end_fit = self.toe.add_seconds(Self::HALF_FIT_SECONDS);
    }

    pub fn validate(&self) -> bool {
        let orbit = [
            self.cuc,
            self.cus,
            self.crc,
            self.crs,
            self.cic,
            self.cis,
            self.m0,
            self.dn,
            self.dndot,
            self.omega0,
            self.i0,
            self.w,
            self.omega_dot,
            self.idot,
            self.af0,
            self.af1,
            self.af2,
        ];
        orbit.iter().all(|v| v.is_finite())
            && (0.0..1.0).contains(&self.ecc)
            && self.a > 0.0
            && self.ahalf.is_finite()
    }

    pub(crate) fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        writeln!(out, "  Toe:          {}", self.toe)?;
        writeln!(out, "  Fit interval: {} .. {}", self.begin_fit, self.end_fit)?;
        writeln!(out, "  Health:       {} (L1C bit {})", self.health, self.health_l1c as u8)?;
        if detail != DumpDetail::Full {
            return Ok(());
        }
        writeln!(out, "  A       {:>22.12e}  Ahalf  {:>22.12e}", self.a, self.ahalf)?;
        writeln!(out, "  dA      {:>22.12e}  Adot   {:>22.12e}", self.delta_a, self.adot)?;
        writeln!(out, "  ecc     {:>22.12e}  M0     {:>22.12e}", self.ecc, self.m0)?;
        writeln!(out, "  dn      {:>22.12e}  dndot  {:>22.12e}", self.dn, self.dndot)?;
        writeln!(out, "  OMEGA0  {:>22.12e}  i0     {:>22.12e}", self.omega0, self.i0)?;
        writeln!(out, "  w       {:>22.12e}  OMEGAd {:>22.12e}", self.w, self.omega_dot)?;
        writeln!(out, "  idot    {:>22.12e}", self.idot)?;
        writeln!(out, "  Cuc     {:>22.12e}  Cus    {:>22.12e}", self.cuc, self.cus)?;
        writeln!(out, "  Crc     {:>22.12e}  Crs    {:>22.12e}", self.crc, self.crs)?;
        writeln!(out, "  Cic     {:>22.12e}  Cis    {:>22.12e}", self.cic, self.cis)?;
        writeln!(out, "  af0     {:>22.12e}  af1    {:>22.12e}", self.af0, self.af1)?;
        writeln!(out, "  af2     {:>22.12e}  Tgd    {:>22.12e}", self.af2, self.tgd)?;
        writeln!(out, "  ISC L1CP {:>21.12e}  ISC L1CD {:>20.12e}", self.isc_l1cp, self.isc_l1cd)?;
        writeln!(
            out,
            "  URA ED {}  NED0 {}  NED1 {}  NED2 {}  top {}  ISF {}",
            self.ura_ed,
            self.ura_ned0,
            self.ura_ned1,
            self.ura_ned2,
            self.top,
            self.integrity_status as u8
        )
    }
}

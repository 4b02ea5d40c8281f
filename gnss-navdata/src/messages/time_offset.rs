//! Time system offset messages

use crate::time::{NavTime, TimeSystem, SEC_PER_WEEK};
use crate::types::DumpDetail;
use serde::Serialize;
use std::io::{self, Write};

/// Polynomial offset between the broadcasting system and a target system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOffsetData {
    /// Time system of the broadcasting constellation
    pub src: TimeSystem,
    pub tgt: TimeSystem,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    /// Current leap seconds, zero for GNSS-GNSS offsets
    pub delta_t_ls: f64,
    pub tot: f64,
    pub wnot: u64,
    pub wn_lsf: u64,
    pub dn: u64,
    pub delta_t_lsf: f64,
    /// Reference time of the polynomial (WNot, tot)
    pub ref_time: NavTime,
}

impl TimeOffsetData {
    /// Both conversion directions this message can serve
    pub fn conversion_pairs(&self) -> [(TimeSystem, TimeSystem); 2] {
        [(self.src, self.tgt), (self.tgt, self.src)]
    }

    /// Offset in seconds to add when converting `when` from `from` to `to`
    pub fn offset_seconds(&self, from: TimeSystem, to: TimeSystem, when: &NavTime) -> Option<f64> {
        let dt = when.diff_seconds(&self.ref_time);
        let offset = self.delta_t_ls + self.a0 + self.a1 * dt + self.a2 * dt * dt;
        if (from, to) == (self.src, self.tgt) {
            Some(offset)
        } else if (from, to) == (self.tgt, self.src) {
            Some(-offset)
        } else {
            None
        }
    }

    pub fn validate(&self) -> bool {
        [self.a0, self.a1, self.a2, self.delta_t_ls, self.delta_t_lsf]
            .iter()
            .all(|v| v.is_finite())
            && (0.0..SEC_PER_WEEK as f64).contains(&self.tot)
    }

    pub(crate) fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        writeln!(out, "  Conversion:   {} -> {}", self.src, self.tgt)?;
        writeln!(out, "  Reference:    {}", self.ref_time)?;
        if detail == DumpDetail::Full {
            writeln!(
                out,
                "  A0 {:>20.12e}  A1 {:>20.12e}  A2 {:>20.12e}",
                self.a0, self.a1, self.a2
            )?;
            writeln!(
                out,
                "  dtLS {}  WNlsf {}  DN {}  dtLSF {}",
                self.delta_t_ls, self.wn_lsf, self.dn, self.delta_t_lsf
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gps_utc() -> TimeOffsetData {
        TimeOffsetData {
            src: TimeSystem::Gps,
            tgt: TimeSystem::Utc,
            a0: 1e-9,
            a1: 1e-14,
            a2: 0.0,
            delta_t_ls: 18.0,
            tot: 1024.0,
            wnot: 2200,
            wn_lsf: 1929,
            dn: 7,
            delta_t_lsf: 18.0,
            ref_time: NavTime::from_week_second(TimeSystem::Gps, 2200, 1024.0),
        }
    }

    #[test]
    fn test_offset_both_directions() {
        let to = gps_utc();
        let when = to.ref_time.add_seconds(1000.0);
        let fwd = to.offset_seconds(TimeSystem::Gps, TimeSystem::Utc, &when).unwrap();
        assert!((fwd - (18.0 + 1e-9 + 1e-11)).abs() < 1e-12);
        let rev = to.offset_seconds(TimeSystem::Utc, TimeSystem::Gps, &when).unwrap();
        assert_eq!(rev, -fwd);
        assert!(to.offset_seconds(TimeSystem::Gal, TimeSystem::Utc, &when).is_none());
    }

    #[test]
    fn test_validate_tot_range() {
        let mut to = gps_utc();
        assert!(to.validate());
        to.tot = 604_800.0;
        assert!(!to.validate());
    }
}

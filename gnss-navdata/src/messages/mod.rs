//! Decoded navigation messages
//!
//! A [`NavMessage`] is immutable once built: shared fields (transmit time
//! stamp, message identity) plus a [`NavMessageBody`] carrying one variant
//! per message kind. Code that needs kind-specific behavior matches on the
//! body instead of probing types.

mod alm;
mod eph;
mod health;
mod iono;
mod time_offset;

pub use alm::CNav2Alm;
pub use eph::CNav2Eph;
pub use health::{GalDataValid, GalHealthStatus, HealthData};
pub use iono::IonoData;
pub use time_offset::TimeOffsetData;

use crate::time::NavTime;
use crate::types::{DumpDetail, NavMessageId, NavMessageType, NavSatelliteId, SvHealth};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

/// Shared handle to a stored message
pub type NavDataPtr = Arc<NavMessage>;

/// Kind-specific message content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NavMessageBody {
    Ephemeris(CNav2Eph),
    Almanac(CNav2Alm),
    Health(HealthData),
    TimeOffset(TimeOffsetData),
    Iono(IonoData),
}

impl NavMessageBody {
    pub fn kind(&self) -> NavMessageType {
        match self {
            NavMessageBody::Ephemeris(_) => NavMessageType::Ephemeris,
            NavMessageBody::Almanac(_) => NavMessageType::Almanac,
            NavMessageBody::Health(_) => NavMessageType::Health,
            NavMessageBody::TimeOffset(_) => NavMessageType::TimeOffset,
            NavMessageBody::Iono(_) => NavMessageType::Iono,
        }
    }
}

/// A decoded navigation message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavMessage {
    time_stamp: NavTime,
    signal: NavMessageId,
    body: NavMessageBody,
}

impl NavMessage {
    /// Build a message; its kind is taken from the body
    pub fn new(time_stamp: NavTime, sat: NavSatelliteId, body: NavMessageBody) -> Self {
        Self {
            time_stamp,
            signal: NavMessageId::new(body.kind(), sat),
            body,
        }
    }

    /// Transmit time of the message
    pub fn time_stamp(&self) -> NavTime {
        self.time_stamp
    }

    pub fn signal(&self) -> &NavMessageId {
        &self.signal
    }

    pub fn kind(&self) -> NavMessageType {
        self.signal.kind
    }

    pub fn body(&self) -> &NavMessageBody {
        &self.body
    }

    /// Self-consistency check of the message content
    pub fn validate(&self) -> bool {
        match &self.body {
            NavMessageBody::Ephemeris(eph) => eph.validate(),
            NavMessageBody::Almanac(alm) => alm.validate(),
            NavMessageBody::Health(_) => true,
            NavMessageBody::TimeOffset(to) => to.validate(),
            NavMessageBody::Iono(iono) => iono.validate(),
        }
    }

    /// Reference epoch used by nearest-epoch searches
    pub fn nearest_epoch(&self) -> NavTime {
        match &self.body {
            NavMessageBody::Ephemeris(eph) => eph.toe,
            NavMessageBody::Almanac(alm) => alm.toe,
            NavMessageBody::TimeOffset(to) => to.ref_time,
            NavMessageBody::Health(_) | NavMessageBody::Iono(_) => self.time_stamp,
        }
    }

    /// Earliest and latest time this message applies to
    pub fn applicable_span(&self) -> (NavTime, NavTime) {
        match &self.body {
            NavMessageBody::Ephemeris(eph) => (eph.begin_fit, eph.end_fit),
            NavMessageBody::Almanac(alm) => (alm.begin_fit, alm.end_fit),
            _ => (self.time_stamp, self.time_stamp),
        }
    }

    /// Health state reported by a Health message, `None` for other kinds
    pub fn health(&self) -> Option<SvHealth> {
        match &self.body {
            NavMessageBody::Health(hea) => Some(hea.health()),
            _ => None,
        }
    }

    pub fn as_time_offset(&self) -> Option<&TimeOffsetData> {
        match &self.body {
            NavMessageBody::TimeOffset(to) => Some(to),
            _ => None,
        }
    }

    /// Print the message in human-readable form
    pub fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        match detail {
            DumpDetail::OneLine => writeln!(out, "{}  {}", self.time_stamp, self.signal),
            DumpDetail::Brief | DumpDetail::Full => {
                writeln!(out, "****************************************************************")?;
                let status = if self.validate() { "valid" } else { "INVALID" };
                writeln!(out, "{} ({})", self.kind(), status)?;
                writeln!(out, "  Transmitted:  {}", self.time_stamp)?;
                writeln!(out, "  Subject:      {}", self.signal.sat.sat)?;
                writeln!(out, "  Transmitter:  {}", self.signal.sat.xmit_sat)?;
                writeln!(out, "  Signal:       {}", self.signal.sat.signal)?;
                match &self.body {
                    NavMessageBody::Ephemeris(eph) => eph.dump(out, detail),
                    NavMessageBody::Almanac(alm) => alm.dump(out, detail),
                    NavMessageBody::Health(hea) => hea.dump(out),
                    NavMessageBody::TimeOffset(to) => to.dump(out, detail),
                    NavMessageBody::Iono(iono) => iono.dump(out),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeSystem;
    use crate::types::{CarrierBand, NavSignalId, NavType, SatId, SatelliteSystem, TrackingCode};

    fn sat() -> NavSatelliteId {
        NavSatelliteId::own(
            SatId::new(7, SatelliteSystem::Gps),
            NavSignalId::new(
                SatelliteSystem::Gps,
                CarrierBand::L1,
                TrackingCode::L1CD,
                NavType::GpsCNav2,
            ),
        )
    }

    #[test]
    fn test_kind_follows_body() {
        let t = NavTime::from_seconds(TimeSystem::Gps, 1000.0);
        let msg = NavMessage::new(
            t,
            sat(),
            NavMessageBody::Health(HealthData::GpsCNav2 {
                unhealthy: true,
                is_eph: true,
            }),
        );
        assert_eq!(msg.kind(), NavMessageType::Health);
        assert_eq!(msg.health(), Some(SvHealth::Unhealthy));
        assert_eq!(msg.nearest_epoch(), t);
        assert_eq!(msg.applicable_span(), (t, t));
        assert!(msg.validate());
        assert!(msg.as_time_offset().is_none());
    }

    #[test]
    fn test_dump_one_line() {
        let msg = NavMessage::new(
            NavTime::from_week_second(TimeSystem::Gps, 2200, 0.0),
            sat(),
            NavMessageBody::Iono(IonoData::default()),
        );
        let mut out = Vec::new();
        msg.dump(&mut out, DumpDetail::OneLine).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Iono"));
        assert!(text.contains("GPS 7"));
        assert_eq!(text.lines().count(), 1);
    }
}

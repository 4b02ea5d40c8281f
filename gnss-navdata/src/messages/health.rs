//! Satellite health messages

use crate::types::SvHealth;
use serde::Serialize;
use std::io::{self, Write};

/// Galileo signal health status (SHS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GalHealthStatus {
    Ok,
    OutOfService,
    WillBeOutOfService,
    InTest,
    Unknown,
}

impl GalHealthStatus {
    /// Map the two transmitted SHS bits
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            0 => GalHealthStatus::Ok,
            1 => GalHealthStatus::OutOfService,
            2 => GalHealthStatus::WillBeOutOfService,
            3 => GalHealthStatus::InTest,
            _ => GalHealthStatus::Unknown,
        }
    }
}

/// Galileo data validity status (DVS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GalDataValid {
    Valid,
    NoGuarantee,
    Unknown,
}

impl GalDataValid {
    pub fn from_bit(bit: u8) -> Self {
        match bit {
            0 => GalDataValid::Valid,
            1 => GalDataValid::NoGuarantee,
            _ => GalDataValid::Unknown,
        }
    }
}

/// Health content, one variant per signal family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HealthData {
    /// GPS/QZSS CNAV-2 single health bit
    GpsCNav2 {
        unhealthy: bool,
        /// Bit came from the ephemeris rather than the almanac
        is_eph: bool,
    },
    /// Galileo F/NAV combined signal health and data validity
    GalFNav {
        sig_health_status: GalHealthStatus,
        data_validity: GalDataValid,
        /// SISA index, 255 means "no accuracy prediction available"
        sisa_index: u8,
    },
}

impl HealthData {
    const SISA_NAPA: u8 = 255;

    /// Rolled-up health of the subject satellite
    pub fn health(&self) -> SvHealth {
        match self {
            HealthData::GpsCNav2 { unhealthy, .. } => {
                if *unhealthy {
                    SvHealth::Unhealthy
                } else {
                    SvHealth::Healthy
                }
            }
            HealthData::GalFNav {
                sig_health_status,
                data_validity,
                sisa_index,
            } => match sig_health_status {
                GalHealthStatus::Ok => {
                    if *data_validity == GalDataValid::Valid && *sisa_index != Self::SISA_NAPA {
                        SvHealth::Healthy
                    } else {
                        SvHealth::Degraded
                    }
                }
                GalHealthStatus::WillBeOutOfService => SvHealth::Degraded,
                GalHealthStatus::OutOfService | GalHealthStatus::InTest => SvHealth::Unhealthy,
                GalHealthStatus::Unknown => SvHealth::Unknown,
            },
        }
    }

    pub(crate) fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            HealthData::GpsCNav2 { unhealthy, is_eph } => writeln!(
                out,
                "  Health bit:   {} ({}) from {}",
                *unhealthy as u8,
                self.health(),
                if *is_eph { "ephemeris" } else { "almanac" }
            ),
            HealthData::GalFNav {
                sig_health_status,
                data_validity,
                sisa_index,
            } => writeln!(
                out,
                "  SHS {:?}  DVS {:?}  SISA {}  => {}",
                sig_health_status,
                data_validity,
                sisa_index,
                self.health()
            ),
        }
    }
}

//! Core types for the navigation data library
//!
//! This module defines the identity taxonomy shared by the format decoders,
//! the message stores and the federation layer: which constellation, carrier,
//! tracking code and navigation message format a piece of data came from, and
//! which satellite it describes versus which satellite broadcast it.
//!
//! Most identity enums carry an `Any` variant. `Any` is a wildcard used by
//! queries; stored data is always fully specified.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors raised inside field extraction and configuration handling
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Field at bit {start} with length {length} exceeds frame of {available} bits")]
    BitRange {
        start: usize,
        length: usize,
        available: usize,
    },

    #[error("Field length {length} exceeds 64 bits")]
    FieldWidth { length: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Per-frame decode failure, produced at the format decoder boundary
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Frame nav type {found} is not handled by this decoder ({expected})")]
    WrongNavType { expected: NavType, found: NavType },

    #[error("Unsupported frame length: {0} bits")]
    UnsupportedLength(usize),

    #[error("Unknown target time system code: {0}")]
    UnknownTargetSystem(u8),

    #[error("Decode fault: {0}")]
    Fault(#[from] NavError),
}

/// Reason code attached to a [`DecodeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecodeReason {
    WrongNavType,
    UnsupportedLength,
    UnknownTargetSystem,
    Fault,
}

impl DecodeError {
    /// Get the reason code for this failure
    pub fn reason(&self) -> DecodeReason {
        match self {
            DecodeError::WrongNavType { .. } => DecodeReason::WrongNavType,
            DecodeError::UnsupportedLength(_) => DecodeReason::UnsupportedLength,
            DecodeError::UnknownTargetSystem(_) => DecodeReason::UnknownTargetSystem,
            DecodeError::Fault(_) => DecodeReason::Fault,
        }
    }

    /// True for an internal fault, false for an ordinary rejection
    pub fn is_fault(&self) -> bool {
        matches!(self, DecodeError::Fault(_))
    }
}

/// Errors returned when registering a store with the federation layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Store is not backed by a data source")]
    NotSourceBacked,

    #[error("A federation cannot be registered inside another federation")]
    NestedFederation,
}

/// Wildcard-aware equality used by identity matching
trait Wildcard: PartialEq + Copy {
    fn is_any(&self) -> bool;

    fn wild_eq(&self, other: &Self) -> bool {
        self.is_any() || other.is_any() || self == other
    }
}

/// GNSS constellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SatelliteSystem {
    Any,
    Gps,
    Galileo,
    Glonass,
    BeiDou,
    Qzss,
}

impl Wildcard for SatelliteSystem {
    fn is_any(&self) -> bool {
        *self == SatelliteSystem::Any
    }
}

impl fmt::Display for SatelliteSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatelliteSystem::Any => write!(f, "Any"),
            SatelliteSystem::Gps => write!(f, "GPS"),
            SatelliteSystem::Galileo => write!(f, "Galileo"),
            SatelliteSystem::Glonass => write!(f, "GLONASS"),
            SatelliteSystem::BeiDou => write!(f, "BeiDou"),
            SatelliteSystem::Qzss => write!(f, "QZSS"),
        }
    }
}

/// Carrier frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CarrierBand {
    Any,
    L1,
    L2,
    L5,
    E5a,
    E5b,
    E6,
}

impl Wildcard for CarrierBand {
    fn is_any(&self) -> bool {
        *self == CarrierBand::Any
    }
}

impl fmt::Display for CarrierBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ranging code tracked to obtain the navigation bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrackingCode {
    Any,
    CA,
    L1CD,
    L1CP,
    L2CM,
    L2CL,
    L5I,
    L5Q,
    E1B,
    E5aI,
    E5bI,
}

impl Wildcard for TrackingCode {
    fn is_any(&self) -> bool {
        *self == TrackingCode::Any
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Navigation message format (signal format tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NavType {
    Any,
    GpsLNav,
    GpsCNavL2,
    GpsCNavL5,
    GpsCNav2,
    GalINav,
    GalFNav,
}

impl Wildcard for NavType {
    fn is_any(&self) -> bool {
        *self == NavType::Any
    }
}

impl fmt::Display for NavType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavType::Any => write!(f, "Any"),
            NavType::GpsLNav => write!(f, "GPS_LNAV"),
            NavType::GpsCNavL2 => write!(f, "GPS_CNAV_L2"),
            NavType::GpsCNavL5 => write!(f, "GPS_CNAV_L5"),
            NavType::GpsCNav2 => write!(f, "GPS_CNAV2"),
            NavType::GalINav => write!(f, "GAL_INAV"),
            NavType::GalFNav => write!(f, "GAL_FNAV"),
        }
    }
}

/// Satellite identifier. A PRN of 0 matches any satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SatId {
    pub id: u32,
    pub system: SatelliteSystem,
}

impl SatId {
    pub const ANY_ID: u32 = 0;

    pub fn new(id: u32, system: SatelliteSystem) -> Self {
        Self { id, system }
    }

    /// Wildcard satellite within a constellation
    pub fn any(system: SatelliteSystem) -> Self {
        Self {
            id: Self::ANY_ID,
            system,
        }
    }

    pub fn matches(&self, other: &SatId) -> bool {
        (self.id == Self::ANY_ID || other.id == Self::ANY_ID || self.id == other.id)
            && self.system.wild_eq(&other.system)
    }
}

impl fmt::Display for SatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == Self::ANY_ID {
            write!(f, "{} *", self.system)
        } else {
            write!(f, "{} {}", self.system, self.id)
        }
    }
}

/// Carrier band and tracking code of an observed signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObsId {
    pub band: CarrierBand,
    pub code: TrackingCode,
}

impl ObsId {
    pub fn new(band: CarrierBand, code: TrackingCode) -> Self {
        Self { band, code }
    }

    pub fn matches(&self, other: &ObsId) -> bool {
        self.band.wild_eq(&other.band) && self.code.wild_eq(&other.code)
    }
}

/// Signal identity without any satellite: system, carrier, code and format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NavSignalId {
    pub system: SatelliteSystem,
    pub obs: ObsId,
    pub nav: NavType,
}

impl NavSignalId {
    pub fn new(
        system: SatelliteSystem,
        band: CarrierBand,
        code: TrackingCode,
        nav: NavType,
    ) -> Self {
        Self {
            system,
            obs: ObsId::new(band, code),
            nav,
        }
    }

    /// Signal that matches everything
    pub fn any() -> Self {
        Self::new(SatelliteSystem::Any, CarrierBand::Any, TrackingCode::Any, NavType::Any)
    }

    /// Compare two signals, treating `Any` fields on either side as matching
    pub fn matches(&self, other: &NavSignalId) -> bool {
        self.system.wild_eq(&other.system)
            && self.obs.matches(&other.obs)
            && self.nav.wild_eq(&other.nav)
    }
}

impl fmt::Display for NavSignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.system, self.obs.band, self.obs.code, self.nav)
    }
}

/// Full signal identity including subject and transmitting satellites
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NavSatelliteId {
    /// Satellite the data describes
    pub sat: SatId,
    /// Satellite that broadcast the data
    pub xmit_sat: SatId,
    pub signal: NavSignalId,
}

impl NavSatelliteId {
    pub fn new(sat: SatId, xmit_sat: SatId, signal: NavSignalId) -> Self {
        Self { sat, xmit_sat, signal }
    }

    /// Identity for data a satellite broadcasts about itself
    pub fn own(sat: SatId, signal: NavSignalId) -> Self {
        Self::new(sat, sat, signal)
    }

    pub fn matches(&self, other: &NavSatelliteId) -> bool {
        self.sat.matches(&other.sat)
            && self.xmit_sat.matches(&other.xmit_sat)
            && self.signal.matches(&other.signal)
    }
}

impl fmt::Display for NavSatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subj={} xmit={} {}", self.sat, self.xmit_sat, self.signal)
    }
}

/// Semantic category of a decoded message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NavMessageType {
    Ephemeris,
    Almanac,
    Health,
    TimeOffset,
    Iono,
}

impl NavMessageType {
    pub const ALL: [NavMessageType; 5] = [
        NavMessageType::Ephemeris,
        NavMessageType::Almanac,
        NavMessageType::Health,
        NavMessageType::TimeOffset,
        NavMessageType::Iono,
    ];
}

impl fmt::Display for NavMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Message identity: kind plus full signal identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NavMessageId {
    pub kind: NavMessageType,
    pub sat: NavSatelliteId,
}

impl NavMessageId {
    pub fn new(kind: NavMessageType, sat: NavSatelliteId) -> Self {
        Self { kind, sat }
    }
}

impl fmt::Display for NavMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.sat)
    }
}

/// Satellite health state. `Any` is only meaningful in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SvHealth {
    Any,
    Healthy,
    Unhealthy,
    Degraded,
    Unknown,
}

impl fmt::Display for SvHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which messages to accept according to their own self-consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavValidity {
    ValidOnly,
    InvalidOnly,
    Any,
}

impl NavValidity {
    pub fn accepts(&self, is_valid: bool) -> bool {
        match self {
            NavValidity::ValidOnly => is_valid,
            NavValidity::InvalidOnly => !is_valid,
            NavValidity::Any => true,
        }
    }
}

/// Search semantics for point queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavSearchOrder {
    /// Latest message transmitted at or before the query time
    Causal,
    /// Message whose own reference epoch is closest to the query time
    Nearest,
}

/// Level of detail for `dump` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DumpDetail {
    OneLine,
    Brief,
    Full,
}

/// Classification of a store, used by the federation layer at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKind {
    /// In-memory store with no data source
    Plain,
    /// Store that can load itself from a data source
    SourceBacked,
    /// Federation of other stores
    Federation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnav2_l1() -> NavSignalId {
        NavSignalId::new(
            SatelliteSystem::Gps,
            CarrierBand::L1,
            TrackingCode::L1CD,
            NavType::GpsCNav2,
        )
    }

    #[test]
    fn test_signal_wildcards() {
        let sig = cnav2_l1();
        assert!(sig.matches(&NavSignalId::any()));
        assert!(NavSignalId::any().matches(&sig));

        let mut l2 = sig;
        l2.obs = ObsId::new(CarrierBand::L2, TrackingCode::L2CM);
        assert!(!sig.matches(&l2));

        let mut any_code = l2;
        any_code.obs.code = TrackingCode::Any;
        any_code.obs.band = CarrierBand::Any;
        assert!(sig.matches(&any_code));
    }

    #[test]
    fn test_satellite_wildcards() {
        let g5 = SatId::new(5, SatelliteSystem::Gps);
        assert!(g5.matches(&SatId::any(SatelliteSystem::Gps)));
        assert!(!g5.matches(&SatId::new(6, SatelliteSystem::Gps)));
        assert!(!g5.matches(&SatId::new(5, SatelliteSystem::Qzss)));
        assert!(g5.matches(&SatId::any(SatelliteSystem::Any)));
    }

    #[test]
    fn test_decode_reason_codes() {
        assert_eq!(DecodeError::UnsupportedLength(12).reason(), DecodeReason::UnsupportedLength);
        let fault = DecodeError::from(NavError::FieldWidth { length: 70 });
        assert_eq!(fault.reason(), DecodeReason::Fault);
        assert!(fault.is_fault());
        assert!(!DecodeError::UnknownTargetSystem(7).is_fault());
    }

    #[test]
    fn test_validity_accepts() {
        assert!(NavValidity::ValidOnly.accepts(true));
        assert!(!NavValidity::ValidOnly.accepts(false));
        assert!(NavValidity::InvalidOnly.accepts(false));
        assert!(NavValidity::Any.accepts(false));
    }
}

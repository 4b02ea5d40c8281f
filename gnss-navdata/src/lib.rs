//! GNSS Navigation Data Library
//!
//! Decodes raw GNSS navigation frames into typed messages, keeps them in
//! time-indexed stores and answers "which message applies at time T"
//! queries across stores of different formats.
//!
//! # Architecture
//!
//! - [`field_decoder`] extracts scaled physical values from frame bits
//! - [`formats`] turns one frame of a given format into messages
//! - [`store`] indexes messages by kind, satellite/signal and time
//! - [`multi_format`] federates several stores behind one query surface
//!
//! The library does NOT:
//! - Read receiver or file formats (frames arrive as [`PackedNavBits`])
//! - Evaluate orbits or clocks from the decoded messages
//! - Install a logger (it logs through the `log` facade)
//!
//! # Example Usage
//!
//! ```no_run
//! use gnss_navdata::{
//!     CNav2Decoder, MultiFormatNavDataFactory, NavConfig, NavDataFactory, NavMessageId,
//!     NavMessageType, NavSatelliteId, NavSearchOrder, NavSignalId, NavTime, NavValidity,
//!     PackedNavBits, PnbNavStore, SatId, SatelliteSystem, SvHealth, TimeSystem,
//! };
//! use std::cell::RefCell;
//! use std::path::Path;
//! use std::rc::Rc;
//!
//! let config = NavConfig::load(Path::new("nav.toml")).unwrap();
//! let store = Rc::new(RefCell::new(PnbNavStore::with_config(CNav2Decoder::new(), &config)));
//!
//! let mut fed = MultiFormatNavDataFactory::new();
//! fed.add_factory(store).unwrap();
//!
//! let frames: Vec<PackedNavBits> = Vec::new(); // supplied by a receiver reader
//! fed.add_data_source(&frames);
//!
//! let nmid = NavMessageId::new(
//!     NavMessageType::Ephemeris,
//!     NavSatelliteId::own(SatId::new(12, SatelliteSystem::Gps), NavSignalId::any()),
//! );
//! let when = NavTime::from_week_second(TimeSystem::Gps, 2200, 7200.0);
//! let found = fed.find(
//!     &nmid,
//!     &when,
//!     SvHealth::Healthy,
//!     NavValidity::ValidOnly,
//!     NavSearchOrder::Causal,
//! );
//! if let Some(eph) = found {
//!     println!("Using ephemeris transmitted at {}", eph.time_stamp());
//! }
//! ```

// Public modules
pub mod config;
pub mod field_decoder;
pub mod formats;
pub mod frame;
pub mod messages;
pub mod multi_format;
pub mod store;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use config::NavConfig;
pub use field_decoder::{FieldDecoder, FieldDefinition, Scale, ValueType};
pub use formats::{CNav2Decoder, FormatDecoder};
pub use frame::PackedNavBits;
pub use messages::{NavDataPtr, NavMessage, NavMessageBody};
pub use multi_format::{MultiFormatNavDataFactory, NavDataFactoryPtr};
pub use store::{DecodeStats, NavDataFactory, NavDataStore, PnbNavStore};
pub use time::{NavTime, TimeSystem};
pub use types::{
    CarrierBand, DecodeError, DecodeReason, DumpDetail, FactoryKind, NavError, NavMessageId,
    NavMessageType, NavSatelliteId, NavSearchOrder, NavSignalId, NavType, NavValidity, ObsId,
    RegistrationError, Result, SatId, SatelliteSystem, SvHealth, TrackingCode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

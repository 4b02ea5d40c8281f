//! Navigation message stores
//!
//! [`NavDataFactory`] is the query surface shared by every store and by the
//! federation layer. [`NavDataStore`] is the plain in-memory store and
//! [`PnbNavStore`] pairs one with a format decoder so it can load itself
//! from raw frames.

mod memory;
mod pnb;

pub use memory::NavDataStore;
pub use pnb::{DecodeStats, PnbNavStore};

use crate::config::NavConfig;
use crate::frame::PackedNavBits;
use crate::messages::NavDataPtr;
use crate::time::{NavTime, TimeSystem};
use crate::types::{
    DumpDetail, FactoryKind, NavMessageId, NavMessageType, NavSatelliteId, NavSearchOrder,
    NavSignalId, NavValidity, SvHealth,
};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Query and maintenance interface of a navigation message store
pub trait NavDataFactory {
    /// How the federation layer should treat this store
    fn kind(&self) -> FactoryKind {
        FactoryKind::Plain
    }

    /// Find the message matching `nmid` that applies at `when`
    ///
    /// With [`NavSearchOrder::Causal`] the result is the latest message
    /// transmitted at or before `when`. With [`NavSearchOrder::Nearest`] it
    /// is the message whose reference epoch is closest to `when`.
    fn find(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
        order: NavSearchOrder,
    ) -> Option<NavDataPtr>;

    /// Find the latest time offset message converting `from` to `to` at `when`
    fn get_offset(
        &self,
        from: TimeSystem,
        to: TimeSystem,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr>;

    /// Remove messages with time stamps in `[from, to)`
    fn edit(&mut self, from: &NavTime, to: &NavTime);

    /// Remove messages whose satellite identity matches `satellite` with
    /// time stamps in `[from, to)`
    fn edit_satellite(&mut self, from: &NavTime, to: &NavTime, satellite: &NavSatelliteId);

    /// Remove messages received on a signal matching `signal` with time
    /// stamps in `[from, to)`
    fn edit_signal(&mut self, from: &NavTime, to: &NavTime, signal: &NavSignalId);

    fn clear(&mut self);

    /// Earliest time covered by the stored data
    fn initial_time(&self) -> NavTime;

    /// Latest time covered by the stored data
    fn final_time(&self) -> NavTime;

    /// Satellites with messages (of `kind`, if given) in `[from, to)`
    fn available_sats(
        &self,
        kind: Option<NavMessageType>,
        from: &NavTime,
        to: &NavTime,
    ) -> BTreeSet<NavSatelliteId>;

    /// Message identities with data in `[from, to)`
    fn available_msgs(&self, from: &NavTime, to: &NavTime) -> BTreeSet<NavMessageId>;

    /// True if any message matching `nmid` has a time stamp in `[from, to)`
    fn is_present(&self, nmid: &NavMessageId, from: &NavTime, to: &NavTime) -> bool;

    /// Number of stored messages
    fn size(&self) -> usize;

    /// Distinct signals present in the store
    fn signals(&self) -> BTreeSet<NavSignalId>;

    /// Distinct satellite/signal combinations present in the store
    fn satellites(&self) -> BTreeSet<NavSatelliteId>;

    fn num_signals(&self) -> usize {
        self.signals().len()
    }

    fn num_satellites(&self) -> usize {
        self.satellites().len()
    }

    /// Restrict which messages are kept when loading
    fn set_validity_filter(&mut self, validity: NavValidity);

    /// Restrict which message kinds are kept when loading
    fn set_type_filter(&mut self, types: &BTreeSet<NavMessageType>);

    /// Apply the filters of a configuration
    fn configure(&mut self, config: &NavConfig) {
        self.set_validity_filter(config.validity);
        self.set_type_filter(&config.types);
    }

    fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()>;

    /// Signals this store can produce data for
    fn supported_signals(&self) -> Vec<NavSignalId>;

    /// Human readable list of supported formats
    fn factory_formats(&self) -> String;

    /// Load messages from a sequence of raw frames
    ///
    /// Returns false if the store does not handle this kind of source.
    fn add_data_source(&mut self, _source: &[PackedNavBits]) -> bool {
        false
    }
}

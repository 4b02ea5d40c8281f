//! Store that loads itself from raw navigation frames

use super::{NavDataFactory, NavDataStore};
use crate::config::{toggles_for_types, NavConfig};
use crate::formats::FormatDecoder;
use crate::frame::PackedNavBits;
use crate::messages::{NavDataPtr, NavMessage};
use crate::time::{NavTime, TimeSystem};
use crate::types::{
    DumpDetail, FactoryKind, NavMessageId, NavMessageType, NavSatelliteId, NavSearchOrder,
    NavSignalId, NavValidity, SvHealth,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Counters kept while loading frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Frames offered to the decoder
    pub frames: usize,
    /// Frames rejected as not decodable
    pub rejected: usize,
    /// Frames dropped after an internal decode fault
    pub faults: usize,
    /// Messages kept after filtering
    pub messages: usize,
}

/// Message store fed by a format decoder
pub struct PnbNavStore<D: FormatDecoder> {
    decoder: D,
    store: NavDataStore,
    stats: DecodeStats,
}

impl<D: FormatDecoder> PnbNavStore<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            store: NavDataStore::new(),
            stats: DecodeStats::default(),
        }
    }

    /// Create a store with filters and decoder toggles taken from `config`
    pub fn with_config(decoder: D, config: &NavConfig) -> Self {
        let mut store = Self::new(decoder);
        store.configure(config);
        store
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Underlying message store
    pub fn store(&self) -> &NavDataStore {
        &self.store
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Decode one frame and store the resulting messages
    ///
    /// Returns false if the frame was rejected or faulted.
    pub fn add_frame(&mut self, frame: &PackedNavBits) -> bool {
        self.stats.frames += 1;
        match self.decoder.decode(frame) {
            Ok(messages) => {
                for msg in messages {
                    self.add_message(msg);
                }
                true
            }
            Err(err) => {
                if err.is_fault() {
                    self.stats.faults += 1;
                } else {
                    self.stats.rejected += 1;
                }
                false
            }
        }
    }

    /// Store an already decoded message, subject to the filters
    pub fn add_message(&mut self, msg: NavMessage) -> bool {
        let kept = self.store.add_filtered(msg);
        if kept {
            self.stats.messages += 1;
        }
        kept
    }
}

impl<D: FormatDecoder> NavDataFactory for PnbNavStore<D> {
    fn kind(&self) -> FactoryKind {
        FactoryKind::SourceBacked
    }

    fn find(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
        order: NavSearchOrder,
    ) -> Option<NavDataPtr> {
        self.store.find(nmid, when, health, validity, order)
    }

    fn get_offset(
        &self,
        from: TimeSystem,
        to: TimeSystem,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr> {
        self.store.get_offset(from, to, when, health, validity)
    }

    fn edit(&mut self, from: &NavTime, to: &NavTime) {
        self.store.edit(from, to);
    }

    fn edit_satellite(&mut self, from: &NavTime, to: &NavTime, satellite: &NavSatelliteId) {
        self.store.edit_satellite(from, to, satellite);
    }

    fn edit_signal(&mut self, from: &NavTime, to: &NavTime, signal: &NavSignalId) {
        self.store.edit_signal(from, to, signal);
    }

    fn clear(&mut self) {
        log::debug!(
            "Clearing {} store ({} messages)",
            self.decoder.format_name(),
            self.store.size()
        );
        self.store.clear();
    }

    fn initial_time(&self) -> NavTime {
        self.store.initial_time()
    }

    fn final_time(&self) -> NavTime {
        self.store.final_time()
    }

    fn available_sats(
        &self,
        kind: Option<NavMessageType>,
        from: &NavTime,
        to: &NavTime,
    ) -> BTreeSet<NavSatelliteId> {
        self.store.available_sats(kind, from, to)
    }

    fn available_msgs(&self, from: &NavTime, to: &NavTime) -> BTreeSet<NavMessageId> {
        self.store.available_msgs(from, to)
    }

    fn is_present(&self, nmid: &NavMessageId, from: &NavTime, to: &NavTime) -> bool {
        self.store.is_present(nmid, from, to)
    }

    fn size(&self) -> usize {
        self.store.size()
    }

    fn signals(&self) -> BTreeSet<NavSignalId> {
        self.store.signals()
    }

    fn satellites(&self) -> BTreeSet<NavSatelliteId> {
        self.store.satellites()
    }

    fn set_validity_filter(&mut self, validity: NavValidity) {
        self.store.set_validity_filter(validity);
    }

    /// Also switches the decoder toggles to the kinds that can pass the filter
    fn set_type_filter(&mut self, types: &BTreeSet<NavMessageType>) {
        self.store.set_type_filter(types);
        let (eph, alm) = toggles_for_types(types);
        self.decoder.set_process(eph, alm);
    }

    fn configure(&mut self, config: &NavConfig) {
        self.store.set_validity_filter(config.validity);
        self.store.set_type_filter(&config.types);
        let (eph, alm) = config.effective_toggles();
        self.decoder.set_process(eph, alm);
    }

    fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        writeln!(out, "Format: {}", self.decoder.format_name())?;
        self.store.dump(out, detail)
    }

    fn supported_signals(&self) -> Vec<NavSignalId> {
        self.decoder.supported_signals()
    }

    fn factory_formats(&self) -> String {
        self.decoder.format_name().to_string()
    }

    fn add_data_source(&mut self, source: &[PackedNavBits]) -> bool {
        let Some(first) = source.first() else {
            return false;
        };
        if !self.decoder.handles(first.nav()) {
            log::debug!("{} does not handle {} frames", self.decoder.format_name(), first.nav());
            return false;
        }

        log::info!("Loading {} {} frames", source.len(), self.decoder.format_name());
        let before = self.stats;
        for frame in source {
            self.add_frame(frame);
        }
        log::info!(
            "Loaded {} messages ({} rejected, {} faults)",
            self.stats.messages - before.messages,
            self.stats.rejected - before.rejected,
            self.stats.faults - before.faults
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_decoder::FieldDecoder;
    use crate::formats::cnav2::{sf3, utc, PAGE_UTC_IONO, SF3_BITS};
    use crate::formats::CNav2Decoder;
    use crate::types::{CarrierBand, NavType, ObsId, SatId, SatelliteSystem, TrackingCode};

    fn utc_page(prn: u32, sow: f64) -> PackedNavBits {
        let mut frame = PackedNavBits::zeroed(
            SatId::new(prn, SatelliteSystem::Gps),
            ObsId::new(CarrierBand::L1, TrackingCode::L1CD),
            NavType::GpsCNav2,
            NavTime::from_week_second(TimeSystem::Gps, 2200, sow),
            SF3_BITS,
        );
        FieldDecoder::encode(&mut frame, &sf3::PRN, prn as f64).unwrap();
        FieldDecoder::encode(&mut frame, &sf3::PAGE, PAGE_UTC_IONO as f64).unwrap();
        FieldDecoder::encode(&mut frame, &utc::WNOT, 2200.0).unwrap();
        FieldDecoder::encode(&mut frame, &utc::DT_LS, 18.0).unwrap();
        frame
    }

    #[test]
    fn test_load_counts_frames() {
        let mut store = PnbNavStore::new(CNav2Decoder::new());
        let full = utc_page(3, 60.0);
        let short = PackedNavBits::from_bytes(
            full.sat(),
            full.obs(),
            full.nav(),
            full.transmit_time(),
            100,
            full.data(),
        );

        let source = vec![utc_page(3, 0.0), short, utc_page(3, 120.0)];
        assert!(store.add_data_source(&source));

        let stats = store.stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.faults, 0);
        // Time offset plus iono per UTC page
        assert_eq!(stats.messages, 4);
        assert_eq!(store.size(), 4);
        assert_eq!(store.kind(), FactoryKind::SourceBacked);
    }

    #[test]
    fn test_source_with_other_nav_type_refused() {
        let mut store = PnbNavStore::new(CNav2Decoder::new());
        let frame = PackedNavBits::zeroed(
            SatId::new(3, SatelliteSystem::Gps),
            ObsId::new(CarrierBand::L1, TrackingCode::CA),
            NavType::GpsLNav,
            NavTime::from_week_second(TimeSystem::Gps, 2200, 0.0),
            300,
        );
        assert!(!store.add_data_source(&[frame]));
        assert!(!store.add_data_source(&[]));
        assert_eq!(store.stats(), DecodeStats::default());
    }

    #[test]
    fn test_type_filter_sets_decoder_toggles() {
        let mut store = PnbNavStore::new(CNav2Decoder::new());
        store.set_type_filter(&[NavMessageType::Ephemeris].into_iter().collect());
        assert!(store.decoder().process_eph());
        assert!(!store.decoder().process_alm());

        assert!(store.add_frame(&utc_page(3, 0.0)));
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_config_filters_kinds() {
        let config = NavConfig::new().with_types([NavMessageType::TimeOffset]);
        let mut store = PnbNavStore::with_config(CNav2Decoder::new(), &config);
        assert!(store.decoder().process_alm());

        store.add_frame(&utc_page(3, 0.0));
        assert_eq!(store.size(), 1);
        let offset = store
            .get_offset(
                TimeSystem::Gps,
                TimeSystem::Utc,
                &NavTime::from_week_second(TimeSystem::Gps, 2200, 10.0),
                SvHealth::Any,
                NavValidity::ValidOnly,
            )
            .unwrap();
        assert_eq!(offset.as_time_offset().unwrap().delta_t_ls, 18.0);
    }
}

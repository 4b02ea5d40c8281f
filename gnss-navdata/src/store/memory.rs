//! In-memory message store

use super::NavDataFactory;
use crate::messages::{NavDataPtr, NavMessage};
use crate::time::{NavTime, TimeSystem};
use crate::types::{
    DumpDetail, NavMessageId, NavMessageType, NavSatelliteId, NavSearchOrder, NavSignalId,
    NavValidity, SvHealth,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

type TimeMap = BTreeMap<NavTime, NavDataPtr>;
type SatMap = BTreeMap<NavSatelliteId, TimeMap>;
type OffsetEpochs = BTreeMap<NavTime, BTreeMap<NavSatelliteId, NavDataPtr>>;

/// Time-indexed store of decoded messages
///
/// Messages are indexed by kind, then full satellite/signal identity, then
/// transmit time. Time offset messages are also indexed by conversion pair
/// in both directions.
pub struct NavDataStore {
    data: BTreeMap<NavMessageType, SatMap>,
    offsets: BTreeMap<(TimeSystem, TimeSystem), OffsetEpochs>,
    initial: NavTime,
    final_: NavTime,
    validity: NavValidity,
    types: BTreeSet<NavMessageType>,
}

impl NavDataStore {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            offsets: BTreeMap::new(),
            initial: NavTime::END_OF_TIME,
            final_: NavTime::BEGINNING_OF_TIME,
            validity: NavValidity::ValidOnly,
            types: NavMessageType::ALL.into_iter().collect(),
        }
    }

    /// Insert a message unconditionally
    ///
    /// A message with the same identity and time stamp as a stored one
    /// replaces it.
    pub fn add(&mut self, msg: NavMessage) -> NavDataPtr {
        let ptr = Arc::new(msg);
        let ts = ptr.time_stamp();
        let sat = ptr.signal().sat;

        let (begin, end) = ptr.applicable_span();
        self.initial = self.initial.min(begin);
        self.final_ = self.final_.max(end);

        if let Some(offset) = ptr.as_time_offset() {
            for pair in offset.conversion_pairs() {
                self.offsets
                    .entry(pair)
                    .or_default()
                    .entry(ts)
                    .or_default()
                    .insert(sat, Arc::clone(&ptr));
            }
        }

        let replaced = self
            .data
            .entry(ptr.kind())
            .or_default()
            .entry(sat)
            .or_default()
            .insert(ts, Arc::clone(&ptr));
        if replaced.is_some() {
            log::trace!("Replaced {} at {}", ptr.signal(), ts);
        }
        ptr
    }

    /// Insert a message if it passes the type and validity filters
    pub fn add_filtered(&mut self, msg: NavMessage) -> bool {
        if !self.types.contains(&msg.kind()) {
            log::trace!("Type filter dropped {}", msg.signal());
            return false;
        }
        if !self.validity.accepts(msg.validate()) {
            log::warn!("Validity filter dropped {} at {}", msg.signal(), msg.time_stamp());
            return false;
        }
        self.add(msg);
        true
    }

    pub fn validity_filter(&self) -> NavValidity {
        self.validity
    }

    pub fn type_filter(&self) -> &BTreeSet<NavMessageType> {
        &self.types
    }

    fn matching<'a>(&'a self, nmid: &'a NavMessageId) -> impl Iterator<Item = &'a TimeMap> + 'a {
        self.data
            .get(&nmid.kind)
            .into_iter()
            .flat_map(|by_sat| by_sat.iter())
            .filter(move |(sat, _)| nmid.sat.matches(sat))
            .map(|(_, by_time)| by_time)
    }

    /// Validity and transmitter health checks shared by all searches
    fn passes(
        &self,
        msg: &NavMessage,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> bool {
        if !validity.accepts(msg.validate()) {
            return false;
        }
        if health == SvHealth::Any {
            return true;
        }

        let xmit = msg.signal().sat;
        let health_id = NavMessageId::new(
            NavMessageType::Health,
            NavSatelliteId::new(xmit.xmit_sat, xmit.xmit_sat, xmit.signal),
        );
        // No health message for the transmitter fails the filter
        self.find_causal(&health_id, when, SvHealth::Any, NavValidity::ValidOnly)
            .and_then(|hea| hea.health())
            == Some(health)
    }

    fn find_causal(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr> {
        let mut best: Option<&NavDataPtr> = None;
        for by_time in self.matching(nmid) {
            let candidate = by_time
                .range(..=*when)
                .rev()
                .map(|(_, msg)| msg)
                .find(|msg| self.passes(msg, when, health, validity));
            if let Some(msg) = candidate {
                if best.map_or(true, |b| msg.time_stamp() > b.time_stamp()) {
                    best = Some(msg);
                }
            }
        }
        best.cloned()
    }

    fn find_nearest(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr> {
        let mut best: Option<(f64, &NavDataPtr)> = None;
        for msg in self.matching(nmid).flat_map(|by_time| by_time.values()) {
            if !self.passes(msg, when, health, validity) {
                continue;
            }
            let distance = msg.nearest_epoch().diff_seconds(when).abs();
            // Strict comparison: on a tie the earlier entry wins
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, msg));
            }
        }
        best.map(|(_, msg)| Arc::clone(msg))
    }

    fn edit_where(
        &mut self,
        from: &NavTime,
        to: &NavTime,
        selected: impl Fn(&NavSatelliteId) -> bool,
    ) {
        let in_range = |t: &NavTime| from <= t && t < to;
        let before = self.size();

        for by_sat in self.data.values_mut() {
            for (sat, by_time) in by_sat.iter_mut() {
                if selected(sat) {
                    by_time.retain(|t, _| !in_range(t));
                }
            }
            by_sat.retain(|_, by_time| !by_time.is_empty());
        }
        self.data.retain(|_, by_sat| !by_sat.is_empty());

        for epochs in self.offsets.values_mut() {
            for (t, by_sat) in epochs.iter_mut() {
                if in_range(t) {
                    by_sat.retain(|sat, _| !selected(sat));
                }
            }
            epochs.retain(|_, by_sat| !by_sat.is_empty());
        }
        self.offsets.retain(|_, epochs| !epochs.is_empty());

        log::debug!("Edit [{}, {}) removed {} messages", from, to, before - self.size());
    }
}

impl Default for NavDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NavDataFactory for NavDataStore {
    fn find(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
        order: NavSearchOrder,
    ) -> Option<NavDataPtr> {
        match order {
            NavSearchOrder::Causal => self.find_causal(nmid, when, health, validity),
            NavSearchOrder::Nearest => self.find_nearest(nmid, when, health, validity),
        }
    }

    fn get_offset(
        &self,
        from: TimeSystem,
        to: TimeSystem,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr> {
        let epochs = self.offsets.get(&(from, to))?;
        epochs
            .range(..=*when)
            .rev()
            .flat_map(|(_, by_sat)| by_sat.values())
            .find(|msg| self.passes(msg, when, health, validity))
            .cloned()
    }

    fn edit(&mut self, from: &NavTime, to: &NavTime) {
        self.edit_where(from, to, |_| true);
    }

    fn edit_satellite(&mut self, from: &NavTime, to: &NavTime, satellite: &NavSatelliteId) {
        self.edit_where(from, to, |key| satellite.matches(key));
    }

    fn edit_signal(&mut self, from: &NavTime, to: &NavTime, signal: &NavSignalId) {
        self.edit_where(from, to, |key| signal.matches(&key.signal));
    }

    fn clear(&mut self) {
        self.data.clear();
        self.offsets.clear();
        self.initial = NavTime::END_OF_TIME;
        self.final_ = NavTime::BEGINNING_OF_TIME;
    }

    fn initial_time(&self) -> NavTime {
        self.initial
    }

    fn final_time(&self) -> NavTime {
        self.final_
    }

    fn available_sats(
        &self,
        kind: Option<NavMessageType>,
        from: &NavTime,
        to: &NavTime,
    ) -> BTreeSet<NavSatelliteId> {
        if from > to {
            return BTreeSet::new();
        }
        self.data
            .iter()
            .filter(|(k, _)| kind.map_or(true, |kind| kind == **k))
            .flat_map(|(_, by_sat)| by_sat.iter())
            .filter(|(_, by_time)| by_time.range(*from..*to).next().is_some())
            .map(|(sat, _)| *sat)
            .collect()
    }

    fn available_msgs(&self, from: &NavTime, to: &NavTime) -> BTreeSet<NavMessageId> {
        if from > to {
            return BTreeSet::new();
        }
        self.data
            .iter()
            .flat_map(|(kind, by_sat)| {
                by_sat.iter().map(move |(sat, by_time)| (*kind, sat, by_time))
            })
            .filter(|(_, _, by_time)| by_time.range(*from..*to).next().is_some())
            .map(|(kind, sat, _)| NavMessageId::new(kind, *sat))
            .collect()
    }

    fn is_present(&self, nmid: &NavMessageId, from: &NavTime, to: &NavTime) -> bool {
        from <= to && self.matching(nmid).any(|by_time| by_time.range(*from..*to).next().is_some())
    }

    fn size(&self) -> usize {
        self.data
            .values()
            .flat_map(|by_sat| by_sat.values())
            .map(|by_time| by_time.len())
            .sum()
    }

    fn signals(&self) -> BTreeSet<NavSignalId> {
        self.satellites().into_iter().map(|sat| sat.signal).collect()
    }

    fn satellites(&self) -> BTreeSet<NavSatelliteId> {
        self.data.values().flat_map(|by_sat| by_sat.keys().copied()).collect()
    }

    fn set_validity_filter(&mut self, validity: NavValidity) {
        self.validity = validity;
    }

    fn set_type_filter(&mut self, types: &BTreeSet<NavMessageType>) {
        self.types = types.clone();
    }

    fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        writeln!(
            out,
            "Store: {} messages, {} satellites, {} .. {}",
            self.size(),
            self.num_satellites(),
            self.initial,
            self.final_
        )?;
        let by_sat = self.data.values().flat_map(|by_sat| by_sat.values());
        for msg in by_sat.flat_map(|by_time| by_time.values()) {
            msg.dump(out, detail)?;
        }
        Ok(())
    }

    fn supported_signals(&self) -> Vec<NavSignalId> {
        Vec::new()
    }

    fn factory_formats(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{HealthData, IonoData, NavMessageBody, TimeOffsetData};
    use crate::types::{CarrierBand, FactoryKind, NavType, SatId, SatelliteSystem, TrackingCode};

    fn t(seconds: f64) -> NavTime {
        NavTime::from_seconds(TimeSystem::Gps, seconds)
    }

    fn l1c() -> NavSignalId {
        NavSignalId::new(
            SatelliteSystem::Gps,
            CarrierBand::L1,
            TrackingCode::L1CD,
            NavType::GpsCNav2,
        )
    }

    fn sat(prn: u32) -> NavSatelliteId {
        NavSatelliteId::own(SatId::new(prn, SatelliteSystem::Gps), l1c())
    }

    fn iono(prn: u32, ts: f64) -> NavMessage {
        NavMessage::new(t(ts), sat(prn), NavMessageBody::Iono(IonoData::default()))
    }

    fn health(prn: u32, ts: f64, unhealthy: bool) -> NavMessage {
        NavMessage::new(
            t(ts),
            sat(prn),
            NavMessageBody::Health(HealthData::GpsCNav2 {
                unhealthy,
                is_eph: false,
            }),
        )
    }

    fn offset(prn: u32, ts: f64, ref_time: f64) -> NavMessage {
        NavMessage::new(
            t(ts),
            sat(prn),
            NavMessageBody::TimeOffset(TimeOffsetData {
                src: TimeSystem::Gps,
                tgt: TimeSystem::Utc,
                a0: 0.0,
                a1: 0.0,
                a2: 0.0,
                delta_t_ls: 18.0,
                tot: 0.0,
                wnot: 0,
                wn_lsf: 0,
                dn: 0,
                delta_t_lsf: 18.0,
                ref_time: t(ref_time),
            }),
        )
    }

    fn iono_id(prn: u32) -> NavMessageId {
        NavMessageId::new(NavMessageType::Iono, sat(prn))
    }

    fn gps_to_utc(store: &NavDataStore, when: f64) -> Option<NavDataPtr> {
        store.get_offset(
            TimeSystem::Gps,
            TimeSystem::Utc,
            &t(when),
            SvHealth::Any,
            NavValidity::Any,
        )
    }

    fn find(
        store: &NavDataStore,
        nmid: &NavMessageId,
        when: f64,
        order: NavSearchOrder,
    ) -> Option<NavTime> {
        store
            .find(nmid, &t(when), SvHealth::Any, NavValidity::ValidOnly, order)
            .map(|msg| msg.time_stamp())
    }

    #[test]
    fn test_empty_store() {
        let store = NavDataStore::new();
        assert_eq!(store.kind(), FactoryKind::Plain);
        assert_eq!(store.size(), 0);
        assert_eq!(store.initial_time(), NavTime::END_OF_TIME);
        assert_eq!(store.final_time(), NavTime::BEGINNING_OF_TIME);
        assert!(find(&store, &iono_id(1), 100.0, NavSearchOrder::Causal).is_none());
    }

    #[test]
    fn test_causal_search() {
        let mut store = NavDataStore::new();
        for ts in [100.0, 200.0, 300.0] {
            store.add(iono(1, ts));
        }
        assert_eq!(find(&store, &iono_id(1), 250.0, NavSearchOrder::Causal), Some(t(200.0)));
        assert_eq!(find(&store, &iono_id(1), 200.0, NavSearchOrder::Causal), Some(t(200.0)));
        assert_eq!(find(&store, &iono_id(1), 50.0, NavSearchOrder::Causal), None);
        assert_eq!(find(&store, &iono_id(2), 250.0, NavSearchOrder::Causal), None);
    }

    #[test]
    fn test_causal_search_across_wildcard_satellites() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.add(iono(2, 150.0));
        let any = NavMessageId::new(
            NavMessageType::Iono,
            NavSatelliteId::own(SatId::any(SatelliteSystem::Gps), NavSignalId::any()),
        );
        assert_eq!(find(&store, &any, 200.0, NavSearchOrder::Causal), Some(t(150.0)));
        assert_eq!(find(&store, &any, 120.0, NavSearchOrder::Causal), Some(t(100.0)));
    }

    #[test]
    fn test_nearest_search_uses_reference_epoch() {
        let mut store = NavDataStore::new();
        // Transmit order is the reverse of epoch order
        store.add(offset(1, 10.0, 200.0));
        store.add(offset(1, 20.0, 100.0));
        let nmid = NavMessageId::new(NavMessageType::TimeOffset, sat(1));

        let nearest = |when| {
            let order = NavSearchOrder::Nearest;
            store
                .find(&nmid, &t(when), SvHealth::Any, NavValidity::ValidOnly, order)
                .map(|msg| msg.nearest_epoch())
        };
        assert_eq!(nearest(180.0), Some(t(200.0)));
        assert_eq!(nearest(120.0), Some(t(100.0)));
        assert_eq!(nearest(5000.0), Some(t(200.0)));
        // Equidistant: the first entry in time stamp order wins
        assert_eq!(nearest(150.0), Some(t(200.0)));
    }

    #[test]
    fn test_health_filter_fails_closed() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        let query = |store: &NavDataStore, health| {
            store.find(
                &iono_id(1),
                &t(150.0),
                health,
                NavValidity::ValidOnly,
                NavSearchOrder::Causal,
            )
        };

        assert!(query(&store, SvHealth::Any).is_some());
        assert!(query(&store, SvHealth::Healthy).is_none());
        assert!(query(&store, SvHealth::Unhealthy).is_none());

        store.add(health(1, 90.0, false));
        assert!(query(&store, SvHealth::Healthy).is_some());
        assert!(query(&store, SvHealth::Unhealthy).is_none());

        // Health transmitted after the query time does not apply
        store.add(health(1, 140.0, true));
        assert!(query(&store, SvHealth::Unhealthy).is_some());
        store.add(health(1, 200.0, false));
        assert!(query(&store, SvHealth::Unhealthy).is_some());
    }

    #[test]
    fn test_validity_query_modes() {
        let mut store = NavDataStore::new();
        let mut bad = IonoData::default();
        bad.alpha[0] = f64::NAN;
        store.add(NavMessage::new(t(100.0), sat(1), NavMessageBody::Iono(bad)));

        let query = |validity| {
            store.find(
                &iono_id(1),
                &t(150.0),
                SvHealth::Any,
                validity,
                NavSearchOrder::Causal,
            )
        };
        assert!(query(NavValidity::ValidOnly).is_none());
        assert!(query(NavValidity::InvalidOnly).is_some());
        assert!(query(NavValidity::Any).is_some());
    }

    #[test]
    fn test_duplicate_time_stamp_replaces() {
        let mut store = NavDataStore::new();
        store.add(offset(1, 100.0, 100.0));
        store.add(offset(1, 100.0, 150.0));
        assert_eq!(store.size(), 1);
        let found = gps_to_utc(&store, 100.0).unwrap();
        assert_eq!(found.nearest_epoch(), t(150.0));
    }

    #[test]
    fn test_get_offset_both_directions() {
        let mut store = NavDataStore::new();
        store.add(offset(1, 100.0, 100.0));
        store.add(offset(2, 300.0, 300.0));

        let lookup = |from, to, when| {
            store
                .get_offset(from, to, &t(when), SvHealth::Any, NavValidity::ValidOnly)
                .map(|msg| msg.time_stamp())
        };
        assert_eq!(lookup(TimeSystem::Gps, TimeSystem::Utc, 250.0), Some(t(100.0)));
        assert_eq!(lookup(TimeSystem::Utc, TimeSystem::Gps, 350.0), Some(t(300.0)));
        assert_eq!(lookup(TimeSystem::Gps, TimeSystem::Utc, 50.0), None);
        assert_eq!(lookup(TimeSystem::Gps, TimeSystem::Gal, 250.0), None);
    }

    #[test]
    fn test_edit_half_open_interval() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.add(iono(1, 200.0));
        store.add(offset(1, 150.0, 150.0));

        store.edit(&t(100.0), &t(200.0));
        assert_eq!(store.size(), 1);
        assert_eq!(find(&store, &iono_id(1), 1000.0, NavSearchOrder::Causal), Some(t(200.0)));
        assert_eq!(find(&store, &iono_id(1), 150.0, NavSearchOrder::Causal), None);
        assert!(gps_to_utc(&store, 1000.0).is_none());
    }

    #[test]
    fn test_edit_does_not_recompute_bounds() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.add(iono(1, 200.0));
        store.edit(&t(0.0), &t(1000.0));
        assert_eq!(store.size(), 0);
        assert_eq!(store.initial_time(), t(100.0));
        assert_eq!(store.final_time(), t(200.0));
    }

    #[test]
    fn test_edit_satellite_and_signal() {
        let mut store = NavDataStore::new();
        let l2c = NavSignalId::new(
            SatelliteSystem::Gps,
            CarrierBand::L2,
            TrackingCode::L2CM,
            NavType::GpsCNavL2,
        );
        let sat3_l2 = NavSatelliteId::own(SatId::new(3, SatelliteSystem::Gps), l2c);
        store.add(iono(1, 100.0));
        store.add(iono(2, 100.0));
        store.add(iono(3, 100.0));
        store.add(NavMessage::new(t(100.0), sat3_l2, NavMessageBody::Iono(IonoData::default())));

        store.edit_satellite(&t(0.0), &t(1000.0), &sat(1));
        assert_eq!(store.size(), 3);
        assert!(!store.is_present(&iono_id(1), &t(0.0), &t(1000.0)));

        // Every satellite on L1C, the L2 copy of PRN 3 survives
        store.edit_signal(&t(0.0), &t(1000.0), &l1c());
        assert_eq!(store.size(), 1);
        assert!(!store.is_present(&iono_id(3), &t(0.0), &t(1000.0)));
        let l2_iono = NavMessageId::new(NavMessageType::Iono, sat3_l2);
        assert!(store.is_present(&l2_iono, &t(0.0), &t(1000.0)));
    }

    #[test]
    fn test_clear_resets_bounds() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.clear();
        assert_eq!(store.size(), 0);
        assert_eq!(store.initial_time(), NavTime::END_OF_TIME);
        assert_eq!(store.final_time(), NavTime::BEGINNING_OF_TIME);
    }

    #[test]
    fn test_availability_queries() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.add(health(2, 200.0, false));

        let all = store.available_sats(None, &t(0.0), &t(1000.0));
        assert_eq!(all.len(), 2);
        let hea = store.available_sats(Some(NavMessageType::Health), &t(0.0), &t(1000.0));
        assert_eq!(hea.into_iter().collect::<Vec<_>>(), vec![sat(2)]);
        assert!(store.available_sats(None, &t(1000.0), &t(0.0)).is_empty());

        let msgs = store.available_msgs(&t(150.0), &t(1000.0));
        assert_eq!(msgs.len(), 1);
        assert!(!store.is_present(&iono_id(1), &t(101.0), &t(1000.0)));
        assert_eq!(store.num_signals(), 1);
        assert_eq!(store.num_satellites(), 2);
    }

    #[test]
    fn test_add_filtered() {
        let mut store = NavDataStore::new();
        store.set_type_filter(&[NavMessageType::Health].into_iter().collect());
        assert!(!store.add_filtered(iono(1, 100.0)));
        assert!(store.add_filtered(health(1, 100.0, true)));

        store.set_type_filter(&NavMessageType::ALL.into_iter().collect());
        let mut bad = IonoData::default();
        bad.beta[3] = f64::INFINITY;
        let bad = NavMessage::new(t(100.0), sat(1), NavMessageBody::Iono(bad));
        assert!(!store.add_filtered(bad.clone()));
        store.set_validity_filter(NavValidity::InvalidOnly);
        assert!(store.add_filtered(bad));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_dump_lists_messages() {
        let mut store = NavDataStore::new();
        store.add(iono(1, 100.0));
        store.add(iono(2, 100.0));
        let mut out = Vec::new();
        store.dump(&mut out, DumpDetail::OneLine).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Store: 2 messages"));
    }
}

//! Federation of per-format stores
//!
//! [`MultiFormatNavDataFactory`] presents several source-backed stores as
//! one [`NavDataFactory`]. Each store is registered once per signal it
//! supports, so one store can sit behind many registry rows. Queries visit
//! each store at most once and maintenance operations run once per distinct
//! store.

use crate::config::NavConfig;
use crate::frame::PackedNavBits;
use crate::messages::NavDataPtr;
use crate::store::NavDataFactory;
use crate::time::{NavTime, TimeSystem};
use crate::types::{
    DumpDetail, FactoryKind, NavMessageId, NavMessageType, NavSatelliteId, NavSearchOrder,
    NavSignalId, NavValidity, RegistrationError, SvHealth,
};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::io::{self, Write};
use std::rc::Rc;

/// Shared handle to a registered store
pub type NavDataFactoryPtr = Rc<RefCell<dyn NavDataFactory>>;

/// Identity of a store independent of the registry row it was reached by
fn store_key(store: &NavDataFactoryPtr) -> *const () {
    Rc::as_ptr(store) as *const ()
}

/// Bring two bounds into a common time system before comparing them
///
/// Whole-second precision only, good enough for availability checks.
fn comparable(a: NavTime, b: NavTime) -> (NavTime, NavTime) {
    let (sa, sb) = (a.system(), b.system());
    if sa != sb && sa != TimeSystem::Any && sb != TimeSystem::Any {
        (a.to_system_coarse(TimeSystem::Utc), b.to_system_coarse(TimeSystem::Utc))
    } else {
        (a, b)
    }
}

/// Caller-owned federation of navigation data stores
#[derive(Default)]
pub struct MultiFormatNavDataFactory {
    factories: Vec<(NavSignalId, NavDataFactoryPtr)>,
}

impl MultiFormatNavDataFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under every signal it supports
    ///
    /// Only source-backed stores are accepted. Registering the same store
    /// again adds no duplicate rows.
    pub fn add_factory(&mut self, store: NavDataFactoryPtr) -> Result<(), RegistrationError> {
        // A store that is already mutably borrowed is the federation being extended
        let (kind, signals, formats) = match store.try_borrow() {
            Ok(s) => (s.kind(), s.supported_signals(), s.factory_formats()),
            Err(_) => return Err(RegistrationError::NestedFederation),
        };
        match kind {
            FactoryKind::Plain => return Err(RegistrationError::NotSourceBacked),
            FactoryKind::Federation => return Err(RegistrationError::NestedFederation),
            FactoryKind::SourceBacked => {}
        }

        let key = store_key(&store);
        let mut added = 0;
        for signal in signals {
            let present = self
                .factories
                .iter()
                .any(|(sig, f)| *sig == signal && store_key(f) == key);
            if !present {
                self.factories.push((signal, Rc::clone(&store)));
                added += 1;
            }
        }
        log::info!("Registered {} store under {} signals", formats, added);
        Ok(())
    }

    /// Number of distinct registered stores
    pub fn store_count(&self) -> usize {
        self.distinct().len()
    }

    /// Registered stores in registry order, each listed once
    fn distinct(&self) -> Vec<&NavDataFactoryPtr> {
        let mut seen = HashSet::new();
        self.factories
            .iter()
            .map(|(_, f)| f)
            .filter(|f| seen.insert(store_key(f)))
            .collect()
    }
}

impl NavDataFactory for MultiFormatNavDataFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Federation
    }

    fn find(
        &self,
        nmid: &NavMessageId,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
        order: NavSearchOrder,
    ) -> Option<NavDataPtr> {
        let mut tried = HashSet::new();
        for (signal, store) in &self.factories {
            if !signal.matches(&nmid.sat.signal) || !tried.insert(store_key(store)) {
                continue;
            }
            if let Some(found) = store.borrow().find(nmid, when, health, validity, order) {
                return Some(found);
            }
        }
        None
    }

    fn get_offset(
        &self,
        from: TimeSystem,
        to: TimeSystem,
        when: &NavTime,
        health: SvHealth,
        validity: NavValidity,
    ) -> Option<NavDataPtr> {
        self.distinct()
            .into_iter()
            .find_map(|store| store.borrow().get_offset(from, to, when, health, validity))
    }

    fn edit(&mut self, from: &NavTime, to: &NavTime) {
        for store in self.distinct() {
            store.borrow_mut().edit(from, to);
        }
    }

    fn edit_satellite(&mut self, from: &NavTime, to: &NavTime, satellite: &NavSatelliteId) {
        for store in self.distinct() {
            store.borrow_mut().edit_satellite(from, to, satellite);
        }
    }

    fn edit_signal(&mut self, from: &NavTime, to: &NavTime, signal: &NavSignalId) {
        for store in self.distinct() {
            store.borrow_mut().edit_signal(from, to, signal);
        }
    }

    fn clear(&mut self) {
        let stores = self.distinct();
        log::debug!("Clearing {} stores", stores.len());
        for store in stores {
            store.borrow_mut().clear();
        }
    }

    fn initial_time(&self) -> NavTime {
        self.distinct().into_iter().fold(NavTime::END_OF_TIME, |best, store| {
            let t = store.borrow().initial_time();
            let (ct, cb) = comparable(t, best);
            if ct < cb {
                t
            } else {
                best
            }
        })
    }

    fn final_time(&self) -> NavTime {
        self.distinct().into_iter().fold(NavTime::BEGINNING_OF_TIME, |best, store| {
            let t = store.borrow().final_time();
            let (ct, cb) = comparable(t, best);
            if ct > cb {
                t
            } else {
                best
            }
        })
    }

    fn available_sats(
        &self,
        kind: Option<NavMessageType>,
        from: &NavTime,
        to: &NavTime,
    ) -> BTreeSet<NavSatelliteId> {
        self.distinct()
            .into_iter()
            .flat_map(|store| store.borrow().available_sats(kind, from, to))
            .collect()
    }

    fn available_msgs(&self, from: &NavTime, to: &NavTime) -> BTreeSet<NavMessageId> {
        self.distinct()
            .into_iter()
            .flat_map(|store| store.borrow().available_msgs(from, to))
            .collect()
    }

    fn is_present(&self, nmid: &NavMessageId, from: &NavTime, to: &NavTime) -> bool {
        self.distinct()
            .into_iter()
            .any(|store| store.borrow().is_present(nmid, from, to))
    }

    fn size(&self) -> usize {
        self.distinct().into_iter().map(|store| store.borrow().size()).sum()
    }

    fn signals(&self) -> BTreeSet<NavSignalId> {
        self.distinct()
            .into_iter()
            .flat_map(|store| store.borrow().signals())
            .collect()
    }

    fn satellites(&self) -> BTreeSet<NavSatelliteId> {
        self.distinct()
            .into_iter()
            .flat_map(|store| store.borrow().satellites())
            .collect()
    }

    fn set_validity_filter(&mut self, validity: NavValidity) {
        for store in self.distinct() {
            store.borrow_mut().set_validity_filter(validity);
        }
    }

    fn set_type_filter(&mut self, types: &BTreeSet<NavMessageType>) {
        for store in self.distinct() {
            store.borrow_mut().set_type_filter(types);
        }
    }

    fn configure(&mut self, config: &NavConfig) {
        for store in self.distinct() {
            store.borrow_mut().configure(config);
        }
    }

    fn dump(&self, out: &mut dyn Write, detail: DumpDetail) -> io::Result<()> {
        for store in self.distinct() {
            store.borrow().dump(out, detail)?;
        }
        Ok(())
    }

    fn supported_signals(&self) -> Vec<NavSignalId> {
        let mut signals = Vec::new();
        for (signal, _) in &self.factories {
            if !signals.contains(signal) {
                signals.push(*signal);
            }
        }
        signals
    }

    fn factory_formats(&self) -> String {
        self.distinct()
            .into_iter()
            .map(|store| store.borrow().factory_formats())
            .filter(|formats| !formats.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Offer the source to each store in registry order until one accepts it
    fn add_data_source(&mut self, source: &[PackedNavBits]) -> bool {
        for store in self.distinct() {
            let mut store = store.borrow_mut();
            if store.kind() == FactoryKind::SourceBacked && store.add_data_source(source) {
                return true;
            }
        }
        log::warn!("No registered store accepted a source of {} frames", source.len());
        false
    }
}

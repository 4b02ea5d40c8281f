//! GPS/QZSS CNAV-2 (L1C) decoder
//!
//! ## Supported frames
//! - Subframe 2 (600 bits): ephemeris and clock, plus the L1C health bit
//! - Subframe 3 (274 bits), by page number:
//!   - Page 1: UTC offset and Klobuchar ionospheric parameters
//!   - Page 2: GPS-to-GNSS time offset (GGTO) and EOP
//!   - Page 4: midi almanac with L1/L2/L5 health bits
//!
//! Other subframe 3 pages are accepted and produce no messages.

use crate::field_decoder::{time_adjust_week_rollover, FieldDecoder, FieldDefinition, Scale};
use crate::formats::FormatDecoder;
use crate::frame::PackedNavBits;
use crate::messages::{
    CNav2Alm, CNav2Eph, HealthData, IonoData, NavMessage, NavMessageBody, TimeOffsetData,
};
use crate::time::{NavTime, TimeSystem};
use crate::types::{
    CarrierBand, DecodeError, NavSatelliteId, NavSignalId, NavType, SatId, SatelliteSystem,
    SvHealth, TrackingCode,
};
use std::f64::consts::PI;

/// Number of bits in subframe 2
pub const SF2_BITS: usize = 600;
/// Number of bits in subframe 3
pub const SF3_BITS: usize = 274;

pub const PAGE_UTC_IONO: u64 = 1;
pub const PAGE_GGTO_EOP: u64 = 2;
pub const PAGE_MIDI_ALM: u64 = 4;

/// Bits used by the transmitted operational week number
const WNOP_BITS: u32 = 8;

/// Field layout of subframe 2
pub mod sf2 {
    use super::*;

    pub const WN: FieldDefinition = FieldDefinition::unsigned("WN", 0, 13, Scale::Factor(1.0));
    pub const ITOW: FieldDefinition = FieldDefinition::unsigned("ITOW", 13, 8, Scale::Factor(1.0));
    pub const TOP: FieldDefinition = FieldDefinition::unsigned("top", 21, 11, Scale::Factor(300.0));
    pub const HEALTH_L1C: FieldDefinition = FieldDefinition::flag("L1C health", 32);
    pub const URA_ED: FieldDefinition =
        FieldDefinition::signed("URA_ED", 33, 5, Scale::Factor(1.0));
    pub const TOE: FieldDefinition = FieldDefinition::unsigned("toe", 38, 11, Scale::Factor(300.0));
    pub const DELTA_A: FieldDefinition =
        FieldDefinition::signed("deltaA", 49, 26, Scale::Power(-9));
    pub const ADOT: FieldDefinition = FieldDefinition::signed("Adot", 75, 25, Scale::Power(-21));
    pub const DN0: FieldDefinition =
        FieldDefinition::signed("dn0", 100, 17, Scale::Power(-44)).in_semicircles();
    pub const DN0_DOT: FieldDefinition =
        FieldDefinition::signed("dn0dot", 117, 23, Scale::Power(-57)).in_semicircles();
    pub const M0: FieldDefinition =
        FieldDefinition::signed("M0", 140, 33, Scale::Power(-32)).in_semicircles();
    pub const ECC: FieldDefinition = FieldDefinition::unsigned("ecc", 173, 33, Scale::Power(-34));
    pub const W: FieldDefinition =
        FieldDefinition::signed("w", 206, 33, Scale::Power(-32)).in_semicircles();
    pub const OMEGA0: FieldDefinition =
        FieldDefinition::signed("OMEGA0", 239, 33, Scale::Power(-32)).in_semicircles();
    pub const I0: FieldDefinition =
        FieldDefinition::signed("i0", 272, 33, Scale::Power(-32)).in_semicircles();
    pub const D_OMEGA_DOT: FieldDefinition =
        FieldDefinition::signed("dOMEGAdot", 305, 17, Scale::Power(-44)).in_semicircles();
    pub const IDOT: FieldDefinition =
        FieldDefinition::signed("idot", 322, 15, Scale::Power(-44)).in_semicircles();
    pub const CIS: FieldDefinition = FieldDefinition::signed("Cis", 337, 16, Scale::Power(-30));
    pub const CIC: FieldDefinition = FieldDefinition::signed("Cic", 353, 16, Scale::Power(-30));
    pub const CRS: FieldDefinition = FieldDefinition::signed("Crs", 369, 24, Scale::Power(-8));
    pub const CRC: FieldDefinition = FieldDefinition::signed("Crc", 393, 24, Scale::Power(-8));
    pub const CUS: FieldDefinition = FieldDefinition::signed("Cus", 417, 21, Scale::Power(-30));
    pub const CUC: FieldDefinition = FieldDefinition::signed("Cuc", 438, 21, Scale::Power(-30));
    pub const URA_NED0: FieldDefinition =
        FieldDefinition::signed("URA_NED0", 459, 5, Scale::Factor(1.0));
    pub const URA_NED1: FieldDefinition =
        FieldDefinition::unsigned("URA_NED1", 464, 3, Scale::Factor(1.0));
    pub const URA_NED2: FieldDefinition =
        FieldDefinition::unsigned("URA_NED2", 467, 3, Scale::Factor(1.0));
    pub const AF0: FieldDefinition = FieldDefinition::signed("af0", 470, 26, Scale::Power(-35));
    pub const AF1: FieldDefinition = FieldDefinition::signed("af1", 496, 20, Scale::Power(-48));
    pub const AF2: FieldDefinition = FieldDefinition::signed("af2", 516, 10, Scale::Power(-60));
    pub const TGD: FieldDefinition =
        FieldDefinition::signed("Tgd", 526, 13, Scale::Power(-35)).with_unavailable(0x1000);
    pub const ISC_L1CP: FieldDefinition =
        FieldDefinition::signed("ISC_L1CP", 539, 13, Scale::Power(-35));
    pub const ISC_L1CD: FieldDefinition =
        FieldDefinition::signed("ISC_L1CD", 552, 13, Scale::Power(-35));
    pub const ISF: FieldDefinition = FieldDefinition::flag("ISF", 565);
    pub const WNOP: FieldDefinition = FieldDefinition::unsigned("WNop", 566, 8, Scale::Factor(1.0));
}

/// Field layout common to all subframe 3 pages
pub mod sf3 {
    use super::*;

    pub const PRN: FieldDefinition = FieldDefinition::unsigned("PRN", 0, 8, Scale::Factor(1.0));
    pub const PAGE: FieldDefinition = FieldDefinition::unsigned("page", 8, 6, Scale::Factor(1.0));
}

/// Subframe 3 page 1 (UTC and ionosphere)
pub mod utc {
    use super::*;

    pub const A0: FieldDefinition = FieldDefinition::signed("A0-n", 14, 16, Scale::Power(-35));
    pub const A1: FieldDefinition = FieldDefinition::signed("A1-n", 30, 13, Scale::Power(-51));
    pub const A2: FieldDefinition = FieldDefinition::signed("A2-n", 43, 7, Scale::Power(-68));
    pub const DT_LS: FieldDefinition = FieldDefinition::signed("dtLS", 50, 8, Scale::Factor(1.0));
    pub const TOT: FieldDefinition = FieldDefinition::unsigned("tot", 58, 16, Scale::Power(4));
    pub const WNOT: FieldDefinition = FieldDefinition::unsigned("WNot", 74, 13, Scale::Factor(1.0));
    pub const WN_LSF: FieldDefinition =
        FieldDefinition::unsigned("WNlsf", 87, 13, Scale::Factor(1.0));
    pub const DN: FieldDefinition = FieldDefinition::unsigned("DN", 100, 4, Scale::Factor(1.0));
    pub const DT_LSF: FieldDefinition =
        FieldDefinition::signed("dtLSF", 104, 8, Scale::Factor(1.0));
    pub const ALPHA: [FieldDefinition; 4] = [
        FieldDefinition::signed("alpha0", 112, 8, Scale::Power(-30)),
        FieldDefinition::signed("alpha1", 120, 8, Scale::Power(-27)),
        FieldDefinition::signed("alpha2", 128, 8, Scale::Power(-24)),
        FieldDefinition::signed("alpha3", 136, 8, Scale::Power(-24)),
    ];
    pub const BETA: [FieldDefinition; 4] = [
        FieldDefinition::signed("beta0", 144, 8, Scale::Power(11)),
        FieldDefinition::signed("beta1", 152, 8, Scale::Power(14)),
        FieldDefinition::signed("beta2", 160, 8, Scale::Power(16)),
        FieldDefinition::signed("beta3", 168, 8, Scale::Power(16)),
    ];
}

/// Subframe 3 page 2 (GGTO and EOP)
pub mod ggto {
    use super::*;

    pub const GNSS_ID: FieldDefinition =
        FieldDefinition::unsigned("GNSS ID", 14, 3, Scale::Factor(1.0));
    pub const TOT: FieldDefinition = FieldDefinition::unsigned("tggto", 17, 16, Scale::Power(4));
    pub const WNOT: FieldDefinition =
        FieldDefinition::unsigned("WNggto", 33, 13, Scale::Factor(1.0));
    pub const A0: FieldDefinition = FieldDefinition::signed("A0-ggto", 46, 16, Scale::Power(-35));
    pub const A1: FieldDefinition = FieldDefinition::signed("A1-ggto", 62, 13, Scale::Power(-51));
    pub const A2: FieldDefinition = FieldDefinition::signed("A2-ggto", 75, 7, Scale::Power(-68));
}

/// Subframe 3 page 4 (midi almanac)
pub mod alm {
    use super::*;

    pub const WNA: FieldDefinition = FieldDefinition::unsigned("WNa-n", 14, 13, Scale::Factor(1.0));
    pub const TOA: FieldDefinition = FieldDefinition::unsigned("toa", 27, 8, Scale::Power(12));
    pub const PRN_A: FieldDefinition = FieldDefinition::unsigned("PRNa", 35, 8, Scale::Factor(1.0));
    pub const HEALTH_L1: FieldDefinition = FieldDefinition::flag("L1 health", 43);
    pub const HEALTH_L2: FieldDefinition = FieldDefinition::flag("L2 health", 44);
    pub const HEALTH_L5: FieldDefinition = FieldDefinition::flag("L5 health", 45);
    pub const ECC: FieldDefinition = FieldDefinition::unsigned("ecc", 46, 11, Scale::Power(-16));
    pub const DELTA_I: FieldDefinition =
        FieldDefinition::signed("delta i", 57, 11, Scale::Power(-14)).in_semicircles();
    pub const OMEGA_DOT: FieldDefinition =
        FieldDefinition::signed("OMEGAdot", 68, 11, Scale::Power(-33)).in_semicircles();
    pub const AHALF: FieldDefinition = FieldDefinition::unsigned("Ahalf", 79, 17, Scale::Power(-4));
    pub const OMEGA0: FieldDefinition =
        FieldDefinition::signed("OMEGA0", 96, 16, Scale::Power(-15)).in_semicircles();
    pub const W: FieldDefinition =
        FieldDefinition::signed("w", 112, 16, Scale::Power(-15)).in_semicircles();
    pub const M0: FieldDefinition =
        FieldDefinition::signed("M0", 128, 16, Scale::Power(-15)).in_semicircles();
    pub const AF0: FieldDefinition = FieldDefinition::signed("af0", 144, 11, Scale::Power(-20));
    pub const AF1: FieldDefinition = FieldDefinition::signed("af1", 155, 10, Scale::Power(-37));
}

/// Time system the constellation's nav data is expressed in
fn time_system_for(system: SatelliteSystem) -> TimeSystem {
    match system {
        SatelliteSystem::Qzss => TimeSystem::Qzs,
        _ => TimeSystem::Gps,
    }
}

/// Map the GGTO GNSS ID to a target time system; `Ok(None)` means no data
fn ggto_target(code: u8) -> Result<Option<TimeSystem>, DecodeError> {
    match code {
        0 => Ok(None),
        1 => Ok(Some(TimeSystem::Gal)),
        2 => Ok(Some(TimeSystem::Glo)),
        3 => Ok(Some(TimeSystem::Qzs)),
        _ => Err(DecodeError::UnknownTargetSystem(code)),
    }
}

fn l1c_signal(system: SatelliteSystem) -> NavSignalId {
    NavSignalId::new(system, CarrierBand::L1, TrackingCode::L1CD, NavType::GpsCNav2)
}

fn l2c_signal(system: SatelliteSystem) -> NavSignalId {
    NavSignalId::new(system, CarrierBand::L2, TrackingCode::L2CM, NavType::GpsCNavL2)
}

fn l5_signal(system: SatelliteSystem) -> NavSignalId {
    NavSignalId::new(system, CarrierBand::L5, TrackingCode::L5I, NavType::GpsCNavL5)
}

fn health_from_bit(unhealthy: bool) -> SvHealth {
    if unhealthy {
        SvHealth::Unhealthy
    } else {
        SvHealth::Healthy
    }
}

/// CNAV-2 decoder
#[derive(Debug, Clone)]
pub struct CNav2Decoder {
    process_eph: bool,
    process_alm: bool,
}

impl CNav2Decoder {
    pub fn new() -> Self {
        Self {
            process_eph: true,
            process_alm: true,
        }
    }

    pub fn process_eph(&self) -> bool {
        self.process_eph
    }

    pub fn process_alm(&self) -> bool {
        self.process_alm
    }

    fn decode_eph(
        &self,
        frame: &PackedNavBits,
        out: &mut Vec<NavMessage>,
    ) -> Result<(), DecodeError> {
        let sat = frame.sat();
        let system = sat.system;

        if self.process_alm {
            let unhealthy = FieldDecoder::decode_bool(frame, &sf2::HEALTH_L1C)?;
            out.push(NavMessage::new(
                frame.transmit_time(),
                NavSatelliteId::own(sat, l1c_signal(system)),
                NavMessageBody::Health(HealthData::GpsCNav2 {
                    unhealthy,
                    is_eph: true,
                }),
            ));
        }
        if !self.process_eph {
            return Ok(());
        }

        let ts = time_system_for(system);
        let ref_a = match system {
            SatelliteSystem::Qzss => CNav2Eph::REF_A_QZSS,
            _ => CNav2Eph::REF_A_GPS,
        };
        let ref_omega_dot = CNav2Eph::REF_OMEGA_DOT_SEMICIRCLES * PI;

        let wn = FieldDecoder::decode_unsigned(frame, &sf2::WN)? as i64;
        let toe = NavTime::from_week_second(ts, wn, FieldDecoder::decode(frame, &sf2::TOE)?);
        let wnop_raw = FieldDecoder::decode_unsigned(frame, &sf2::WNOP)? as i64;
        let wnop = time_adjust_week_rollover(wnop_raw, wn, WNOP_BITS);
        let top = NavTime::from_week_second(ts, wnop, FieldDecoder::decode(frame, &sf2::TOP)?);
        log::trace!("CNAV2 {} WNop {} -> {} (WN {})", sat, wnop_raw, wnop, wn);

        // Derived quantities below depend on all raw fields
        let delta_a = FieldDecoder::decode(frame, &sf2::DELTA_A)?;
        let d_omega_dot = FieldDecoder::decode(frame, &sf2::D_OMEGA_DOT)?;
        let health_l1c = FieldDecoder::decode_bool(frame, &sf2::HEALTH_L1C)?;
        let a = ref_a + delta_a;

        let mut eph = CNav2Eph {
            xmit_time: frame.transmit_time(),
            toe,
            toc: toe,
            cuc: FieldDecoder::decode(frame, &sf2::CUC)?,
            cus: FieldDecoder::decode(frame, &sf2::CUS)?,
            crc: FieldDecoder::decode(frame, &sf2::CRC)?,
            crs: FieldDecoder::decode(frame, &sf2::CRS)?,
            cic: FieldDecoder::decode(frame, &sf2::CIC)?,
            cis: FieldDecoder::decode(frame, &sf2::CIS)?,
            m0: FieldDecoder::decode(frame, &sf2::M0)?,
            dn: FieldDecoder::decode(frame, &sf2::DN0)?,
            dndot: FieldDecoder::decode(frame, &sf2::DN0_DOT)?,
            ecc: FieldDecoder::decode(frame, &sf2::ECC)?,
            delta_a,
            a,
            ahalf: a.sqrt(),
            adot: FieldDecoder::decode(frame, &sf2::ADOT)?,
            omega0: FieldDecoder::decode(frame, &sf2::OMEGA0)?,
            i0: FieldDecoder::decode(frame, &sf2::I0)?,
            w: FieldDecoder::decode(frame, &sf2::W)?,
            d_omega_dot,
            omega_dot: ref_omega_dot + d_omega_dot,
            idot: FieldDecoder::decode(frame, &sf2::IDOT)?,
            af0: FieldDecoder::decode(frame, &sf2::AF0)?,
            af1: FieldDecoder::decode(frame, &sf2::AF1)?,
            af2: FieldDecoder::decode(frame, &sf2::AF2)?,
            health_l1c,
            health: health_from_bit(health_l1c),
            ura_ed: FieldDecoder::decode_signed(frame, &sf2::URA_ED)?,
            top,
            ura_ned0: FieldDecoder::decode_signed(frame, &sf2::URA_NED0)?,
            ura_ned1: FieldDecoder::decode_unsigned(frame, &sf2::URA_NED1)?,
            ura_ned2: FieldDecoder::decode_unsigned(frame, &sf2::URA_NED2)?,
            tgd: FieldDecoder::decode(frame, &sf2::TGD)?,
            isc_l1cp: FieldDecoder::decode(frame, &sf2::ISC_L1CP)?,
            isc_l1cd: FieldDecoder::decode(frame, &sf2::ISC_L1CD)?,
            integrity_status: FieldDecoder::decode_bool(frame, &sf2::ISF)?,
            begin_fit: frame.transmit_time(),
            end_fit: frame.transmit_time(),
        };
        eph.fix_fit();

        out.push(NavMessage::new(
            frame.transmit_time(),
            NavSatelliteId::own(sat, frame.signal()),
            NavMessageBody::Ephemeris(eph),
        ));
        Ok(())
    }

    fn decode_alm(
        &self,
        frame: &PackedNavBits,
        out: &mut Vec<NavMessage>,
    ) -> Result<(), DecodeError> {
        if !self.process_alm {
            return Ok(());
        }
        let xmit = frame.sat();
        let system = xmit.system;
        let subj = SatId::new(FieldDecoder::decode_unsigned(frame, &alm::PRN_A)? as u32, system);

        let health_l1 = FieldDecoder::decode_bool(frame, &alm::HEALTH_L1)?;
        let health_l2 = FieldDecoder::decode_bool(frame, &alm::HEALTH_L2)?;
        let health_l5 = FieldDecoder::decode_bool(frame, &alm::HEALTH_L5)?;

        // The L2 and L5 bits describe signals that do not carry CNAV-2 themselves
        let dependents = [
            (frame.signal(), health_l1),
            (l2c_signal(system), health_l2),
            (l5_signal(system), health_l5),
        ];
        for (signal, unhealthy) in dependents {
            out.push(NavMessage::new(
                frame.transmit_time(),
                NavSatelliteId::new(subj, xmit, signal),
                NavMessageBody::Health(HealthData::GpsCNav2 {
                    unhealthy,
                    is_eph: false,
                }),
            ));
        }

        let ts = time_system_for(system);
        let ref_i = match system {
            SatelliteSystem::Qzss => CNav2Alm::REF_I_OFFSET_QZSS,
            _ => CNav2Alm::REF_I_OFFSET_GPS,
        } * PI;
        let wna = FieldDecoder::decode_unsigned(frame, &alm::WNA)?;
        let toa = FieldDecoder::decode(frame, &alm::TOA)?;
        let toe = NavTime::from_week_second(ts, wna as i64, toa);
        let ahalf = FieldDecoder::decode(frame, &alm::AHALF)?;
        let delta_i = FieldDecoder::decode(frame, &alm::DELTA_I)?;

        let mut almanac = CNav2Alm {
            xmit_time: frame.transmit_time(),
            wna,
            toa,
            toe,
            toc: toe,
            m0: FieldDecoder::decode(frame, &alm::M0)?,
            ecc: FieldDecoder::decode(frame, &alm::ECC)?,
            ahalf,
            a: ahalf * ahalf,
            omega0: FieldDecoder::decode(frame, &alm::OMEGA0)?,
            i0: ref_i + delta_i,
            delta_i,
            w: FieldDecoder::decode(frame, &alm::W)?,
            omega_dot: FieldDecoder::decode(frame, &alm::OMEGA_DOT)?,
            af0: FieldDecoder::decode(frame, &alm::AF0)?,
            af1: FieldDecoder::decode(frame, &alm::AF1)?,
            health_l1,
            health_l2,
            health_l5,
            health: health_from_bit(health_l1),
            begin_fit: toe,
            end_fit: toe,
        };
        almanac.fix_fit();

        out.push(NavMessage::new(
            frame.transmit_time(),
            NavSatelliteId::new(subj, xmit, frame.signal()),
            NavMessageBody::Almanac(almanac),
        ));
        Ok(())
    }

    fn decode_utc_iono(
        &self,
        frame: &PackedNavBits,
        out: &mut Vec<NavMessage>,
    ) -> Result<(), DecodeError> {
        if !self.process_alm {
            return Ok(());
        }
        let ts = time_system_for(frame.sat().system);
        let sat = NavSatelliteId::own(frame.sat(), frame.signal());

        let tot = FieldDecoder::decode(frame, &utc::TOT)?;
        let wnot = FieldDecoder::decode_unsigned(frame, &utc::WNOT)?;
        let offset = TimeOffsetData {
            src: ts,
            tgt: TimeSystem::Utc,
            a0: FieldDecoder::decode(frame, &utc::A0)?,
            a1: FieldDecoder::decode(frame, &utc::A1)?,
            a2: FieldDecoder::decode(frame, &utc::A2)?,
            delta_t_ls: FieldDecoder::decode(frame, &utc::DT_LS)?,
            tot,
            wnot,
            wn_lsf: FieldDecoder::decode_unsigned(frame, &utc::WN_LSF)?,
            dn: FieldDecoder::decode_unsigned(frame, &utc::DN)?,
            delta_t_lsf: FieldDecoder::decode(frame, &utc::DT_LSF)?,
            ref_time: NavTime::from_week_second(ts, wnot as i64, tot),
        };
        out.push(NavMessage::new(
            frame.transmit_time(),
            sat,
            NavMessageBody::TimeOffset(offset),
        ));

        let mut iono = IonoData::default();
        for (value, field) in iono.alpha.iter_mut().zip(utc::ALPHA.iter()) {
            *value = FieldDecoder::decode(frame, field)?;
        }
        for (value, field) in iono.beta.iter_mut().zip(utc::BETA.iter()) {
            *value = FieldDecoder::decode(frame, field)?;
        }
        out.push(NavMessage::new(frame.transmit_time(), sat, NavMessageBody::Iono(iono)));
        Ok(())
    }

    fn decode_ggto(
        &self,
        frame: &PackedNavBits,
        out: &mut Vec<NavMessage>,
    ) -> Result<(), DecodeError> {
        if !self.process_alm {
            return Ok(());
        }
        let code = FieldDecoder::decode_unsigned(frame, &ggto::GNSS_ID)? as u8;
        let tgt = match ggto_target(code)? {
            Some(tgt) => tgt,
            None => return Ok(()),
        };
        let ts = time_system_for(frame.sat().system);
        let tot = FieldDecoder::decode(frame, &ggto::TOT)?;
        let wnot = FieldDecoder::decode_unsigned(frame, &ggto::WNOT)?;
        let offset = TimeOffsetData {
            src: ts,
            tgt,
            a0: FieldDecoder::decode(frame, &ggto::A0)?,
            a1: FieldDecoder::decode(frame, &ggto::A1)?,
            a2: FieldDecoder::decode(frame, &ggto::A2)?,
            delta_t_ls: 0.0,
            tot,
            wnot,
            wn_lsf: 0,
            dn: 0,
            delta_t_lsf: 0.0,
            ref_time: NavTime::from_week_second(ts, wnot as i64, tot),
        };
        out.push(NavMessage::new(
            frame.transmit_time(),
            NavSatelliteId::own(frame.sat(), frame.signal()),
            NavMessageBody::TimeOffset(offset),
        ));
        Ok(())
    }
}

impl Default for CNav2Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDecoder for CNav2Decoder {
    fn format_name(&self) -> &'static str {
        "GPS_CNAV2"
    }

    fn handles(&self, nav: NavType) -> bool {
        nav == NavType::GpsCNav2
    }

    fn supported_signals(&self) -> Vec<NavSignalId> {
        [SatelliteSystem::Gps, SatelliteSystem::Qzss]
            .into_iter()
            .flat_map(|system| [l1c_signal(system), l2c_signal(system), l5_signal(system)])
            .collect()
    }

    fn set_process(&mut self, eph: bool, alm: bool) {
        self.process_eph = eph;
        self.process_alm = alm;
    }

    fn decode_frame(&self, frame: &PackedNavBits) -> Result<Vec<NavMessage>, DecodeError> {
        if !self.handles(frame.nav()) {
            return Err(DecodeError::WrongNavType {
                expected: NavType::GpsCNav2,
                found: frame.nav(),
            });
        }

        let mut out = Vec::new();
        match frame.num_bits() {
            SF2_BITS => self.decode_eph(frame, &mut out)?,
            SF3_BITS => {
                let page = FieldDecoder::decode_unsigned(frame, &sf3::PAGE)?;
                match page {
                    PAGE_UTC_IONO => self.decode_utc_iono(frame, &mut out)?,
                    PAGE_GGTO_EOP => self.decode_ggto(frame, &mut out)?,
                    PAGE_MIDI_ALM => self.decode_alm(frame, &mut out)?,
                    _ => log::trace!("Ignoring subframe 3 page {} from {}", page, frame.sat()),
                }
            }
            n => return Err(DecodeError::UnsupportedLength(n)),
        }
        Ok(out)
    }
}

// Helpers for building synthetic CNAV-2 frames
#![allow(dead_code)]

use gnss_navdata::formats::cnav2::{
    alm, sf2, sf3, utc, PAGE_MIDI_ALM, PAGE_UTC_IONO, SF2_BITS, SF3_BITS,
};
use gnss_navdata::{
    CarrierBand, FieldDecoder, FieldDefinition, NavTime, NavType, ObsId, PackedNavBits, SatId,
    SatelliteSystem, TimeSystem, TrackingCode,
};

pub const WEEK: i64 = 2200;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn gps(sow: f64) -> NavTime {
    NavTime::from_week_second(TimeSystem::Gps, WEEK, sow)
}

pub fn blank(prn: u32, num_bits: usize, sow: f64) -> PackedNavBits {
    PackedNavBits::zeroed(
        SatId::new(prn, SatelliteSystem::Gps),
        ObsId::new(CarrierBand::L1, TrackingCode::L1CD),
        NavType::GpsCNav2,
        gps(sow),
        num_bits,
    )
}

pub fn put(frame: &mut PackedNavBits, field: &FieldDefinition, value: f64) {
    FieldDecoder::encode(frame, field, value).unwrap();
}

/// Subframe 2 with toe in `WEEK`; the frame is transmitted one hour before toe
pub fn ephemeris(prn: u32, toe_sow: f64, unhealthy: bool) -> PackedNavBits {
    let mut frame = blank(prn, SF2_BITS, toe_sow - 3600.0);
    put(&mut frame, &sf2::WN, WEEK as f64);
    put(&mut frame, &sf2::TOE, toe_sow);
    put(&mut frame, &sf2::TOP, toe_sow);
    put(&mut frame, &sf2::WNOP, (WEEK % 256) as f64);
    put(&mut frame, &sf2::HEALTH_L1C, if unhealthy { 1.0 } else { 0.0 });
    put(&mut frame, &sf2::DELTA_A, 120.5);
    put(&mut frame, &sf2::ECC, 0.0042);
    put(&mut frame, &sf2::I0, 0.96);
    put(&mut frame, &sf2::OMEGA0, -2.1);
    put(&mut frame, &sf2::W, 0.7);
    put(&mut frame, &sf2::M0, -0.3);
    put(&mut frame, &sf2::AF0, 2.5e-5);
    put(&mut frame, &sf2::AF1, -1.0e-12);
    frame
}

pub fn utc_page(prn: u32, sow: f64) -> PackedNavBits {
    let mut frame = blank(prn, SF3_BITS, sow);
    put(&mut frame, &sf3::PRN, prn as f64);
    put(&mut frame, &sf3::PAGE, PAGE_UTC_IONO as f64);
    put(&mut frame, &utc::A0, 3.0e-9);
    put(&mut frame, &utc::DT_LS, 18.0);
    put(&mut frame, &utc::TOT, 61440.0);
    put(&mut frame, &utc::WNOT, WEEK as f64);
    put(&mut frame, &utc::DT_LSF, 18.0);
    frame
}

pub fn almanac_page(prn: u32, subject: u32, sow: f64) -> PackedNavBits {
    let mut frame = blank(prn, SF3_BITS, sow);
    put(&mut frame, &sf3::PRN, prn as f64);
    put(&mut frame, &sf3::PAGE, PAGE_MIDI_ALM as f64);
    put(&mut frame, &alm::PRN_A, subject as f64);
    put(&mut frame, &alm::WNA, WEEK as f64);
    put(&mut frame, &alm::TOA, 319488.0);
    put(&mut frame, &alm::AHALF, 5153.5);
    put(&mut frame, &alm::ECC, 0.01);
    frame
}

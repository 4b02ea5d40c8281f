// End-to-end decoding of synthetic CNAV-2 frames
mod common;

use common::*;
use gnss_navdata::field_decoder::time_adjust_week_rollover;
use gnss_navdata::formats::cnav2::{sf2, SF2_BITS};
use gnss_navdata::{
    CNav2Decoder, DecodeReason, FieldDecoder, FieldDefinition, FormatDecoder, NavMessageBody,
    NavMessageType, SvHealth, TimeSystem,
};

#[test]
fn test_subframe2_fields_within_one_lsb() {
    init_logging();
    let fields: [(&FieldDefinition, f64); 10] = [
        (&sf2::CUC, 1.234e-6),
        (&sf2::CUS, -7.5e-6),
        (&sf2::CRC, 210.125),
        (&sf2::CRS, -18.5),
        (&sf2::CIC, 3.3e-8),
        (&sf2::CIS, -1.1e-7),
        (&sf2::IDOT, 2.0e-10),
        (&sf2::DN0, 4.1e-9),
        (&sf2::AF2, 0.0),
        (&sf2::ADOT, 0.0125),
    ];

    let mut frame = ephemeris(9, 14400.0, false);
    for (field, value) in fields {
        put(&mut frame, field, value);
    }
    for (field, value) in fields {
        let decoded = FieldDecoder::decode(&frame, field).unwrap();
        assert!(
            (decoded - value).abs() <= field.lsb(),
            "{}: {} decoded as {}",
            field.name,
            value,
            decoded
        );
    }

    let messages = CNav2Decoder::new().decode(&frame).unwrap();
    let NavMessageBody::Ephemeris(eph) = messages[1].body() else {
        panic!("expected ephemeris");
    };
    assert!((eph.cuc - 1.234e-6).abs() <= sf2::CUC.lsb());
    assert!((eph.crc - 210.125).abs() <= sf2::CRC.lsb());
    assert!((eph.idot - 2.0e-10).abs() <= sf2::IDOT.lsb());
    assert!((eph.adot - 0.0125).abs() <= sf2::ADOT.lsb());
    assert!((eph.i0 - 0.96).abs() <= sf2::I0.lsb());
    assert!((eph.omega0 + 2.1).abs() <= sf2::OMEGA0.lsb());
}

#[test]
fn test_week_rollover_resolution() {
    for reference in [1024i64, 2047, 2048, 2200, 2303] {
        for short in 0..256i64 {
            let week = time_adjust_week_rollover(short, reference, 8);
            assert_eq!(week.rem_euclid(256), short);
            assert!(week >= reference - 128 && week < reference + 128);
        }
    }
}

#[test]
fn test_transmitted_week_uses_rollover() {
    let mut frame = ephemeris(9, 14400.0, false);
    // WN 2200 is 152 modulo 256, so 100 resolves to an earlier week
    put(&mut frame, &sf2::WNOP, 100.0);
    let messages = CNav2Decoder::new().decode(&frame).unwrap();
    let NavMessageBody::Ephemeris(eph) = messages[1].body() else {
        panic!("expected ephemeris");
    };
    assert_eq!(eph.top.week(), 2148);
    assert_eq!(eph.toe.week(), WEEK);
}

#[test]
fn test_unavailable_group_delay_is_nan() {
    let mut frame = ephemeris(9, 14400.0, false);
    put(&mut frame, &sf2::TGD, f64::NAN);
    assert_eq!(frame.raw_bits(sf2::TGD.start_bit, sf2::TGD.length).unwrap(), 0x1000);

    let messages = CNav2Decoder::new().decode(&frame).unwrap();
    let NavMessageBody::Ephemeris(eph) = messages[1].body() else {
        panic!("expected ephemeris");
    };
    assert!(eph.tgd.is_nan());
    assert_ne!(eph.tgd, 0.0);
}

#[test]
fn test_health_precedes_ephemeris() {
    let messages = CNav2Decoder::new().decode(&ephemeris(9, 14400.0, true)).unwrap();
    let kinds: Vec<_> = messages.iter().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec![NavMessageType::Health, NavMessageType::Ephemeris]);
    assert_eq!(messages[0].health(), Some(SvHealth::Unhealthy));

    let NavMessageBody::Ephemeris(eph) = messages[1].body() else {
        panic!("expected ephemeris");
    };
    assert_eq!(eph.health, SvHealth::Unhealthy);
    assert_eq!(eph.toe, gps(14400.0));
    assert_eq!(eph.begin_fit, gps(10800.0));
    assert_eq!(eph.end_fit, gps(19800.0));
}

#[test]
fn test_almanac_page_messages() {
    let messages = CNav2Decoder::new().decode(&almanac_page(4, 22, 600.0)).unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].kind(), NavMessageType::Almanac);
    assert_eq!(messages[3].nearest_epoch(), gps(319488.0));
    let (begin, end) = messages[3].applicable_span();
    assert_eq!(begin, gps(319488.0 - 70.0 * 3600.0));
    assert_eq!(end, gps(319488.0 + 74.0 * 3600.0));
}

#[test]
fn test_rejections_are_not_faults() {
    let decoder = CNav2Decoder::new();
    let short = blank(9, SF2_BITS - 1, 0.0);
    let err = decoder.decode(&short).unwrap_err();
    assert_eq!(err.reason(), DecodeReason::UnsupportedLength);
    assert!(!err.is_fault());

    // The next frame decodes normally
    assert_eq!(decoder.decode(&utc_page(9, 0.0)).unwrap().len(), 2);
}

#[test]
fn test_message_serializes_to_json() {
    let messages = CNav2Decoder::new().decode(&utc_page(9, 0.0)).unwrap();
    let json = serde_json::to_value(&messages[0]).unwrap();
    let offset = &json["body"]["TimeOffset"];
    assert_eq!(offset["tgt"], "Utc");
    assert_eq!(offset["delta_t_ls"], 18.0);
    assert_eq!(messages[0].as_time_offset().unwrap().src, TimeSystem::Gps);
}

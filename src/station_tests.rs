use super::*;
use crate::group::{Block, Offset};

fn station() -> Station {
    Station::new(0xF212, Options::default())
}

fn feed(station: &mut Station, line: &str) -> Option<Value> {
    let group = Group::parse_hex(line).expect("valid test line");
    station.update(&group)
}

#[test]
fn test_basic_flags_from_block2() {
    let mut station = station();
    let json = feed(&mut station, "F212 0408 E20E 2020").unwrap();

    assert_eq!(json["pi"], "0xF212");
    assert_eq!(json["group"], "0A");
    assert_eq!(json["tp"], true);
    assert_eq!(json["pty"], 0);
    assert_eq!(json["ta"], false);
    assert_eq!(json["is_music"], true);
    assert_eq!(json["di"]["dynamic_pty"], false);
}

#[test]
fn test_ps_assembled_over_four_segments() {
    let mut station = station();
    assert!(feed(&mut station, "F212 0408 E20E 2020").unwrap()["ps"].is_null());
    feed(&mut station, "F212 0409 E20E 5246").unwrap();
    feed(&mut station, "F212 040A E20E 4D20").unwrap();
    let json = feed(&mut station, "F212 040B E20E 2020").unwrap();
    assert_eq!(json["ps"], "  RFM   ");
}

#[test]
fn test_partial_ps_shown_on_request() {
    let mut station = Station::new(
        0xF212,
        Options { show_partial: true, ..Options::default() },
    );
    let json = feed(&mut station, "F212 0409 E20E 5246").unwrap();
    // Segment 1 alone is not sequential from position 0.
    assert_eq!(json["partial_ps"], "  RF    ");
}

#[test]
fn test_one_group_without_pi_is_tolerated() {
    let mut station = station();
    assert!(feed(&mut station, "F212 0408 E20E 2020").is_some());
    assert!(feed(&mut station, "---- 0408 E20E 2020").is_some());
    assert!(feed(&mut station, "---- 0408 E20E 2020").is_none());
    // A group with PI resets the allowance.
    assert!(feed(&mut station, "F212 0408 E20E 2020").is_some());
    assert!(feed(&mut station, "---- 0408 E20E 2020").is_some());
}

#[test]
fn test_empty_group_dropped() {
    let mut station = station();
    feed(&mut station, "F212 0408 E20E 2020").unwrap();
    let empty = Group::parse_hex("---- ---- ---- ----").unwrap();
    assert!(station.update(&empty).is_none());
}

#[test]
fn test_radiotext_terminated_message() {
    let mut station = station();
    feed(&mut station, "F212 2000 4845 4C4C").unwrap();
    feed(&mut station, "F212 2001 4F20 574F").unwrap();
    let json = feed(&mut station, "F212 2002 524C 440D").unwrap();
    assert_eq!(json["radiotext"], "HELLO WORLD");
}

#[test]
fn test_radiotext_unterminated_needs_repeat() {
    let mut station = station();
    feed(&mut station, "F212 2000 4142 4344").unwrap();
    feed(&mut station, "F212 2001 4546 4748").unwrap();
    // First pass complete, but without terminator the message is only a
    // candidate.
    let json = feed(&mut station, "F212 2000 4142 4344").unwrap();
    assert!(json["radiotext"].is_null());
    feed(&mut station, "F212 2001 4546 4748").unwrap();
    // Second sighting of the same candidate confirms it.
    let json = feed(&mut station, "F212 2000 4142 4344").unwrap();
    assert_eq!(json["radiotext"], "ABCDEFGH");
}

#[test]
fn test_clock_time_with_positive_offset() {
    let mut station = station();
    // MJD 58000 = 2017-09-04, 14:38 UTC, offset +2 h.
    let json = feed(&mut station, "F212 4001 C520 E984").unwrap();
    assert_eq!(json["clock_time"], "2017-09-04T16:38:00+02:00");
}

#[test]
fn test_clock_time_invalid_goes_to_debug() {
    let mut station = station();
    // Minute field of 63 is out of range.
    let json = feed(&mut station, "F212 4001 C520 EFC4").unwrap();
    assert!(json["clock_time"].is_null());
    assert_eq!(json["debug"][0], "invalid date/time");
}

#[test]
fn test_alt_frequencies_method_a() {
    let mut station = station();
    feed(&mut station, "F212 0408 E205 2020").unwrap();
    let json = feed(&mut station, "F212 0409 07CD 5246").unwrap();
    assert_eq!(json["alt_frequencies_a"][0], 88_000);
    assert_eq!(json["alt_frequencies_a"][1], 88_200);
}

#[test]
fn test_alt_frequencies_method_b() {
    let mut station = station();
    feed(&mut station, "F212 0408 E50A 2020").unwrap();
    feed(&mut station, "F212 0409 0A14 5246").unwrap();
    let json = feed(&mut station, "F212 040A 1E0A 4D20").unwrap();
    let b = &json["alt_frequencies_b"];
    assert_eq!(b["tuned_frequency"], 88_500);
    assert_eq!(b["same_programme"][0], 89_500);
    assert_eq!(b["regional_variants"][0], 90_500);
}

#[test]
fn test_oda_registration_and_routing() {
    let mut station = station();
    let json = feed(&mut station, "F212 3016 1234 C3B0").unwrap();
    assert_eq!(json["open_data_app"]["oda_group"], "11A");
    assert_eq!(json["open_data_app"]["app_id"], "0xC3B0");
    assert_eq!(json["open_data_app"]["message"], 0x1234);

    // An 11A group now routes to the registered application.
    let json = feed(&mut station, "F212 B000 0001 0002").unwrap();
    assert_eq!(json["unknown_oda"]["app_id"], "0xC3B0");
    assert_eq!(json["unknown_oda"]["raw_data"], "00 0001 0002");
}

#[test]
fn test_unregistered_oda_sink() {
    let mut station = station();
    let json = feed(&mut station, "F212 B000 0001 0002").unwrap();
    assert!(json["unknown_oda"]["app_id"].is_null());
    assert_eq!(json["unknown_oda"]["raw_data"], "00 0001 0002");
}

#[test]
fn test_fast_tuning_15b() {
    let mut station = station();
    let json = feed(&mut station, "F212 F818 ---- ----").unwrap();
    assert_eq!(json["group"], "15B");
    assert_eq!(json["ta"], true);
    assert_eq!(json["is_music"], true);
}

#[test]
fn test_eon_ps_name() {
    let mut station = station();
    feed(&mut station, "F212 E000 5241 6205").unwrap();
    feed(&mut station, "F212 E001 4449 6205").unwrap();
    feed(&mut station, "F212 E002 4F20 6205").unwrap();
    let json = feed(&mut station, "F212 E003 3120 6205").unwrap();
    assert_eq!(json["other_network"]["pi"], "0x6205");
    assert_eq!(json["other_network"]["ps"], "RADIO 1 ");
}

#[test]
fn test_eon_mapped_frequency() {
    let mut station = station();
    // Variant 5, AF code 14: 87.5 + 1.4 MHz.
    let json = feed(&mut station, "F212 E005 000E 6205").unwrap();
    assert_eq!(json["other_network"]["kilohertz"], 88_900);
}

#[test]
fn test_pin_and_slow_labelling() {
    let mut station = station();
    let json = feed(&mut station, "F212 1000 00E0 2B9E").unwrap();
    assert_eq!(json["prog_item_number"], 0x2B9E);
    assert_eq!(json["prog_item_started"]["day"], 5);
    assert_eq!(json["prog_item_started"]["time"], "14:30");
    assert_eq!(json["has_linkage"], false);
    assert_eq!(json["ecc"], 0xE0);
    assert_eq!(json["country_code"], 0xF);
}

#[test]
fn test_unhandled_slc_variant_in_debug() {
    let mut station = station();
    let json = feed(&mut station, "F212 1000 4000 0000").unwrap();
    assert_eq!(json["debug"][0], "TODO: SLC variant 4");
}

#[test]
fn test_transparent_data_5a() {
    let mut station = station();
    let json = feed(&mut station, "F212 5000 4845 5921").unwrap();
    assert_eq!(json["transparent_data"]["address"], 0);
    assert_eq!(json["transparent_data"]["raw"], "48 45 59 21");
    assert_eq!(json["transparent_data"]["as_text"], "HEY!");
}

#[test]
fn test_in_house_6a() {
    let mut station = station();
    let json = feed(&mut station, "F212 6005 1234 5678").unwrap();
    assert_eq!(json["in_house_data"][0], 5);
    assert_eq!(json["in_house_data"][1], 0x1234);
    assert_eq!(json["in_house_data"][2], 0x5678);
}

#[test]
fn test_stub_groups_report_debug() {
    let mut station = station();
    let json = feed(&mut station, "F212 7000 1234 5678").unwrap();
    assert_eq!(json["debug"][0], "TODO: 7A");
    let json = feed(&mut station, "F212 8000 1234 5678").unwrap();
    assert_eq!(json["debug"][0], "TMC user group (not decoded)");
    let json = feed(&mut station, "F212 9000 1234 5678").unwrap();
    assert_eq!(json["debug"][0], "TODO: 9A");
}

#[test]
fn test_show_raw_attaches_hex() {
    let mut station = Station::new(
        0xF212,
        Options { show_raw: true, ..Options::default() },
    );
    let json = feed(&mut station, "F212 0408 ---- 2020").unwrap();
    assert_eq!(json["raw_data"], "F212 0408 ---- 2020");
}

#[test]
fn test_timestamp_attached_when_requested() {
    let mut station = Station::new(
        0xF212,
        Options { timestamp: true, ..Options::default() },
    );
    let mut group = Group::parse_hex("F212 0408 E20E 2020").unwrap();
    group.set_rx_time(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000));
    let json = station.update(&group).unwrap();
    assert_eq!(json["rx_time"], 1_700_000_000.0);
}

#[test]
fn test_group_without_block2_is_typeless() {
    let mut station = station();
    let json = feed(&mut station, "F212 ---- 1234 5678").unwrap();
    assert!(json["group"].is_null());
    assert!(json["tp"].is_null());
}

#[test]
fn test_version_b_group_with_c_prime_pi() {
    // Assemble a 0B group by hand, with the PI repeated in a C' block 3.
    let mut group = Group::new();
    group.set_block(
        BLOCK2,
        Block {
            raw: 0x0800 << 10,
            data: 0x0800,
            offset: Offset::B,
            is_received: true,
            had_errors: false,
        },
    );
    group.set_block(
        BLOCK3,
        Block {
            raw: 0xF212 << 10,
            data: 0xF212,
            offset: Offset::Cprime,
            is_received: true,
            had_errors: false,
        },
    );
    assert_eq!(group.pi(), Some(0xF212));

    let mut station = station();
    let json = station.update(&group).unwrap();
    assert_eq!(json["group"], "0B");
}

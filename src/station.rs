//! Per-station decoder state and the group dispatcher.
//!
//! A [`Station`] represents one broadcast carrier, identified by its PI
//! code. It owns the text and frequency accumulators and turns each
//! assembled [`Group`] into one JSON object, routing on the group type the
//! way IEC 62106 lays out the group repertoire. The dispatcher is the only
//! place that reads group content.

use std::collections::HashMap;
use std::time::SystemTime;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::freq::{AltFreqList, Band, CarrierFrequency};
use crate::group::{Group, GroupType, Version, BLOCK2, BLOCK3, BLOCK4};
use crate::text::{printable, RdsString};
use crate::util::{bits, bits_wide, hex_string};

/// Output shaping knobs, the subset of command-line options the decoders
/// care about.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Also emit incomplete PS / RadioText / AF lists.
    pub show_partial: bool,
    /// Attach the raw group as hex to every message.
    pub show_raw: bool,
    /// Attach the reception timestamp to every message.
    pub timestamp: bool,
}

#[derive(Serialize)]
struct ProgramItemStarted {
    day: u16,
    time: String,
}

fn put(json: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    json.insert(key.to_owned(), value.into());
}

fn nested<'a>(json: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = json
        .entry(key.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Append to the per-message debug channel. Oddities never abort decoding;
/// they are reported alongside the message.
fn add_debug(json: &mut Map<String, Value>, message: impl Into<String>) {
    let entry = json
        .entry("debug".to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        items.push(Value::String(message.into()));
    }
}

// Decoder identification bits, one per 0A/0B segment address.
fn di_code_name(segment: u16) -> &'static str {
    match segment {
        0 => "dynamic_pty",
        1 => "compressed",
        2 => "artificial_head",
        3 => "stereo",
        _ => "unknown",
    }
}

/// Programme Item Number (IEC 62106:2015, section 6.1.5.2).
fn decode_pin(pin: u16, json: &mut Map<String, Value>) -> bool {
    let day = bits(pin, 11, 5);
    let hour = bits(pin, 6, 5);
    let minute = bits(pin, 0, 6);
    if day >= 1 && hour <= 24 && minute <= 59 {
        put(json, "prog_item_number", pin);
        if let Ok(started) = serde_json::to_value(ProgramItemStarted {
            day,
            time: format!("{hour:02}:{minute:02}"),
        }) {
            json.insert("prog_item_started".to_owned(), started);
        }
        true
    } else {
        false
    }
}

/// Gregorian date from a Modified Julian Date, per the algorithm in the
/// standard's annex G.
fn mjd_to_ymd(mjd: u32) -> (i32, u32, u32) {
    let mjd = f64::from(mjd);
    let mut year = ((mjd - 15078.2) / 365.25) as i32;
    let mut month =
        ((mjd - 14956.1 - (f64::from(year) * 365.25).trunc()) / 30.6001) as i32;
    let day = (mjd
        - 14956.0
        - (f64::from(year) * 365.25).trunc()
        - (f64::from(month) * 30.6001).trunc()) as u32;
    if month == 14 || month == 15 {
        year += 1;
        month -= 12;
    }
    (year + 1900, (month - 1) as u32, day)
}

/// Decoder state for a single broadcast carrier.
pub struct Station {
    pi: u16,
    options: Options,
    last_group_had_pi: bool,
    ps: RdsString,
    radiotext: RdsString,
    rt_ab: Option<bool>,
    rt_prev_candidate: String,
    ptyname: RdsString,
    ptyn_ab: Option<bool>,
    full_tdc: RdsString,
    alt_freq_list: AltFreqList,
    eon_ps_names: HashMap<u16, RdsString>,
    eon_alt_freqs: HashMap<u16, AltFreqList>,
    oda_app_for_group: HashMap<GroupType, u16>,
}

impl Station {
    pub fn new(pi: u16, options: Options) -> Self {
        Self {
            pi,
            options,
            last_group_had_pi: false,
            ps: RdsString::new(8),
            radiotext: RdsString::new(64),
            rt_ab: None,
            rt_prev_candidate: String::new(),
            ptyname: RdsString::new(8),
            ptyn_ab: None,
            full_tdc: RdsString::new(128),
            alt_freq_list: AltFreqList::new(),
            eon_ps_names: HashMap::new(),
            eon_alt_freqs: HashMap::new(),
            oda_app_for_group: HashMap::new(),
        }
    }

    pub fn pi(&self) -> u16 {
        self.pi
    }

    /// Dispatch one group and return its JSON message, or `None` when the
    /// group is dropped (empty, or missing PI more than once in a row).
    pub fn update(&mut self, group: &Group) -> Option<Value> {
        // Allow a single group with missed PI; drop subsequent misses.
        if group.pi().is_some() {
            self.last_group_had_pi = true;
        } else if self.last_group_had_pi {
            self.last_group_had_pi = false;
        } else {
            return None;
        }

        if group.is_empty() {
            return None;
        }

        let mut json = Map::new();
        put(&mut json, "pi", format!("0x{:04X}", self.pi));

        if self.options.timestamp {
            if let Some(t) = group.rx_time() {
                if let Ok(elapsed) = t.duration_since(SystemTime::UNIX_EPOCH) {
                    put(&mut json, "rx_time", elapsed.as_secs_f64());
                }
            }
        }

        if let Some(bler) = group.bler() {
            put(&mut json, "bler", (bler + 0.5) as i64);
        }

        if self.options.show_raw {
            put(&mut json, "raw_data", group.to_hex());
        }

        self.decode_basics(group, &mut json);

        if group.has_type() {
            let group_type = group.group_type();
            trace!(group = %group_type, "dispatching group");

            let number = group_type.number;
            let version = group_type.version;

            // Types with a primary function come first; 3A-registered
            // types go to their ODA; everything else falls through to the
            // unknown-ODA sink.
            if number == 0 {
                self.decode_type0(group, &mut json);
            } else if number == 1 {
                self.decode_type1(group, &mut json);
            } else if number == 2 {
                self.decode_type2(group, &mut json);
            } else if number == 3 && version == Version::A {
                self.decode_type3a(group, &mut json);
            } else if number == 4 && version == Version::A {
                self.decode_type4a(group, &mut json);
            } else if number == 10 && version == Version::A {
                self.decode_type10a(group, &mut json);
            } else if number == 14 {
                self.decode_type14(group, &mut json);
            } else if number == 15 && version == Version::B {
                self.decode_type15b(group, &mut json);
            } else if self.oda_app_for_group.contains_key(&group_type) {
                self.decode_oda_group(group, &mut json);
            } else if number == 5 {
                self.decode_type5(group, &mut json);
            } else if number == 6 {
                self.decode_type6(group, &mut json);
            } else if number == 7 && version == Version::A {
                add_debug(&mut json, "TODO: 7A");
            } else if number == 8 && version == Version::A {
                // TMC lives in an external decoder.
                add_debug(&mut json, "TMC user group (not decoded)");
            } else if number == 9 && version == Version::A {
                add_debug(&mut json, "TODO: 9A");
            } else {
                self.decode_oda_group(group, &mut json);
            }
        }

        Some(Value::Object(json))
    }

    fn decode_basics(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if group.has(BLOCK2) {
            if group.has_type() {
                put(json, "group", group.group_type().to_string());
            }
            put(json, "tp", bits(group.get(BLOCK2), 10, 1) == 1);
            put(json, "pty", bits(group.get(BLOCK2), 5, 5));
        } else if group.group_type().number == 15
            && group.group_type().version == Version::B
            && group.has(BLOCK4)
        {
            put(json, "group", group.group_type().to_string());
            put(json, "tp", bits(group.get(BLOCK4), 10, 1) == 1);
            put(json, "pty", bits(group.get(BLOCK4), 5, 5));
        }
    }

    // Group 0: basic tuning and switching information.
    fn decode_type0(&mut self, group: &Group, json: &mut Map<String, Value>) {
        let segment_address = bits(group.get(BLOCK2), 0, 2);
        let is_di = bits(group.get(BLOCK2), 2, 1) == 1;
        put(nested(json, "di"), di_code_name(segment_address), is_di);
        put(json, "ta", bits(group.get(BLOCK2), 4, 1) == 1);
        put(json, "is_music", bits(group.get(BLOCK2), 3, 1) == 1);

        if !group.has(BLOCK3) {
            // A Method B list must not mix segments from different lists.
            if self.alt_freq_list.is_method_b() {
                self.alt_freq_list.clear();
            }
        } else if group.group_type().version == Version::A {
            self.alt_freq_list.insert(bits(group.get(BLOCK3), 8, 8));
            self.alt_freq_list.insert(bits(group.get(BLOCK3), 0, 8));

            if self.alt_freq_list.is_complete() {
                self.decode_alt_freqs(json);
                self.alt_freq_list.clear();
            } else if self.options.show_partial {
                let raw: Vec<u32> = self.alt_freq_list.raw_list().to_vec();
                put(json, "partial_alt_frequencies", raw);
            }
        }

        if !group.has(BLOCK4) {
            return;
        }

        self.ps.set_pair(
            usize::from(segment_address) * 2,
            bits(group.get(BLOCK4), 8, 8) as u8,
            bits(group.get(BLOCK4), 0, 8) as u8,
        );

        if self.ps.is_complete() {
            put(json, "ps", self.ps.last_complete_string());
        } else if self.options.show_partial {
            put(json, "partial_ps", self.ps.str());
        }
    }

    fn decode_alt_freqs(&mut self, json: &mut Map<String, Value>) {
        let raw_frequencies = self.alt_freq_list.raw_list();

        // Method B sends longer lists pairing every alternative with the
        // tuned frequency, which lets it mark regional variants.
        if self.alt_freq_list.is_method_b() {
            let tuned_frequency = raw_frequencies[0];

            let mut alternatives: Vec<u32> = Vec::new();
            let mut regional_variants: Vec<u32> = Vec::new();

            for pair in raw_frequencies[1..].chunks_exact(2) {
                let non_tuned = if pair[0] == tuned_frequency {
                    pair[1]
                } else {
                    pair[0]
                };
                // An inverted pair marks the non-tuned side as a regional
                // variant of the programme.
                if pair[0] < pair[1] {
                    alternatives.push(non_tuned);
                } else {
                    regional_variants.push(non_tuned);
                }
            }

            // In noise we may have mixed up two lists; duplicate
            // frequencies give that away.
            let mut unique: Vec<u32> =
                alternatives.iter().chain(&regional_variants).copied().collect();
            unique.sort_unstable();
            unique.dedup();
            let expected = raw_frequencies.len() / 2;

            if unique.len() == expected {
                let b = nested(json, "alt_frequencies_b");
                put(b, "tuned_frequency", tuned_frequency);
                put(b, "same_programme", alternatives);
                put(b, "regional_variants", regional_variants);
            }
        } else {
            put(json, "alt_frequencies_a", raw_frequencies.to_vec());
        }
    }

    // Group 1: programme item number and slow labelling codes.
    fn decode_type1(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !(group.has(BLOCK3) && group.has(BLOCK4)) {
            return;
        }

        let pin = group.get(BLOCK4);
        if pin != 0x0000 && !decode_pin(pin, json) {
            add_debug(json, "invalid PIN");
        }

        if group.group_type().version != Version::A {
            return;
        }

        put(json, "has_linkage", bits(group.get(BLOCK3), 15, 1) == 1);

        let variant = bits(group.get(BLOCK3), 12, 3);
        match variant {
            0 => {
                let ecc = bits(group.get(BLOCK3), 0, 8);
                if ecc != 0x00 {
                    put(json, "ecc", ecc);
                    put(json, "country_code", bits(self.pi, 12, 4));
                }
            }
            1 => {
                put(json, "tmc_id", bits(group.get(BLOCK3), 0, 12));
            }
            3 => {
                put(json, "language_code", bits(group.get(BLOCK3), 0, 8));
            }
            7 => {
                put(json, "ews", bits(group.get(BLOCK3), 0, 12));
            }
            _ => {
                add_debug(json, format!("TODO: SLC variant {variant}"));
            }
        }
    }

    // Group 2: RadioText. Three practices exist for message length: a 0x0D
    // terminator, a full 64-character padded message, or neither. The last
    // one is only trusted once the same full message is seen twice.
    fn decode_type2(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !(group.has(BLOCK3) && group.has(BLOCK4)) {
            return;
        }

        let version = group.group_type().version;
        let position = usize::from(bits(group.get(BLOCK2), 0, 4))
            * (if version == Version::A { 4 } else { 2 });

        let ab = bits(group.get(BLOCK2), 4, 1) == 1;
        let is_ab_changed = self.rt_ab.is_some_and(|prev| prev != ab);
        self.rt_ab = Some(ab);

        let mut candidate = String::new();
        let mut has_candidate = position == 0
            && self.radiotext.received_length() > 1
            && !self.radiotext.is_complete()
            && !self.radiotext.has_previously_received_terminators();

        if has_candidate {
            candidate = self.radiotext.str().trim_end().to_owned();
            // Wait for a repeat before trusting a message without a
            // terminator; the first sighting may just be truncated.
            if candidate != self.rt_prev_candidate {
                has_candidate = false;
            }
            self.rt_prev_candidate = candidate.clone();
        }

        // The transmitter requests a buffer clear before changing the
        // message. Sometimes overused in the wild.
        if is_ab_changed {
            self.radiotext.clear();
        }

        if version == Version::A {
            self.radiotext.resize(64);
            self.radiotext.set_pair(
                position,
                bits(group.get(BLOCK3), 8, 8) as u8,
                bits(group.get(BLOCK3), 0, 8) as u8,
            );
        } else {
            self.radiotext.resize(32);
        }

        self.radiotext.set_pair(
            position + if version == Version::A { 2 } else { 0 },
            bits(group.get(BLOCK4), 8, 8) as u8,
            bits(group.get(BLOCK4), 0, 8) as u8,
        );

        if self.radiotext.is_complete() {
            put(
                json,
                "radiotext",
                self.radiotext.last_complete_string().trim_end(),
            );
        } else if has_candidate {
            put(json, "radiotext", candidate);
        } else if self.options.show_partial
            && !self.radiotext.str().trim_end().is_empty()
        {
            put(json, "partial_radiotext", self.radiotext.str());
        }
    }

    // Group 3A: application identification for Open Data.
    fn decode_type3a(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !(group.has(BLOCK3) && group.has(BLOCK4)) {
            return;
        }
        if group.group_type().version != Version::A {
            return;
        }

        let oda_group_type = GroupType::from_code(bits(group.get(BLOCK2), 0, 5));
        let oda_message = group.get(BLOCK3);
        let oda_app_id = group.get(BLOCK4);

        self.oda_app_for_group.insert(oda_group_type, oda_app_id);
        trace!(app_id = %format!("0x{oda_app_id:04X}"), oda_group = %oda_group_type,
            "open data application registered");

        let oda = nested(json, "open_data_app");
        put(oda, "oda_group", oda_group_type.to_string());
        put(oda, "app_id", format!("0x{oda_app_id:04X}"));

        match oda_app_id {
            0xCD46 | 0xCD47 => {
                add_debug(json, "TMC system group (not decoded)");
            }
            _ => {
                put(nested(json, "open_data_app"), "message", oda_message);
            }
        }
    }

    // Group 4A: clock-time and date.
    fn decode_type4a(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !(group.has(BLOCK3) && group.has(BLOCK4)) {
            return;
        }

        let mjd = bits_wide(group.get(BLOCK2), group.get(BLOCK3), 1, 17);
        let hour = bits_wide(group.get(BLOCK3), group.get(BLOCK4), 12, 5);
        let minute = bits(group.get(BLOCK4), 6, 6);

        let offset_sign = if bits(group.get(BLOCK4), 5, 1) == 1 { -1 } else { 1 };
        let offset_half_hours = offset_sign * i32::from(bits(group.get(BLOCK4), 0, 5));
        let offset_minutes = offset_half_hours * 30;

        let is_valid = mjd >= 15_079
            && hour <= 23
            && minute <= 59
            && (offset_half_hours / 2).abs() <= 14;
        if !is_valid {
            add_debug(json, "invalid date/time");
            return;
        }

        // Apply the local offset with day carry, then convert.
        let mut local_mjd = i64::from(mjd);
        let mut minutes_of_day =
            hour as i32 * 60 + i32::from(minute) + offset_minutes;
        if minutes_of_day < 0 {
            minutes_of_day += 24 * 60;
            local_mjd -= 1;
        } else if minutes_of_day >= 24 * 60 {
            minutes_of_day -= 24 * 60;
            local_mjd += 1;
        }

        let (year, month, day) = mjd_to_ymd(local_mjd as u32);
        let zone = if offset_minutes == 0 {
            "Z".to_owned()
        } else {
            format!(
                "{}{:02}:{:02}",
                if offset_minutes < 0 { '-' } else { '+' },
                offset_minutes.abs() / 60,
                offset_minutes.abs() % 60
            )
        };

        put(
            json,
            "clock_time",
            format!(
                "{year:04}-{month:02}-{day:02}T{:02}:{:02}:00{zone}",
                minutes_of_day / 60,
                minutes_of_day % 60
            ),
        );
    }

    // Group 5: transparent data channels.
    fn decode_type5(&mut self, group: &Group, json: &mut Map<String, Value>) {
        let address = bits(group.get(BLOCK2), 0, 5);
        put(nested(json, "transparent_data"), "address", address);

        if group.group_type().version == Version::A {
            let data = [
                bits(group.get(BLOCK3), 8, 8) as u8,
                bits(group.get(BLOCK3), 0, 8) as u8,
                bits(group.get(BLOCK4), 8, 8) as u8,
                bits(group.get(BLOCK4), 0, 8) as u8,
            ];

            let raw = data
                .iter()
                .map(|&b| hex_string(u32::from(b), 2))
                .collect::<Vec<_>>()
                .join(" ");
            let text: String = data.iter().map(|&b| printable(b)).collect();

            self.full_tdc.set_pair(usize::from(address) * 4, data[0], data[1]);
            self.full_tdc
                .set_pair(usize::from(address) * 4 + 2, data[2], data[3]);
            if self.full_tdc.is_complete() {
                put(
                    nested(json, "transparent_data"),
                    "full_text",
                    self.full_tdc.str(),
                );
            }

            let tdc = nested(json, "transparent_data");
            put(tdc, "raw", raw);
            put(tdc, "as_text", text);
        } else {
            let data = [
                bits(group.get(BLOCK4), 8, 8) as u8,
                bits(group.get(BLOCK4), 0, 8) as u8,
            ];
            let tdc = nested(json, "transparent_data");
            put(
                tdc,
                "raw",
                format!(
                    "{} {}",
                    hex_string(u32::from(data[0]), 2),
                    hex_string(u32::from(data[1]), 2)
                ),
            );
            put(tdc, "as_text", data.iter().map(|&b| printable(b)).collect::<String>());
        }
    }

    // Group 6: in-house applications; raw payload only.
    fn decode_type6(&mut self, group: &Group, json: &mut Map<String, Value>) {
        let mut payload: Vec<Value> = vec![bits(group.get(BLOCK2), 0, 5).into()];
        if group.group_type().version == Version::A {
            if group.has(BLOCK3) {
                payload.push(group.get(BLOCK3).into());
                if group.has(BLOCK4) {
                    payload.push(group.get(BLOCK4).into());
                }
            }
        } else if group.has(BLOCK4) {
            payload.push(group.get(BLOCK4).into());
        }
        put(json, "in_house_data", payload);
    }

    // Group 10A: programme type name.
    fn decode_type10a(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !group.has(BLOCK3) || !group.has(BLOCK4) {
            return;
        }

        let segment_address = bits(group.get(BLOCK2), 0, 1);
        let ab = bits(group.get(BLOCK2), 4, 1) == 1;
        if self.ptyn_ab.is_some_and(|prev| prev != ab) {
            self.ptyname.clear();
        }
        self.ptyn_ab = Some(ab);

        self.ptyname.set_pair(
            usize::from(segment_address) * 4,
            bits(group.get(BLOCK3), 8, 8) as u8,
            bits(group.get(BLOCK3), 0, 8) as u8,
        );
        self.ptyname.set_pair(
            usize::from(segment_address) * 4 + 2,
            bits(group.get(BLOCK4), 8, 8) as u8,
            bits(group.get(BLOCK4), 0, 8) as u8,
        );

        if self.ptyname.is_complete() {
            put(json, "pty_name", self.ptyname.last_complete_string());
        }
    }

    // Group 14: enhanced other networks information.
    fn decode_type14(&mut self, group: &Group, json: &mut Map<String, Value>) {
        if !group.has(BLOCK4) {
            return;
        }

        let on_pi = group.get(BLOCK4);
        put(nested(json, "other_network"), "pi", format!("0x{on_pi:04X}"));
        put(
            nested(json, "other_network"),
            "tp",
            bits(group.get(BLOCK2), 4, 1) == 1,
        );

        if group.group_type().version == Version::B {
            put(
                nested(json, "other_network"),
                "ta",
                bits(group.get(BLOCK2), 3, 1) == 1,
            );
            return;
        }

        if !group.has(BLOCK3) {
            return;
        }

        let eon_variant = bits(group.get(BLOCK2), 0, 4);
        match eon_variant {
            0..=3 => {
                let ps = self
                    .eon_ps_names
                    .entry(on_pi)
                    .or_insert_with(|| RdsString::new(8));
                ps.set_pair(
                    usize::from(eon_variant) * 2,
                    bits(group.get(BLOCK3), 8, 8) as u8,
                    bits(group.get(BLOCK3), 0, 8) as u8,
                );
                if ps.is_complete() {
                    let name = ps.last_complete_string().to_owned();
                    put(nested(json, "other_network"), "ps", name);
                }
            }
            4 => {
                let list = self.eon_alt_freqs.entry(on_pi).or_default();
                list.insert(bits(group.get(BLOCK3), 8, 8));
                list.insert(bits(group.get(BLOCK3), 0, 8));
                if list.is_complete() {
                    let freqs = list.raw_list().to_vec();
                    list.clear();
                    put(nested(json, "other_network"), "alt_frequencies", freqs);
                }
            }
            5..=9 => {
                let freq = CarrierFrequency::new(bits(group.get(BLOCK3), 0, 8), Band::Fm);
                if freq.is_valid() {
                    put(nested(json, "other_network"), "kilohertz", freq.khz());
                }
            }
            12 => {
                let has_linkage = bits(group.get(BLOCK3), 15, 1) == 1;
                let lsn = bits(group.get(BLOCK3), 0, 12);
                put(nested(json, "other_network"), "has_linkage", has_linkage);
                if has_linkage && lsn != 0 {
                    put(nested(json, "other_network"), "linkage_set", lsn);
                }
            }
            13 => {
                let other = nested(json, "other_network");
                put(other, "pty", bits(group.get(BLOCK3), 11, 5));
                put(other, "ta", bits(group.get(BLOCK3), 0, 1) == 1);
            }
            14 => {
                let pin = group.get(BLOCK3);
                if pin != 0x0000 {
                    decode_pin(pin, nested(json, "other_network"));
                }
            }
            15 => {
                put(
                    nested(json, "other_network"),
                    "broadcaster_data",
                    hex_string(u32::from(group.get(BLOCK3)), 4),
                );
            }
            _ => {
                add_debug(json, format!("TODO: EON variant {eon_variant}"));
            }
        }
    }

    // Group 15B: fast basic tuning and switching information.
    fn decode_type15b(&mut self, group: &Group, json: &mut Map<String, Value>) {
        let block = if group.has(BLOCK2) { BLOCK2 } else { BLOCK4 };
        put(json, "ta", bits(group.get(block), 4, 1) == 1);
        put(json, "is_music", bits(group.get(block), 3, 1) == 1);
    }

    // Open Data Applications: registered apps get their id attached,
    // everything else lands in the unknown-ODA sink.
    fn decode_oda_group(&mut self, group: &Group, json: &mut Map<String, Value>) {
        let raw_data = format!(
            "{} {} {}",
            hex_string(u32::from(group.get(BLOCK2)) & 0b11111, 2),
            if group.has(BLOCK3) {
                hex_string(u32::from(group.get(BLOCK3)), 4)
            } else {
                "----".to_owned()
            },
            if group.has(BLOCK4) {
                hex_string(u32::from(group.get(BLOCK4)), 4)
            } else {
                "----".to_owned()
            },
        );

        let app_id = self.oda_app_for_group.get(&group.group_type()).copied();
        let sink = nested(json, "unknown_oda");
        if let Some(app_id) = app_id {
            put(sink, "app_id", format!("0x{app_id:04X}"));
        }
        put(sink, "raw_data", raw_data);

        if let Some(0xCD46 | 0xCD47) = app_id {
            add_debug(json, "TMC user group (not decoded)");
        }
    }
}

#[cfg(test)]
#[path = "station_tests.rs"]
mod tests;

//! Alternative-frequency codes and lists (IEC 62106, section 6.2.1.6).

/// Broadcast band selected by a preceding "LF/MF follows" code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    LfMf,
    Fm,
}

/// A carrier frequency encoded as an 8-bit AF code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarrierFrequency {
    code: u16,
    band: Band,
}

impl CarrierFrequency {
    pub fn new(code: u16, band: Band) -> Self {
        Self { code, band }
    }

    pub fn is_valid(&self) -> bool {
        match self.band {
            Band::Fm => (1..=204).contains(&self.code),
            Band::LfMf => (1..=135).contains(&self.code),
        }
    }

    /// Decoded frequency in kilohertz. FM codes map to 87.6–107.9 MHz in
    /// 100 kHz steps; LF/MF codes to the 9 kHz AM raster.
    pub fn khz(&self) -> u32 {
        match self.band {
            Band::Fm => 87_500 + 100 * u32::from(self.code),
            Band::LfMf => {
                if self.code <= 15 {
                    153 + 9 * (u32::from(self.code) - 1)
                } else {
                    531 + 9 * (u32::from(self.code) - 16)
                }
            }
        }
    }
}

/// Accumulates one alternative-frequency list from successive 0A groups.
///
/// A list starts with a 224+N "N frequencies follow" header and is complete
/// after N valid frequency codes. Code 205 is filler, 250 announces a single
/// LF/MF frequency next.
#[derive(Clone, Debug)]
pub struct AltFreqList {
    alt_freqs: [u32; 25],
    num_expected: usize,
    num_received: usize,
    lf_mf_follows: bool,
}

impl AltFreqList {
    pub fn new() -> Self {
        Self {
            alt_freqs: [0; 25],
            num_expected: 0,
            num_received: 0,
            lf_mf_follows: false,
        }
    }

    pub fn insert(&mut self, af_code: u16) {
        let freq = CarrierFrequency::new(
            af_code,
            if self.lf_mf_follows { Band::LfMf } else { Band::Fm },
        );
        self.lf_mf_follows = false;

        if freq.is_valid() && self.num_expected > 0 {
            if self.num_received < self.alt_freqs.len() {
                self.alt_freqs[self.num_received] = freq.khz();
                self.num_received += 1;
            }
        } else if af_code == 205 {
            // Filler.
        } else if (225..=249).contains(&af_code) {
            self.num_expected = usize::from(af_code) - 224;
            self.num_received = 0;
        } else if af_code == 250 {
            self.lf_mf_follows = true;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.num_expected > 0 && self.num_received == self.num_expected
    }

    /// Method B heuristic: the list has odd length and the first received
    /// frequency (the tuned one) appears in every subsequent pair.
    pub fn is_method_b(&self) -> bool {
        if self.num_received % 2 == 0 || self.num_received < 3 {
            return false;
        }
        let tuned = self.alt_freqs[0];
        self.alt_freqs[1..self.num_received]
            .chunks_exact(2)
            .all(|pair| pair[0] == tuned || pair[1] == tuned)
    }

    /// Frequencies received so far, in kHz, in reception order.
    pub fn raw_list(&self) -> &[u32] {
        &self.alt_freqs[..self.num_received]
    }

    pub fn clear(&mut self) {
        self.num_expected = 0;
        self.num_received = 0;
        self.lf_mf_follows = false;
    }
}

impl Default for AltFreqList {
    fn default() -> Self {
        Self::new()
    }
}

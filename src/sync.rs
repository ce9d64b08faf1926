//! Block and group synchronization with burst-error correction.
//!
//! The synchronizer slides a 26-bit window over the incoming bit stream.
//! While out of sync it inspects every bit position for words whose
//! syndrome matches one of the five offset words, and watches for a
//! repeating block rhythm; once locked it only decides every 26 bits,
//! attempts burst correction against the expected offset, and assembles
//! groups. Sync is dropped when more than 45 of the last 50 blocks were
//! in error (EN 50067, section C.1.2).

use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::group::{Block, Group, Offset};
use crate::util::{RunningAverage, RunningSum};

pub(crate) const BLOCK_LENGTH: u32 = 26;
const BLOCK_BITMASK: u32 = (1 << BLOCK_LENGTH) - 1;
const CHECKWORD_LENGTH: u32 = 10;

/// Sync is lost when more errored blocks than this land in the 50-block
/// window.
const MAX_ERRORS_IN_WINDOW: u32 = 45;

/// Groups averaged for the per-group BLER figure.
const BLER_AVERAGE_GROUPS: usize = 12;

/// Parity-check matrix of the RDS shortened cyclic code, one 10-bit row per
/// received bit (EN 50067, annex B.1.1). The first ten rows are the
/// identity over the checkword.
const PARITY_CHECK_MATRIX: [u16; 26] = [
    0b1000000000,
    0b0100000000,
    0b0010000000,
    0b0001000000,
    0b0000100000,
    0b0000010000,
    0b0000001000,
    0b0000000100,
    0b0000000010,
    0b0000000001,
    0b1011011100,
    0b0101101110,
    0b0010110111,
    0b1010000111,
    0b1110011111,
    0b1100010011,
    0b1101010101,
    0b1101110110,
    0b0110111011,
    0b1000000001,
    0b1111011100,
    0b0111101110,
    0b0011110111,
    0b1010100111,
    0b1110001111,
    0b1100011011,
];

/// Multiply a received 26-bit word by the parity-check matrix over GF(2):
/// the modulo-two sum of the rows whose corresponding received bit is 1.
pub fn syndrome(word: u32) -> u16 {
    let mut result = 0u16;
    for k in 0..26 {
        if (word >> k) & 1 != 0 {
            result ^= PARITY_CHECK_MATRIX[25 - k];
        }
    }
    result
}

// Syndromes of error-free blocks, one per offset word
// (IEC 62106:2015, section B.3.1, table B.1).
const SYNDROME_A: u16 = 0b1111011000;
const SYNDROME_B: u16 = 0b1111010100;
const SYNDROME_C: u16 = 0b1001011100;
const SYNDROME_C_PRIME: u16 = 0b1111001100;
const SYNDROME_D: u16 = 0b1001011000;

/// Label a block by its syndrome value.
pub fn offset_for_syndrome(syndrome: u16) -> Offset {
    match syndrome {
        SYNDROME_A => Offset::A,
        SYNDROME_B => Offset::B,
        SYNDROME_C => Offset::C,
        SYNDROME_C_PRIME => Offset::Cprime,
        SYNDROME_D => Offset::D,
        _ => Offset::Invalid,
    }
}

// The offset words themselves, XORed into the checkword by the transmitter.
const OFFSET_WORDS: [(Offset, u32); 5] = [
    (Offset::A, 0b0011111100),
    (Offset::B, 0b0110011000),
    (Offset::C, 0b0101101000),
    (Offset::Cprime, 0b1101010000),
    (Offset::D, 0b0110110100),
];

fn offset_table_index(offset: Offset) -> Option<usize> {
    match offset {
        Offset::A => Some(0),
        Offset::B => Some(1),
        Offset::C => Some(2),
        Offset::Cprime => Some(3),
        Offset::D => Some(4),
        Offset::Invalid => None,
    }
}

/// Precomputed mapping of (syndrome, expected offset) to the error vector
/// that produced it, for all single-bit and two-adjacent-bit bursts.
///
/// Kopitz & Marks 1999, p. 224: correction should be restricted to bursts
/// spanning one or two bits.
struct ErrorLookupTable {
    tables: [Vec<(u16, u32)>; 5],
}

impl ErrorLookupTable {
    fn new() -> Self {
        let mut tables: [Vec<(u16, u32)>; 5] = Default::default();

        for (i, &(_, offset_word)) in OFFSET_WORDS.iter().enumerate() {
            for error_bits in [0b1u32, 0b11u32] {
                for shift in 0..BLOCK_LENGTH {
                    let error_vector = (error_bits << shift) & BLOCK_BITMASK;
                    let key = syndrome(error_vector ^ offset_word);
                    tables[i].push((key, error_vector));
                }
            }
        }

        Self { tables }
    }

    fn lookup(&self, syndrome: u16, expected_offset: Offset) -> Option<u32> {
        let index = offset_table_index(expected_offset)?;
        self.tables[index]
            .iter()
            .find(|&&(key, _)| key == syndrome)
            .map(|&(_, error_vector)| error_vector)
    }
}

fn error_lookup() -> &'static ErrorLookupTable {
    static TABLE: OnceLock<ErrorLookupTable> = OnceLock::new();
    TABLE.get_or_init(ErrorLookupTable::new)
}

/// Attempt burst correction of `raw` against the offset we expected at this
/// position. Returns the corrected word on success.
pub(crate) fn correct_burst_errors(raw: u32, expected_offset: Offset) -> Option<u32> {
    error_lookup()
        .lookup(syndrome(raw), expected_offset)
        .map(|error_vector| raw ^ error_vector)
}

/// A sighting of a valid offset word at some bit position.
#[derive(Clone, Copy, Debug)]
struct SyncPulse {
    offset: Offset,
    bitcount: u64,
}

impl Default for SyncPulse {
    fn default() -> Self {
        Self { offset: Offset::Invalid, bitcount: 0 }
    }
}

impl SyncPulse {
    /// Whether `self` could be a later block of the same transmission as
    /// `other`: a whole number of block lengths apart, within six block
    /// slots, and with block numbers that agree modulo the group cycle.
    fn could_follow(&self, other: &SyncPulse) -> bool {
        if other.offset == Offset::Invalid {
            return false;
        }
        let distance = self.bitcount - other.bitcount;
        if distance % u64::from(BLOCK_LENGTH) != 0 {
            return false;
        }
        let blocks_apart = distance / u64::from(BLOCK_LENGTH);
        (1..=6).contains(&blocks_apart)
            && (other.offset.block_index() + blocks_apart as usize) % 4
                == self.offset.block_index()
    }
}

/// Ring of the last four offset-word sightings, oldest first.
#[derive(Clone, Debug, Default)]
struct SyncPulseBuffer {
    pulses: [SyncPulse; 4],
}

impl SyncPulseBuffer {
    fn push(&mut self, offset: Offset, bitcount: u64) {
        for i in 0..self.pulses.len() - 1 {
            self.pulses[i] = self.pulses[i + 1];
        }
        self.pulses[3] = SyncPulse { offset, bitcount };
    }

    /// A block-grid hypothesis exists when the latest sighting lines up
    /// with any earlier one.
    fn is_sequence_found(&self) -> bool {
        let latest = &self.pulses[3];
        self.pulses[..3].iter().any(|prev| latest.could_follow(prev))
    }
}

/// The block synchronizer and group assembler.
///
/// Push demodulated bits in transmission order with
/// [`push_bit`](Self::push_bit); poll [`has_group_ready`](Self::has_group_ready)
/// and collect groups with [`pop_group`](Self::pop_group). Strictly
/// synchronous, one instance per channel.
#[derive(Clone, Debug)]
pub struct BlockStream {
    input_register: u32,
    bitcount: u64,
    num_bits_until_next_block: u32,
    expected_offset: Offset,
    is_in_sync: bool,
    block_error_sum50: RunningSum<50>,
    bler_average: RunningAverage<BLER_AVERAGE_GROUPS>,
    sync_buffer: SyncPulseBuffer,
    current_group: Group,
    ready_group: Group,
    has_group_ready: bool,
    num_bits_since_sync_lost: u64,
}

impl BlockStream {
    pub fn new() -> Self {
        Self {
            input_register: 0,
            bitcount: 0,
            num_bits_until_next_block: 1,
            expected_offset: Offset::A,
            is_in_sync: false,
            block_error_sum50: RunningSum::new(),
            bler_average: RunningAverage::new(),
            sync_buffer: SyncPulseBuffer::default(),
            current_group: Group::new(),
            ready_group: Group::new(),
            has_group_ready: false,
            num_bits_since_sync_lost: 0,
        }
    }

    /// Ingest one bit. Non-blocking; a completed group is staged for
    /// [`pop_group`](Self::pop_group).
    pub fn push_bit(&mut self, bit: bool) {
        self.input_register = (self.input_register << 1) | u32::from(bit);
        self.bitcount += 1;
        self.num_bits_until_next_block -= 1;

        if self.num_bits_until_next_block == 0 {
            self.find_block_in_input_register();
            self.num_bits_until_next_block =
                if self.is_in_sync { BLOCK_LENGTH } else { 1 };
        }
    }

    pub fn has_group_ready(&self) -> bool {
        self.has_group_ready
    }

    /// Consume the staged group. Afterwards
    /// [`has_group_ready`](Self::has_group_ready) is false.
    pub fn pop_group(&mut self) -> Group {
        self.has_group_ready = false;
        self.ready_group.clone()
    }

    /// Snapshot the in-progress group without disturbing assembly. Useful
    /// at end of stream.
    pub fn flush_current_group(&self) -> Group {
        self.current_group.clone()
    }

    pub fn is_in_sync(&self) -> bool {
        self.is_in_sync
    }

    pub fn num_bits_since_sync_lost(&self) -> u64 {
        self.num_bits_since_sync_lost
    }

    fn acquire_sync(&mut self, block: &Block) {
        if self.is_in_sync {
            return;
        }

        self.num_bits_since_sync_lost += 1;

        if block.offset != Offset::Invalid {
            self.sync_buffer.push(block.offset, self.bitcount);

            if self.sync_buffer.is_sequence_found() {
                debug!(offset = ?block.offset, bit = self.bitcount, "block sync acquired");
                self.is_in_sync = true;
                self.expected_offset = block.offset;
                self.current_group = Group::new();
                self.num_bits_since_sync_lost = 0;
            }
        }
    }

    fn handle_uncorrectable_error(&mut self) {
        if self.is_in_sync && self.block_error_sum50.sum() > MAX_ERRORS_IN_WINDOW {
            debug!(bit = self.bitcount, "block sync lost");
            self.is_in_sync = false;
            self.block_error_sum50.clear();
        }
    }

    fn find_block_in_input_register(&mut self) {
        let mut block = Block {
            raw: self.input_register & BLOCK_BITMASK,
            ..Block::default()
        };
        block.offset = offset_for_syndrome(syndrome(block.raw));

        self.acquire_sync(&block);

        if !self.is_in_sync {
            return;
        }

        // A C' in slot 3 announces a version B group; follow it.
        if self.expected_offset == Offset::C && block.offset == Offset::Cprime {
            self.expected_offset = Offset::Cprime;
        }

        block.had_errors = block.offset != self.expected_offset;
        self.block_error_sum50.push(u32::from(block.had_errors));

        block.data = (block.raw >> CHECKWORD_LENGTH) as u16;

        if block.had_errors {
            match correct_burst_errors(block.raw, self.expected_offset) {
                Some(corrected) => {
                    trace!(
                        offset = ?self.expected_offset,
                        raw = %format!("0x{:07X}", block.raw),
                        corrected = %format!("0x{corrected:07X}"),
                        "burst error corrected"
                    );
                    block.data = (corrected >> CHECKWORD_LENGTH) as u16;
                    block.offset = self.expected_offset;
                }
                None => self.handle_uncorrectable_error(),
            }
        }

        // Error-free or successfully corrected.
        if block.offset == self.expected_offset {
            block.is_received = true;
            self.current_group
                .set_block(self.expected_offset.block_index(), block);
        }

        self.expected_offset = self.expected_offset.next();

        if self.expected_offset == Offset::A {
            self.handle_newly_received_group();
        }
    }

    fn handle_newly_received_group(&mut self) {
        let mut group = std::mem::take(&mut self.current_group);
        self.bler_average
            .push(100.0 * group.num_errors() as f32 / 4.0);
        group.set_bler(self.bler_average.average());
        trace!(blocks = 4 - group.num_errors(), "group assembled");
        self.ready_group = group;
        self.has_group_ready = true;
    }
}

impl Default for BlockStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

#![allow(dead_code)]

use sidecarrier::sync::{offset_for_syndrome, syndrome};
use sidecarrier::{BlockStream, Offset};

/// Brute-force the checkword that turns `data` into a valid block carrying
/// the given offset word.
pub fn make_block(data: u16, offset: Offset) -> u32 {
    (0..1024u32)
        .map(|checkword| (u32::from(data) << 10) | checkword)
        .find(|&raw| offset_for_syndrome(syndrome(raw)) == offset)
        .expect("a checkword exists for every data word and offset")
}

/// A 26-bit word in transmission order (MSB first).
pub fn block_bits(word: u32) -> Vec<bool> {
    (0..26).rev().map(|i| (word >> i) & 1 == 1).collect()
}

/// One whole group, offsets A, B, C, D.
pub fn group_bits(datas: [u16; 4]) -> Vec<bool> {
    let offsets = [Offset::A, Offset::B, Offset::C, Offset::D];
    datas
        .iter()
        .zip(offsets)
        .flat_map(|(&data, offset)| block_bits(make_block(data, offset)))
        .collect()
}

pub fn push_all(stream: &mut BlockStream, bits: &[bool]) {
    for &bit in bits {
        stream.push_bit(bit);
    }
}

/// An unrecognizable block: the all-ones word matches no offset syndrome
/// and no correctable error pattern.
pub fn garbage_block_bits() -> Vec<bool> {
    block_bits(0x3FF_FFFF)
}

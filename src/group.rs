//! The RDS block and group data model.
//!
//! A block is a 26-bit word: 16 information bits and a 10-bit checkword with
//! an offset word mixed in. Four blocks form a group; the offset word tells
//! each block its slot. Groups carry per-block reception metadata so that
//! downstream decoders can work with partially received groups.

use std::fmt;
use std::time::SystemTime;

use crate::error::Error;
use crate::util::bits;

/// Block slot indices within a group.
pub const BLOCK1: usize = 0;
pub const BLOCK2: usize = 1;
pub const BLOCK3: usize = 2;
pub const BLOCK4: usize = 3;

/// Offset word identity of a block, recovered from its syndrome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Offset {
    A,
    B,
    C,
    Cprime,
    D,
    Invalid,
}

impl Offset {
    /// The group slot this offset belongs to. C′ substitutes for C in
    /// slot 3.
    pub fn block_index(self) -> usize {
        match self {
            Offset::A | Offset::Invalid => BLOCK1,
            Offset::B => BLOCK2,
            Offset::C | Offset::Cprime => BLOCK3,
            Offset::D => BLOCK4,
        }
    }

    /// The offset expected after this one in the A, B, C, D cycle.
    pub fn next(self) -> Offset {
        match self {
            Offset::A => Offset::B,
            Offset::B => Offset::C,
            Offset::C | Offset::Cprime => Offset::D,
            Offset::D => Offset::A,
            Offset::Invalid => Offset::A,
        }
    }
}

/// One received 26-bit block.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    /// The raw 26-bit word as received.
    pub raw: u32,
    /// The 16-bit information field.
    pub data: u16,
    /// Offset identity, possibly rewritten to the expected offset after a
    /// successful burst correction.
    pub offset: Offset,
    /// The block is trustworthy: received error-free or corrected.
    pub is_received: bool,
    /// The raw syndrome did not match the expected offset word.
    pub had_errors: bool,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            raw: 0,
            data: 0,
            offset: Offset::Invalid,
            is_received: false,
            had_errors: false,
        }
    }
}

/// Group version: A (block 3 carries offset C) or B (block 3 carries C′
/// and repeats the PI code).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    #[default]
    A,
    B,
}

/// Group type: a number 0–15 and a version, e.g. 0A or 2B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupType {
    pub number: u8,
    pub version: Version,
}

impl GroupType {
    /// Decode from the 5-bit type code in bits 15…11 of block 2.
    pub fn from_code(code: u16) -> Self {
        Self {
            number: ((code >> 1) & 0xF) as u8,
            version: if code & 0x1 == 0 { Version::A } else { Version::B },
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.number,
            match self.version {
                Version::A => 'A',
                Version::B => 'B',
            }
        )
    }
}

/// Four block slots plus group-level metadata. Immutable once handed to a
/// consumer.
#[derive(Clone, Debug, Default)]
pub struct Group {
    blocks: [Block; 4],
    group_type: GroupType,
    has_type: bool,
    has_c_prime: bool,
    no_offsets: bool,
    bler: Option<f32>,
    rx_time: Option<SystemTime>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Information field of a block slot; zero when the block was not
    /// received. Check [`has`](Self::has) first.
    pub fn get(&self, index: usize) -> u16 {
        self.blocks[index].data
    }

    pub fn has(&self, index: usize) -> bool {
        self.blocks[index].is_received
    }

    pub fn block(&self, index: usize) -> Block {
        self.blocks[index]
    }

    pub fn is_empty(&self) -> bool {
        !self.blocks.iter().any(|b| b.is_received)
    }

    /// The Programme Identifier, from block 1 or from a C′ block 3.
    pub fn pi(&self) -> Option<u16> {
        if self.blocks[BLOCK1].is_received {
            Some(self.blocks[BLOCK1].data)
        } else if self.blocks[BLOCK3].is_received
            && self.blocks[BLOCK3].offset == Offset::Cprime
        {
            Some(self.blocks[BLOCK3].data)
        } else {
            None
        }
    }

    /// Not meaningful until [`has_type`](Self::has_type) is true.
    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn has_type(&self) -> bool {
        self.has_type
    }

    /// Blocks that were missing or took errors, 0–4.
    pub fn num_errors(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|b| b.had_errors || !b.is_received)
            .count() as u32
    }

    pub fn bler(&self) -> Option<f32> {
        self.bler
    }

    pub fn set_bler(&mut self, bler: f32) {
        self.bler = Some(bler);
    }

    pub fn rx_time(&self) -> Option<SystemTime> {
        self.rx_time
    }

    pub fn set_rx_time(&mut self, t: SystemTime) {
        self.rx_time = Some(t);
    }

    /// Mark this group as pre-framed: upstream delivered aligned blocks with
    /// unknown offsets, so type detection must not wait for a C′ sighting.
    pub fn disable_offsets(&mut self) {
        self.no_offsets = true;
    }

    pub fn no_offsets(&self) -> bool {
        self.no_offsets
    }

    /// Install a block and update the group type state.
    ///
    /// The type is read from block 2; version B groups only trust it once a
    /// C′ block has been sighted (or offsets are disabled), since a stray
    /// block 2 without block 1 could equally belong to a (15, B) group. A
    /// group with a C′ sighting but no block 2 gets one more chance from
    /// block 4, for the specific (15, B) case where block 4 repeats the
    /// type code.
    pub fn set_block(&mut self, index: usize, block: Block) {
        self.blocks[index] = block;

        if block.offset == Offset::Cprime {
            self.has_c_prime = true;
        }

        if index == BLOCK2 {
            self.group_type = GroupType::from_code(bits(block.data, 11, 5));
            self.has_type = match self.group_type.version {
                Version::A => true,
                Version::B => self.has_c_prime || self.no_offsets,
            };
        } else if index == BLOCK4 && self.has_c_prime && !self.has_type {
            let potential = GroupType::from_code(bits(block.data, 11, 5));
            if potential.number == 15 && potential.version == Version::B {
                self.group_type = potential;
                self.has_type = true;
            }
        }

        if block.offset == Offset::Cprime && self.has(BLOCK2) {
            self.has_type = self.group_type.version == Version::B;
        }
    }

    /// Render the group as four hex words, RDS Spy style. Blocks that were
    /// not received print as `----`.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(19);
        for index in [BLOCK1, BLOCK2, BLOCK3, BLOCK4] {
            if index != BLOCK1 {
                out.push(' ');
            }
            if self.blocks[index].is_received {
                out.push_str(&format!("{:04X}", self.blocks[index].data));
            } else {
                out.push_str("----");
            }
        }
        out
    }

    /// Parse one capture line of four hex words into a pre-framed group.
    ///
    /// Lowercase hex and the `----` sentinel are accepted; anything after
    /// the fourth word (timestamps and the like) is ignored.
    pub fn parse_hex(line: &str) -> Result<Group, Error> {
        let mut group = Group::new();
        group.disable_offsets();

        let mut words = line.split_whitespace();
        for index in [BLOCK1, BLOCK2, BLOCK3, BLOCK4] {
            let word = words
                .next()
                .ok_or_else(|| Error::MalformedLine(line.to_owned()))?;
            if word == "----" {
                continue;
            }
            let data = u16::from_str_radix(word, 16)
                .map_err(|_| Error::MalformedLine(line.to_owned()))?;
            group.set_block(
                index,
                Block {
                    raw: u32::from(data) << 10,
                    data,
                    offset: Offset::Invalid,
                    is_received: true,
                    had_errors: false,
                },
            );
        }
        Ok(group)
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;

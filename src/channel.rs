//! One logical receive channel: a block stream feeding a station.
//!
//! The [`Receiver`] owns the synchronizer and rebuilds its [`Station`]
//! state whenever the programme identifier changes for real. A PI change
//! has to be seen twice in a row before it is believed; single
//! disagreements are treated as reception errors and the group is dropped.

use std::time::SystemTime;

use serde_json::Value;
use tracing::debug;

use crate::group::Group;
use crate::station::{Options, Station};
use crate::sync::BlockStream;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PiConfirmation {
    NoChange,
    ChangeConfirmed,
    Spurious,
}

/// Tracks the PI code across groups and debounces changes.
#[derive(Clone, Debug, Default)]
struct CachedPi {
    confirmed: Option<u16>,
    previous: Option<u16>,
}

impl CachedPi {
    fn update(&mut self, pi: u16) -> PiConfirmation {
        let result = if self.confirmed == Some(pi) {
            PiConfirmation::NoChange
        } else if self.previous == Some(pi) {
            self.confirmed = Some(pi);
            PiConfirmation::ChangeConfirmed
        } else {
            PiConfirmation::Spurious
        };
        self.previous = Some(pi);
        result
    }
}

/// A complete decode chain for one channel, from bits to JSON messages.
pub struct Receiver {
    block_stream: BlockStream,
    station: Option<Station>,
    cached_pi: CachedPi,
    options: Options,
}

impl Receiver {
    pub fn new(options: Options) -> Self {
        Self {
            block_stream: BlockStream::new(),
            station: None,
            cached_pi: CachedPi::default(),
            options,
        }
    }

    /// Ingest one demodulated bit; returns the decoded message whenever
    /// this bit completed a group.
    pub fn push_bit(&mut self, bit: bool) -> Option<Value> {
        self.block_stream.push_bit(bit);
        if self.block_stream.has_group_ready() {
            let mut group = self.block_stream.pop_group();
            group.set_rx_time(SystemTime::now());
            self.process(group)
        } else {
            None
        }
    }

    /// Run a pre-framed group (e.g. from a hex capture) through the same
    /// dispatch as live groups.
    pub fn process_group(&mut self, mut group: Group) -> Option<Value> {
        group.set_rx_time(SystemTime::now());
        self.process(group)
    }

    /// Decode whatever partial group is in flight. Call at end of stream.
    pub fn flush(&mut self) -> Option<Value> {
        let mut group = self.block_stream.flush_current_group();
        if group.is_empty() {
            return None;
        }
        group.set_rx_time(SystemTime::now());
        self.process(group)
    }

    pub fn block_stream(&self) -> &BlockStream {
        &self.block_stream
    }

    fn process(&mut self, group: Group) -> Option<Value> {
        if let Some(pi) = group.pi() {
            match self.cached_pi.update(pi) {
                PiConfirmation::ChangeConfirmed => {
                    debug!(pi = %format!("0x{pi:04X}"), "PI confirmed, resetting station");
                    self.station = Some(Station::new(pi, self.options.clone()));
                }
                PiConfirmation::Spurious => {
                    debug!(pi = %format!("0x{pi:04X}"), "spurious PI change, dropping group");
                    return None;
                }
                PiConfirmation::NoChange => {}
            }
        }

        self.station.as_mut()?.update(&group)
    }
}

#![doc = include_str!("../readme.md")]

pub mod channel;
pub mod error;
pub mod freq;
pub mod group;
pub mod station;
pub mod sync;
pub mod text;
pub mod util;

// Re-export the main types for convenience
pub use channel::Receiver;
pub use error::{Error, Result};
pub use group::{Block, Group, GroupType, Offset, Version};
pub use station::{Options, Station};
pub use sync::BlockStream;

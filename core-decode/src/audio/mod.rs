//! Audio format primitives: channel roles, layouts, and the
//! interleaved-buffer format converter.

pub mod converter;
pub mod layout;

pub use converter::{AudioConfig, AudioConverter};
pub use layout::{Channel, ChannelLayout};

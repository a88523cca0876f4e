//! Decoder session implementations.

pub mod vorbis;

pub use vorbis::{vorbis_layout, VorbisDataDecoder};

//! # Streaming Decode Core
//!
//! Stateful decoder sessions that sit between a demuxer and a playback
//! pipeline: compressed packets go in on a serial execution context,
//! timestamped canonical-layout PCM buffers come out through a callback
//! sink.
//!
//! ## Overview
//!
//! This crate handles:
//! - The Vorbis decode session ([`VorbisDataDecoder`]): header
//!   ingestion, per-packet synthesis, multi-round PCM extraction with
//!   overflow-checked timestamp accounting
//! - Channel layout resolution (codec-native and canonical orderings)
//!   and in-place format conversion between them
//! - Xiph extradata framing and checked media-time arithmetic
//!
//! The codec engine itself is an external collaborator consumed behind
//! the [`VorbisEngine`] trait.

pub mod audio;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod time;
pub mod traits;
pub mod xiph;

pub use audio::{AudioConfig, AudioConverter, Channel, ChannelLayout};
pub use config::AudioTrackConfig;
pub use decoder::{vorbis_layout, VorbisDataDecoder};
pub use engine::{EngineError, EnginePacket, PcmBlock, VorbisEngine};
pub use error::{DecodeError, Result};
pub use traits::{
    AudioData, AudioDataDecoder, AudioDataSink, CompressedPacket, TrackKind,
};

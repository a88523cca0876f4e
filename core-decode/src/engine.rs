//! # Codec Engine Contract
//!
//! The Vorbis bitstream library is consumed as an opaque, stateful
//! engine behind the [`VorbisEngine`] trait. Sessions drive it through
//! header ingestion, per-packet synthesis, PCM extraction rounds and
//! restart; releasing engine resources is the implementor's `Drop`.
//!
//! Engine failures are reported as raw status codes and translated into
//! typed [`crate::DecodeError`]s at the call site.

use thiserror::Error;

/// Raw status reported by the codec engine for a failed call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("engine status {code}")]
pub struct EngineError {
    /// Codec-native status code (non-zero).
    pub code: i32,
}

impl EngineError {
    pub fn new(code: i32) -> Self {
        Self { code }
    }
}

/// A codec packet as the engine consumes it.
///
/// Mirrors the engine's native packet shape: payload plus stream
/// position markers. `packet_no` is the session's running packet
/// counter; `granule_pos` carries the container timecode.
#[derive(Debug, Clone, Copy)]
pub struct EnginePacket<'a> {
    /// Packet payload.
    pub data: &'a [u8],
    /// Marks the first packet of a logical stream.
    pub bos: bool,
    /// Marks the final packet of a logical stream.
    pub eos: bool,
    /// Engine position marker (container timecode).
    pub granule_pos: i64,
    /// Monotonic packet number.
    pub packet_no: i64,
}

/// One round of extracted PCM, planar per channel.
///
/// All channel planes hold the same number of frames. The engine keeps
/// reporting the same frames until they are consumed with
/// [`VorbisEngine::discard_frames`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PcmBlock {
    planes: Vec<Vec<f32>>,
}

impl PcmBlock {
    /// Wrap planar channel data. Planes must be equally long.
    pub fn new(planes: Vec<Vec<f32>>) -> Self {
        debug_assert!(planes.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { planes }
    }

    /// A block with no frames, signalling the end of extraction rounds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frames available in this round.
    pub fn frames(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }

    /// Number of channel planes.
    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Samples of channel `j`.
    pub fn channel(&self, j: usize) -> &[f32] {
        &self.planes[j]
    }

    /// Returns `true` if no frames are available.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

/// Opaque stateful Vorbis synthesis engine.
///
/// Call order expected by sessions:
/// `init_metadata` → `ingest_header` ×3 → `init_synthesis` → `init_block`,
/// then per packet: `synthesize` → `block_in` → (`pcm_out` →
/// `discard_frames`)* until `pcm_out` is empty. `restart` drops any
/// buffered synthesis state without touching the ingested headers.
pub trait VorbisEngine: Send {
    /// Initialize the engine's metadata structures. Must be called
    /// before any header is ingested.
    fn init_metadata(&mut self);

    /// Feed one header packet (identification, comments, setup).
    fn ingest_header(&mut self, packet: &EnginePacket<'_>) -> Result<(), EngineError>;

    /// Initialize synthesis state from the ingested headers.
    fn init_synthesis(&mut self) -> Result<(), EngineError>;

    /// Initialize the block decoding workspace.
    fn init_block(&mut self) -> Result<(), EngineError>;

    /// Channel count from the codec's own headers. Valid once the
    /// identification header has been ingested.
    fn channels(&self) -> u32;

    /// Sample rate from the codec's own headers. Valid once the
    /// identification header has been ingested.
    fn rate(&self) -> u32;

    /// Synthesize one compressed packet into the working block.
    fn synthesize(&mut self, packet: &EnginePacket<'_>) -> Result<(), EngineError>;

    /// Hand the synthesized block to the synthesis state.
    fn block_in(&mut self) -> Result<(), EngineError>;

    /// Extract the currently available PCM frames.
    ///
    /// Returns an empty block when no frames remain for this packet.
    fn pcm_out(&mut self) -> Result<PcmBlock, EngineError>;

    /// Consume `frames` frames previously reported by `pcm_out`.
    fn discard_frames(&mut self, frames: usize) -> Result<(), EngineError>;

    /// Reset internal synthesis state after a discontinuity.
    ///
    /// May fail when no data has been read yet; callers treat that as
    /// harmless.
    fn restart(&mut self) -> Result<(), EngineError>;
}

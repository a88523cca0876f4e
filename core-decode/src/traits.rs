//! # Core Decode Traits
//!
//! Data types and trait seams shared by decode sessions and their hosts.
//!
//! ## Architecture
//!
//! The decode pipeline uses a **dispatch/callback model**:
//!
//! - The demuxer side submits [`CompressedPacket`]s through
//!   [`AudioDataDecoder::decode`]; submission is fire-and-forget and the
//!   work is marshalled onto the session's serial execution context.
//! - The session pushes results to an [`AudioDataSink`]: decoded buffers,
//!   an input-exhausted signal when a packet is fully consumed, a
//!   drain-complete signal, or a structured error.
//!
//! ## Threading Model
//!
//! Sink callbacks are invoked only from the session's execution context,
//! one at a time, in the order the session produces them. A sink is never
//! entered concurrently by the same session.

use crate::error::{DecodeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================================================
// Track Types
// ============================================================================

/// Kind of media track a decoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Decoded PCM audio.
    Audio,
    /// Decoded video frames (not produced by this crate).
    Video,
}

impl TrackKind {
    /// Returns `true` for audio tracks.
    pub fn is_audio(&self) -> bool {
        matches!(self, TrackKind::Audio)
    }
}

// ============================================================================
// Input / Output Units
// ============================================================================

/// One compressed packet handed to a decode session.
///
/// Packets are read-only to the session; `Bytes` keeps the payload cheap
/// to move across the execution-context boundary.
#[derive(Debug, Clone)]
pub struct CompressedPacket {
    /// Raw codec payload.
    pub data: Bytes,
    /// Byte offset of the packet within its container.
    pub offset: i64,
    /// Presentation timestamp in microseconds.
    pub time_us: i64,
    /// Container-level timecode, used as the codec's position marker.
    pub timecode: i64,
    /// Set on the final packet of the stream.
    pub eos: bool,
}

impl CompressedPacket {
    /// Create a packet with the given payload and presentation time.
    ///
    /// Offset and timecode default to zero; use the struct fields for
    /// container-accurate values.
    pub fn new(data: Bytes, time_us: i64) -> Self {
        Self {
            data,
            offset: 0,
            time_us,
            timecode: 0,
            eos: false,
        }
    }
}

/// One decoded, timestamped PCM buffer.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`, ordered by
/// the pipeline's canonical channel layout: sample `i` of channel `j`
/// sits at `i * channels + j`. Start time and duration are computed by
/// the session, not copied from the input packet.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Byte offset of the originating packet.
    pub offset: i64,
    /// Absolute start time in microseconds.
    pub time_us: i64,
    /// Duration in microseconds.
    pub duration_us: i64,
    /// Number of frames (one frame = one sample per channel).
    pub frames: usize,
    /// Channel count.
    pub channels: u32,
    /// Sample rate in Hz.
    pub rate: u32,
    /// Interleaved canonical-layout samples, `frames * channels` long.
    pub samples: Vec<f32>,
}

impl AudioData {
    /// Returns `true` if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.samples.is_empty()
    }

    /// End time of the buffer in microseconds, if representable.
    pub fn end_time_us(&self) -> Option<i64> {
        self.time_us.checked_add(self.duration_us)
    }
}

// ============================================================================
// Callback Sink
// ============================================================================

/// Receiver for everything a decode session produces.
///
/// All methods are invoked from the session's execution context, never
/// concurrently, in the order the session's logic produces them.
pub trait AudioDataSink: Send + Sync {
    /// A decoded buffer is ready.
    fn output(&self, data: AudioData);

    /// The current input packet has been fully consumed; the session can
    /// accept more input.
    fn input_exhausted(&self);

    /// A drain request has completed; no further output is pending.
    fn drain_complete(&self);

    /// Processing of one packet failed. Per-packet errors leave the
    /// session usable; see [`DecodeError::is_fatal`].
    fn error(&self, error: DecodeError);
}

// ============================================================================
// Decoder Sessions
// ============================================================================

/// A stateful decode session turning compressed packets into PCM buffers.
///
/// All state-mutating work runs on a serial execution context owned by
/// the session. `decode` and `drain` are fire-and-forget dispatches;
/// `flush` waits until the marshalled reset has actually run, so no
/// decode work can overlap it.
#[async_trait]
pub trait AudioDataDecoder: Send + Sync {
    /// Initialize the session: ingest codec headers from the track's
    /// extradata and prepare the engine for synthesis.
    ///
    /// # Errors
    ///
    /// Fails with a fatal [`DecodeError`] if the extradata cannot be
    /// split, a header is rejected, engine initialization fails, or the
    /// channel count has no supported layout. After a failure the
    /// session must only be shut down.
    async fn init(&self) -> Result<TrackKind>;

    /// Submit one packet for decoding.
    ///
    /// Returns as soon as the packet is queued; results arrive through
    /// the session's [`AudioDataSink`]. A packet queued across a flush
    /// window is silently discarded.
    fn decode(&self, packet: CompressedPacket) -> Result<()>;

    /// Request a drain of any buffered output.
    ///
    /// Completion is signalled via [`AudioDataSink::drain_complete`].
    fn drain(&self) -> Result<()>;

    /// Reset the codec for a discontinuity (e.g. a seek).
    ///
    /// Blocks the caller until the engine reset has executed on the
    /// session's context. Decode calls already queued behind the flush
    /// become no-ops instead of touching the just-reset engine.
    async fn flush(&self);

    /// Tear the session down, releasing codec resources.
    ///
    /// Safe to call multiple times, and safe whether or not `init` ever
    /// completed.
    async fn shutdown(&self);
}

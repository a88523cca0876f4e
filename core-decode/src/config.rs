//! # Track Configuration
//!
//! Immutable per-track configuration derived from container metadata.

use bytes::Bytes;

/// Audio track configuration as reported by the demuxer.
///
/// Created once when a decode session is constructed and never mutated.
/// The codec may disagree with the container about rate or channel count;
/// sessions log such mismatches but trust the codec's own headers.
#[derive(Debug, Clone)]
pub struct AudioTrackConfig {
    /// Sample rate in Hz according to the container.
    pub sample_rate: u32,
    /// Channel count according to the container.
    pub channels: u32,
    /// Codec-specific configuration blob (Xiph length-laced headers).
    pub codec_specific: Bytes,
}

impl AudioTrackConfig {
    /// Create a new track configuration.
    pub fn new(sample_rate: u32, channels: u32, codec_specific: Bytes) -> Self {
        Self {
            sample_rate,
            channels,
            codec_specific,
        }
    }
}

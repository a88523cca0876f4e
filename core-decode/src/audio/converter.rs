//! # Audio Format Converter
//!
//! Normalizes interleaved sample buffers from a codec-native channel
//! ordering into the pipeline's canonical ordering. Input and output
//! always carry the same channel count here, so conversion is a pure
//! per-frame permutation and works in place, without reallocating.

use crate::audio::layout::ChannelLayout;
use crate::error::{DecodeError, Result};

/// Channel layout plus sample rate: everything needed to interpret an
/// interleaved buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    pub layout: ChannelLayout,
    pub rate: u32,
}

impl AudioConfig {
    pub fn new(layout: ChannelLayout, rate: u32) -> Self {
        Self { layout, rate }
    }

    pub fn channel_count(&self) -> u32 {
        self.layout.count()
    }
}

/// Reorders interleaved samples from one channel layout to another.
///
/// Built once per session when the first real channel/rate information
/// is known, then applied to every decoded buffer.
#[derive(Debug)]
pub struct AudioConverter {
    input: AudioConfig,
    output: AudioConfig,
    /// For each output slot, the input slot carrying the same role.
    mapping: Vec<usize>,
    /// Input ordering already matches output ordering.
    is_identity: bool,
}

impl AudioConverter {
    /// Build a converter between two same-rate, same-channel-set
    /// configurations.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::InvalidLayout`] if the channel counts
    /// differ or a role in the output layout has no source in the input
    /// layout; fails with [`DecodeError::Decode`] for rate mismatches
    /// (this converter does not resample).
    pub fn new(input: AudioConfig, output: AudioConfig) -> Result<Self> {
        if input.rate != output.rate {
            return Err(DecodeError::Decode(format!(
                "sample-rate conversion not supported ({} -> {})",
                input.rate, output.rate
            )));
        }
        if input.channel_count() != output.channel_count() {
            return Err(DecodeError::InvalidLayout {
                channels: input.channel_count(),
            });
        }

        let mapping = output
            .layout
            .channels()
            .iter()
            .map(|&role| {
                input.layout.position_of(role).ok_or(DecodeError::InvalidLayout {
                    channels: input.channel_count(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let is_identity = mapping.iter().enumerate().all(|(k, &src)| k == src);

        Ok(Self {
            input,
            output,
            mapping,
            is_identity,
        })
    }

    /// Always `true` for converters this crate can construct: equal
    /// channel counts make conversion a per-frame permutation.
    pub fn can_work_in_place(&self) -> bool {
        self.input.channel_count() == self.output.channel_count()
    }

    /// Reorder `samples` (interleaved, input layout) into the output
    /// layout, in place.
    ///
    /// `samples.len()` must be a multiple of the channel count.
    pub fn process_in_place(&self, samples: &mut [f32]) {
        if self.is_identity {
            return;
        }

        let channels = self.mapping.len();
        debug_assert_eq!(samples.len() % channels, 0);

        let mut frame = vec![0.0f32; channels];
        for chunk in samples.chunks_exact_mut(channels) {
            frame.copy_from_slice(chunk);
            for (k, &src) in self.mapping.iter().enumerate() {
                chunk[k] = frame[src];
            }
        }
    }
}

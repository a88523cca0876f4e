//! # Channel Layouts
//!
//! Semantic channel roles and ordered layouts. Codecs deliver channels
//! in their own documented order; the pipeline's canonical layouts
//! follow SMPTE/WAVE ordering. A layout is just the ordered list of
//! roles, keyed by channel count.

use serde::{Deserialize, Serialize};

/// Semantic role of a single audio channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// Single-channel (monophonic) content.
    Mono,
    FrontLeft,
    FrontRight,
    FrontCenter,
    /// Low-frequency effects.
    Lfe,
    /// Surround (side) left.
    SurroundLeft,
    /// Surround (side) right.
    SurroundRight,
    RearCenter,
    RearLeft,
    RearRight,
}

/// An ordered set of channel roles.
///
/// Duplicate roles are not meaningful; layouts produced by this crate
/// never contain them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLayout {
    channels: Vec<Channel>,
}

impl ChannelLayout {
    /// Build a layout from an ordered role list.
    pub fn new(channels: impl Into<Vec<Channel>>) -> Self {
        Self {
            channels: channels.into(),
        }
    }

    /// Number of channels in the layout.
    pub fn count(&self) -> u32 {
        self.channels.len() as u32
    }

    /// Ordered roles.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Index of `channel` within the layout, if present.
    pub fn position_of(&self, channel: Channel) -> Option<usize> {
        self.channels.iter().position(|&c| c == channel)
    }

    /// The pipeline's canonical layout for a channel count.
    ///
    /// SMPTE/WAVE ordering; counts outside 1–8 have no layout.
    pub fn canonical(count: u32) -> Option<ChannelLayout> {
        use Channel::*;

        let channels: &[Channel] = match count {
            1 => &[Mono],
            2 => &[FrontLeft, FrontRight],
            3 => &[FrontLeft, FrontRight, FrontCenter],
            4 => &[FrontLeft, FrontRight, SurroundLeft, SurroundRight],
            5 => &[
                FrontLeft,
                FrontRight,
                FrontCenter,
                SurroundLeft,
                SurroundRight,
            ],
            6 => &[
                FrontLeft,
                FrontRight,
                FrontCenter,
                Lfe,
                SurroundLeft,
                SurroundRight,
            ],
            7 => &[
                FrontLeft,
                FrontRight,
                FrontCenter,
                Lfe,
                RearCenter,
                SurroundLeft,
                SurroundRight,
            ],
            8 => &[
                FrontLeft,
                FrontRight,
                FrontCenter,
                Lfe,
                RearLeft,
                RearRight,
                SurroundLeft,
                SurroundRight,
            ],
            _ => return None,
        };
        Some(ChannelLayout::new(channels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_exists_exactly_for_1_through_8() {
        for count in 1..=8u32 {
            let layout = ChannelLayout::canonical(count).unwrap();
            assert_eq!(layout.count(), count);
        }
        assert_eq!(ChannelLayout::canonical(0), None);
        assert_eq!(ChannelLayout::canonical(9), None);
    }

    #[test]
    fn canonical_stereo_ordering() {
        let layout = ChannelLayout::canonical(2).unwrap();
        assert_eq!(
            layout.channels(),
            &[Channel::FrontLeft, Channel::FrontRight]
        );
        assert_eq!(layout.position_of(Channel::FrontRight), Some(1));
        assert_eq!(layout.position_of(Channel::Lfe), None);
    }
}

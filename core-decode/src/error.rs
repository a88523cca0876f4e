//! # Decode Error Types
//!
//! Error taxonomy for streaming decode sessions.
//!
//! Fatal errors surface during initialization and leave the session
//! unusable (it stays destructible). Per-packet errors are reported once
//! through the callback sink's error path and only terminate the packet
//! that raised them; the session keeps accepting packets afterwards.

use thiserror::Error;

/// Errors produced by a decode session.
#[derive(Error, Debug)]
pub enum DecodeError {
    // ========================================================================
    // Fatal Initialization Errors
    // ========================================================================
    /// The codec-specific extradata blob could not be split into headers.
    #[error("Malformed codec extradata: {0}")]
    ExtradataFormat(String),

    /// The codec engine refused a header packet.
    #[error("Codec engine rejected header packet {packet_no} (status {code})")]
    HeaderRejected { packet_no: i64, code: i32 },

    /// The codec engine's post-header initialization failed.
    #[error("Codec engine initialization failed: {0}")]
    EngineInit(String),

    /// The channel count does not map to a supported layout.
    #[error("Invalid channel layout: {channels} channels")]
    InvalidLayout { channels: u32 },

    // ========================================================================
    // Per-Packet Errors
    // ========================================================================
    /// Synthesis, block assembly or PCM read failed for one packet.
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Timestamp or duration arithmetic left the signed 64-bit
    /// microsecond range.
    #[error("Overflow {0}")]
    Overflow(&'static str),

    /// An output buffer could not be allocated.
    #[error("Out of memory allocating {samples} samples")]
    OutOfMemory { samples: usize },

    // ========================================================================
    // Session Lifecycle Errors
    // ========================================================================
    /// The session's execution context has been shut down.
    #[error("Decode session is shut down")]
    Shutdown,
}

impl DecodeError {
    /// Returns `true` if this error leaves the session unusable.
    ///
    /// Fatal errors arise during initialization (malformed extradata,
    /// rejected headers, engine init failure, unsupported layout).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DecodeError::ExtradataFormat(_)
                | DecodeError::HeaderRejected { .. }
                | DecodeError::EngineInit(_)
                | DecodeError::InvalidLayout { .. }
        )
    }

    /// Returns `true` if this error terminated a single packet and the
    /// session can keep decoding.
    pub fn is_per_packet(&self) -> bool {
        matches!(
            self,
            DecodeError::Decode(_)
                | DecodeError::Overflow(_)
                | DecodeError::OutOfMemory { .. }
        )
    }
}

impl From<core_task::QueueError> for DecodeError {
    fn from(_: core_task::QueueError) -> Self {
        DecodeError::Shutdown
    }
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_and_per_packet_are_disjoint() {
        let fatal = DecodeError::InvalidLayout { channels: 9 };
        assert!(fatal.is_fatal());
        assert!(!fatal.is_per_packet());

        let transient = DecodeError::Overflow("converting audio duration");
        assert!(transient.is_per_packet());
        assert!(!transient.is_fatal());
    }
}

//! # Vorbis Decode Session
//!
//! Turns a stream of Vorbis packets into timestamped PCM buffers.
//!
//! The session owns a stateful codec engine plus its packet and timing
//! counters, all living on a serial execution context ([`TaskQueue`]).
//! `decode` and `drain` dispatch fire-and-forget; `flush` is the one
//! operation that waits for its marshalled engine reset to finish, so a
//! reset can never overlap decode work. Decode calls that were already
//! queued when a flush started observe the flushing flag and become
//! no-ops instead of touching the just-reset engine.
//!
//! ## Timing
//!
//! Packets sharing a presentation timestamp belong to one contiguous
//! audio block. The session accumulates decoded frames within a block
//! and stamps each PCM extraction round with
//! `packet time + accumulated prior duration`; a new timestamp (or a
//! flush) resets the accumulator. All conversions are overflow-checked.

use crate::audio::converter::{AudioConfig, AudioConverter};
use crate::audio::layout::{Channel, ChannelLayout};
use crate::config::AudioTrackConfig;
use crate::engine::{EnginePacket, VorbisEngine};
use crate::error::{DecodeError, Result};
use crate::time::frames_to_usecs;
use crate::traits::{
    AudioData, AudioDataDecoder, AudioDataSink, CompressedPacket, TrackKind,
};
use crate::xiph;
use async_trait::async_trait;
use core_task::TaskQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Number of header packets every Vorbis stream opens with
/// (identification, comments, setup).
const VORBIS_HEADER_COUNT: usize = 3;

/// Channel ordering used by the Vorbis bitstream for a channel count.
///
/// From the Vorbis I specification, section 4.3.9. Counts outside 1–8
/// have no defined layout and resolve to `None`; sessions treat that as
/// a fatal initialization failure.
pub fn vorbis_layout(channels: u32) -> Option<ChannelLayout> {
    use Channel::*;

    let channels: &[Channel] = match channels {
        // monophonic
        1 => &[Mono],
        // left, right
        2 => &[FrontLeft, FrontRight],
        // 1d-surround: left, center, right
        3 => &[FrontLeft, FrontCenter, FrontRight],
        // quadraphonic: front pair, rear pair
        4 => &[FrontLeft, FrontRight, SurroundLeft, SurroundRight],
        // five-channel: left, center, right, rear left, rear right
        5 => &[
            FrontLeft,
            FrontCenter,
            FrontRight,
            SurroundLeft,
            SurroundRight,
        ],
        // 5.1: five-channel plus LFE
        6 => &[
            FrontLeft,
            FrontCenter,
            FrontRight,
            SurroundLeft,
            SurroundRight,
            Lfe,
        ],
        // 6.1: sides, rear center, LFE
        7 => &[
            FrontLeft,
            FrontCenter,
            FrontRight,
            SurroundLeft,
            SurroundRight,
            RearCenter,
            Lfe,
        ],
        // 7.1: sides, rear pair, LFE
        8 => &[
            FrontLeft,
            FrontCenter,
            FrontRight,
            SurroundLeft,
            SurroundRight,
            RearLeft,
            RearRight,
            Lfe,
        ],
        _ => return None,
    };
    Some(ChannelLayout::new(channels))
}

/// Session state. Exclusively owned by the task queue; nothing outside
/// the queue ever touches it.
struct SessionState {
    config: AudioTrackConfig,
    engine: Box<dyn VorbisEngine>,
    sink: Arc<dyn AudioDataSink>,
    /// Monotonic packet counter; headers take 0..3.
    packet_count: i64,
    /// Frames decoded so far within the current contiguous block.
    frames: i64,
    /// Timestamp of the block being accumulated, if any.
    last_frame_time: Option<i64>,
    /// Built lazily on the first PCM round, once real channel/rate
    /// information is known.
    converter: Option<AudioConverter>,
}

impl SessionState {
    fn init(&mut self) -> Result<TrackKind> {
        self.engine.init_metadata();

        let extradata = self.config.codec_specific.clone();
        let headers = xiph::extradata_to_headers(&extradata).ok_or_else(|| {
            DecodeError::ExtradataFormat("unreadable Xiph lacing".to_string())
        })?;
        if headers.len() != VORBIS_HEADER_COUNT {
            return Err(DecodeError::ExtradataFormat(format!(
                "expected {} header packets, found {}",
                VORBIS_HEADER_COUNT,
                headers.len()
            )));
        }
        for header in headers {
            self.decode_header(header)?;
        }
        debug_assert_eq!(self.packet_count, VORBIS_HEADER_COUNT as i64);

        self.engine
            .init_synthesis()
            .map_err(|e| DecodeError::EngineInit(format!("synthesis init: {}", e)))?;
        self.engine
            .init_block()
            .map_err(|e| DecodeError::EngineInit(format!("block init: {}", e)))?;

        let rate = self.engine.rate();
        let channels = self.engine.channels();
        if self.config.sample_rate != rate {
            warn!(
                container = self.config.sample_rate,
                codec = rate,
                "container and codec rate do not match"
            );
        }
        if self.config.channels != channels {
            warn!(
                container = self.config.channels,
                codec = channels,
                "container and codec channel count do not match"
            );
        }

        if vorbis_layout(channels).is_none() {
            return Err(DecodeError::InvalidLayout { channels });
        }

        debug!(rate, channels, "Vorbis decode session initialized");
        Ok(TrackKind::Audio)
    }

    /// Feed one header packet to the engine.
    ///
    /// The first header is marked beginning-of-stream; packet numbers
    /// follow the running counter.
    fn decode_header(&mut self, header: &[u8]) -> Result<()> {
        let bos = self.packet_count == 0;
        let packet = EnginePacket {
            data: header,
            bos,
            eos: false,
            granule_pos: 0,
            packet_no: self.packet_count,
        };
        self.packet_count += 1;
        debug_assert!(self.packet_count <= VORBIS_HEADER_COUNT as i64);

        self.engine
            .ingest_header(&packet)
            .map_err(|e| DecodeError::HeaderRejected {
                packet_no: packet.packet_no,
                code: e.code,
            })
    }

    fn do_decode(&mut self, packet: &CompressedPacket) -> Result<()> {
        debug_assert!(self.packet_count >= VORBIS_HEADER_COUNT as i64);

        if self.last_frame_time != Some(packet.time_us) {
            // A new timestamp starts a new contiguous block.
            self.frames = 0;
            self.last_frame_time = Some(packet.time_us);
        }

        let engine_packet = EnginePacket {
            data: &packet.data,
            bos: false,
            eos: packet.eos,
            granule_pos: packet.timecode,
            packet_no: self.packet_count,
        };
        self.packet_count += 1;

        self.engine
            .synthesize(&engine_packet)
            .map_err(|e| DecodeError::Decode(format!("vorbis synthesis: {}", e)))?;
        self.engine
            .block_in()
            .map_err(|e| DecodeError::Decode(format!("vorbis block-in: {}", e)))?;

        loop {
            let pcm = self
                .engine
                .pcm_out()
                .map_err(|e| DecodeError::Decode(format!("vorbis pcm-out: {}", e)))?;
            let frames = pcm.frames();
            if frames == 0 {
                break;
            }

            let channels = self.engine.channels();
            let rate = self.engine.rate();
            let sample_count = frames * channels as usize;

            let mut buffer: Vec<f32> = Vec::new();
            buffer
                .try_reserve_exact(sample_count)
                .map_err(|_| DecodeError::OutOfMemory {
                    samples: sample_count,
                })?;
            buffer.resize(sample_count, 0.0);

            // Deinterleave codec-planar samples into channel-major
            // interleaved order: sample i of channel j lands at
            // i * channels + j.
            for j in 0..channels as usize {
                let plane = pcm.channel(j);
                for (i, &sample) in plane.iter().enumerate().take(frames) {
                    buffer[i * channels as usize + j] = sample;
                }
            }

            let duration = frames_to_usecs(frames as i64, rate)
                .ok_or(DecodeError::Overflow("converting audio duration"))?;
            let total_duration = frames_to_usecs(self.frames, rate)
                .ok_or(DecodeError::Overflow("converting accumulated duration"))?;
            let time = total_duration
                .checked_add(packet.time_us)
                .ok_or(DecodeError::Overflow(
                    "adding accumulated duration to packet time",
                ))?;

            let converter = self.ensure_converter(channels, rate)?;
            debug_assert!(converter.can_work_in_place());
            converter.process_in_place(&mut buffer);

            trace!(frames, time, duration, "emitting decoded audio");
            self.sink.output(AudioData {
                offset: packet.offset,
                time_us: time,
                duration_us: duration,
                frames,
                channels,
                rate,
                samples: buffer,
            });

            self.frames += frames as i64;
            self.engine
                .discard_frames(frames)
                .map_err(|e| DecodeError::Decode(format!("vorbis read: {}", e)))?;
        }

        Ok(())
    }

    fn ensure_converter(&mut self, channels: u32, rate: u32) -> Result<&AudioConverter> {
        if self.converter.is_none() {
            let native =
                vorbis_layout(channels).ok_or(DecodeError::InvalidLayout { channels })?;
            let canonical = ChannelLayout::canonical(channels)
                .ok_or(DecodeError::InvalidLayout { channels })?;
            let converter = AudioConverter::new(
                AudioConfig::new(native, rate),
                AudioConfig::new(canonical, rate),
            )?;
            self.converter = Some(converter);
        }
        // Installed just above when absent.
        Ok(self.converter.as_ref().unwrap())
    }
}

/// Streaming Vorbis decoder session.
///
/// Construct with the track's configuration, an opaque codec engine and
/// a callback sink, then drive it through the [`AudioDataDecoder`]
/// contract. Dropping or shutting down the session releases the engine
/// whether or not `init` ever completed.
pub struct VorbisDataDecoder {
    queue: TaskQueue<SessionState>,
    /// Set for the duration of a flush; read by queued decode jobs.
    flushing: Arc<AtomicBool>,
}

impl VorbisDataDecoder {
    pub fn new(
        config: AudioTrackConfig,
        engine: Box<dyn VorbisEngine>,
        sink: Arc<dyn AudioDataSink>,
    ) -> Self {
        let state = SessionState {
            config,
            engine,
            sink,
            packet_count: 0,
            frames: 0,
            last_frame_time: None,
            converter: None,
        };
        Self {
            queue: TaskQueue::spawn("vorbis-decode", state),
            flushing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` if `mime_type` names a Vorbis audio track.
    pub fn is_vorbis(mime_type: &str) -> bool {
        mime_type == "audio/vorbis"
    }
}

#[async_trait]
impl AudioDataDecoder for VorbisDataDecoder {
    async fn init(&self) -> Result<TrackKind> {
        self.queue
            .dispatch_sync(|state| state.init())
            .await
            .map_err(DecodeError::from)?
    }

    fn decode(&self, packet: CompressedPacket) -> Result<()> {
        let flushing = Arc::clone(&self.flushing);
        self.queue
            .dispatch(move |state| {
                if flushing.load(Ordering::SeqCst) {
                    // This packet was queued before a flush became
                    // visible; the engine has just been reset, so the
                    // packet is dropped rather than decoded.
                    trace!("dropping packet queued across a flush");
                    return;
                }
                match state.do_decode(&packet) {
                    Ok(()) => state.sink.input_exhausted(),
                    Err(error) => state.sink.error(error),
                }
            })
            .map_err(DecodeError::from)
    }

    fn drain(&self) -> Result<()> {
        // The engine holds no cross-packet look-ahead; draining is a
        // pure completion signal.
        self.queue
            .dispatch(|state| state.sink.drain_complete())
            .map_err(DecodeError::from)
    }

    async fn flush(&self) {
        self.flushing.store(true, Ordering::SeqCst);
        let reset = self
            .queue
            .dispatch_sync(|state| {
                // Restart fails when no packet has been read yet; that
                // is expected and harmless.
                let _ = state.engine.restart();
                state.last_frame_time = None;
            })
            .await;
        if reset.is_err() {
            debug!("flush requested on a shut-down session");
        }
        self.flushing.store(false, Ordering::SeqCst);
    }

    async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, PcmBlock};
    use bytes::Bytes;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Engine that accepts anything and never produces PCM.
    struct NullEngine;

    impl VorbisEngine for NullEngine {
        fn init_metadata(&mut self) {}
        fn ingest_header(&mut self, _: &EnginePacket<'_>) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn init_synthesis(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn init_block(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn channels(&self) -> u32 {
            1
        }
        fn rate(&self) -> u32 {
            48_000
        }
        fn synthesize(&mut self, _: &EnginePacket<'_>) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn block_in(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn pcm_out(&mut self) -> std::result::Result<PcmBlock, EngineError> {
            Ok(PcmBlock::empty())
        }
        fn discard_frames(&mut self, _: usize) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn restart(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingSink {
        outputs: AtomicUsize,
        exhausted: AtomicUsize,
        drains: AtomicUsize,
        errors: Mutex<Vec<DecodeError>>,
    }

    impl AudioDataSink for CountingSink {
        fn output(&self, _: AudioData) {
            self.outputs.fetch_add(1, Ordering::SeqCst);
        }
        fn input_exhausted(&self) {
            self.exhausted.fetch_add(1, Ordering::SeqCst);
        }
        fn drain_complete(&self) {
            self.drains.fetch_add(1, Ordering::SeqCst);
        }
        fn error(&self, error: DecodeError) {
            self.errors.lock().unwrap().push(error);
        }
    }

    fn extradata() -> Bytes {
        let headers: [&[u8]; 3] = [&[1u8; 8], &[3u8; 8], &[5u8; 8]];
        Bytes::from(crate::xiph::headers_to_extradata(&headers).unwrap())
    }

    #[test]
    fn vorbis_layout_matches_the_specification_table() {
        use Channel::*;

        let cases: [(u32, &[Channel]); 8] = [
            (1, &[Mono]),
            (2, &[FrontLeft, FrontRight]),
            (3, &[FrontLeft, FrontCenter, FrontRight]),
            (4, &[FrontLeft, FrontRight, SurroundLeft, SurroundRight]),
            (
                5,
                &[FrontLeft, FrontCenter, FrontRight, SurroundLeft, SurroundRight],
            ),
            (
                6,
                &[
                    FrontLeft,
                    FrontCenter,
                    FrontRight,
                    SurroundLeft,
                    SurroundRight,
                    Lfe,
                ],
            ),
            (
                7,
                &[
                    FrontLeft,
                    FrontCenter,
                    FrontRight,
                    SurroundLeft,
                    SurroundRight,
                    RearCenter,
                    Lfe,
                ],
            ),
            (
                8,
                &[
                    FrontLeft,
                    FrontCenter,
                    FrontRight,
                    SurroundLeft,
                    SurroundRight,
                    RearLeft,
                    RearRight,
                    Lfe,
                ],
            ),
        ];
        for (count, expected) in cases {
            assert_eq!(
                vorbis_layout(count).unwrap().channels(),
                expected,
                "channel count {}",
                count
            );
        }
        assert_eq!(vorbis_layout(0), None);
        assert_eq!(vorbis_layout(9), None);
    }

    #[test]
    fn every_vorbis_layout_converts_to_canonical() {
        for count in 1..=8u32 {
            let native = vorbis_layout(count).unwrap();
            let canonical = ChannelLayout::canonical(count).unwrap();
            let converter = AudioConverter::new(
                AudioConfig::new(native, 48_000),
                AudioConfig::new(canonical, 48_000),
            )
            .unwrap();
            assert!(converter.can_work_in_place(), "channel count {}", count);
        }
    }

    #[test]
    fn mime_type_gate() {
        assert!(VorbisDataDecoder::is_vorbis("audio/vorbis"));
        assert!(!VorbisDataDecoder::is_vorbis("audio/opus"));
        assert!(!VorbisDataDecoder::is_vorbis("video/webm"));
    }

    #[tokio::test]
    async fn decode_during_flush_window_is_a_pure_no_op() {
        let sink = Arc::new(CountingSink::default());
        let config = AudioTrackConfig::new(48_000, 1, extradata());
        let decoder =
            VorbisDataDecoder::new(config, Box::new(NullEngine), sink.clone());
        decoder.init().await.unwrap();

        // Simulate a decode call queued after the flushing flag was
        // raised but before the queued reset executed.
        decoder.flushing.store(true, Ordering::SeqCst);
        decoder
            .decode(CompressedPacket::new(Bytes::from_static(&[0u8; 4]), 0))
            .unwrap();
        // Barrier: wait until the queued decode job has run.
        decoder.queue.dispatch_sync(|_| ()).await.unwrap();

        assert_eq!(sink.outputs.load(Ordering::SeqCst), 0);
        assert_eq!(sink.exhausted.load(Ordering::SeqCst), 0);
        assert!(sink.errors.lock().unwrap().is_empty());
    }
}

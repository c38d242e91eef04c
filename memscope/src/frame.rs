use log::debug;
use memscope_traits::{SampleRecord, CHANNEL_COUNT};

/// Start-of-frame marker emitted by the firmware.
pub const FRAME_START: u8 = 0x55;
/// Frame id for the combined accelerometer + gyroscope record.
pub const FRAME_ID: u8 = 0x61;
/// Full frame length: start byte, id, 6 x i16 LE payload, checksum.
pub const FRAME_LEN: usize = 15;

// Full-scale ranges from the firmware: ±16 g accel, ±2000 deg/s gyro.
const ACCEL_SCALE: f32 = 16.0 * 9.80665 / 32768.0;
const GYRO_SCALE: f32 = 2000.0 / 32768.0;

/// Reassembles the raw byte stream into decoded records.
///
/// Bytes may arrive split at arbitrary boundaries; an unfinished frame is
/// carried over to the next `feed`. A malformed frame costs a one-byte
/// resynchronization, never an error. The record sequence a stream decodes
/// to does not depend on how the stream was chunked.
pub struct FrameParser {
    carry: Vec<u8>,
    decoded: u64,
    sample_period: f64,
}

impl FrameParser {
    /// `sample_rate_hz` is the firmware streaming rate; record N is stamped
    /// `N / sample_rate_hz` seconds from session start.
    pub fn new(sample_rate_hz: f64) -> Self {
        debug_assert!(sample_rate_hz > 0.0);
        FrameParser {
            carry: Vec::new(),
            decoded: 0,
            sample_period: 1.0 / sample_rate_hz,
        }
    }

    /// Appends `bytes` and returns every record they complete, in arrival
    /// order. Trailing partial-frame bytes are retained for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SampleRecord> {
        self.carry.extend_from_slice(bytes);

        let mut records = Vec::new();
        let mut pos = 0;
        loop {
            match self.carry[pos..].iter().position(|&b| b == FRAME_START) {
                Some(offset) => pos += offset,
                None => {
                    pos = self.carry.len();
                    break;
                }
            }
            if self.carry.len() - pos < FRAME_LEN {
                break;
            }
            match decode(&self.carry[pos..pos + FRAME_LEN]) {
                Some(channels) => {
                    let timestamp = self.decoded as f64 * self.sample_period;
                    self.decoded += 1;
                    records.push(SampleRecord { timestamp, channels });
                    pos += FRAME_LEN;
                }
                None => {
                    debug!("malformed frame, resynchronizing");
                    pos += 1;
                }
            }
        }
        self.carry.drain(..pos);
        records
    }

    /// Drops any carried-over bytes and restarts the session clock.
    pub fn reset(&mut self) {
        self.carry.clear();
        self.decoded = 0;
    }
}

fn decode(frame: &[u8]) -> Option<[f32; CHANNEL_COUNT]> {
    if frame[0] != FRAME_START || frame[1] != FRAME_ID {
        return None;
    }
    let sum = frame[..FRAME_LEN - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[FRAME_LEN - 1] {
        return None;
    }
    let mut channels = [0.0f32; CHANNEL_COUNT];
    for (i, pair) in frame[2..FRAME_LEN - 1].chunks_exact(2).enumerate() {
        let raw = i16::from_le_bytes([pair[0], pair[1]]);
        let scale = if i < 3 { ACCEL_SCALE } else { GYRO_SCALE };
        channels[i] = raw as f32 * scale;
    }
    Some(channels)
}

/// Encodes one record payload the way the firmware frames it. The encode
/// half of the wire contract, used by tests and capture tooling.
pub fn encode_frame(channels: &[f32; CHANNEL_COUNT]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = FRAME_START;
    frame[1] = FRAME_ID;
    for (i, &value) in channels.iter().enumerate() {
        let scale = if i < 3 { ACCEL_SCALE } else { GYRO_SCALE };
        let raw = (value / scale)
            .round()
            .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        frame[2 + 2 * i..4 + 2 * i].copy_from_slice(&raw.to_le_bytes());
    }
    frame[FRAME_LEN - 1] = frame[..FRAME_LEN - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    frame
}

use crate::channel::{InputChannel, OutputChannel};
use crate::constant::CURRENT_SCALE;
use crate::control_word::{ControlWord, StatusWord};
use crate::error::ErrorCode;
use crate::network::CanNetwork;
use crate::prelude::Debug;
use crate::task::Task;

// Both process data frames are 8 bytes, little endian:
//
//   inbound PDO1:  position u32 | current i16 (mA)  | status word
//   inbound PDO2:  velocity u32 | analog input u16  | -
//   outbound PDO1: position i32 | current i16 (mA)  | control word
//   outbound PDO2: velocity i32 | digital out i16   | 0x0000

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pdo1Measures {
    pub position: u32,
    pub current: f64,
    pub status_word: StatusWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pdo2Measures {
    pub velocity: u32,
    pub analog: u16,
}

/// Converts the raw current field to amps.
///
/// Negative values are corrected by 0xFFFF rather than 0x10000, so they come
/// out one milliamp high. Setpoints are encoded with the mirrored offset (see
/// [`encode_current`]), and the calibration of existing rigs relies on both.
pub fn decode_current(raw: u16) -> f64 {
    let milliamps = raw as i32 - if raw >= 0x8000 { 0xFFFF } else { 0 };
    milliamps as f64 / CURRENT_SCALE
}

/// Converts amps to the raw current setpoint, the inverse of [`decode_current`].
///
/// Milliamps outside the 16-bit range wrap around instead of saturating, the
/// field only carries the low 16 bits of the scaled value.
pub fn encode_current(amps: f64) -> i16 {
    let milliamps = amps * CURRENT_SCALE;
    let raw = truncate_i16(milliamps);
    if milliamps < 0.0 {
        (raw as i32 + 0xFFFF) as i16
    } else {
        raw
    }
}

/// Drops the fraction, then keeps the low 16 bits.
pub fn truncate_i16(value: f64) -> i16 {
    value as i32 as i16
}

pub fn decode_pdo1(payload: &[u8; 8]) -> Pdo1Measures {
    Pdo1Measures {
        position: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
        current: decode_current(u16::from_le_bytes([payload[4], payload[5]])),
        status_word: StatusWord::from(u16::from_le_bytes([payload[6], payload[7]])),
    }
}

pub fn decode_pdo2(payload: &[u8; 8]) -> Pdo2Measures {
    Pdo2Measures {
        velocity: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
        analog: u16::from_le_bytes([payload[4], payload[5]]),
    }
}

pub fn encode_pdo1(payload: &mut [u8; 8], position: i32, current: i16, control_word: ControlWord) {
    payload[0..4].copy_from_slice(&position.to_le_bytes());
    payload[4..6].copy_from_slice(&current.to_le_bytes());
    payload[6..8].copy_from_slice(&u16::from(control_word).to_le_bytes());
}

pub fn encode_pdo2(payload: &mut [u8; 8], velocity: i32, digital_output: i16) {
    payload[0..4].copy_from_slice(&velocity.to_le_bytes());
    payload[4..6].copy_from_slice(&digital_output.to_le_bytes());
    payload[6..8].copy_from_slice(&[0, 0]);
}

impl<H: Copy + Debug> Task<H> {
    /// Syncs the bus, decodes both inbound PDOs and returns the value of `channel`.
    ///
    /// All four measures and the status word are refreshed regardless of the
    /// channel asked for.
    pub fn read<N>(&mut self, network: &mut N, channel: u32) -> Result<f64, ErrorCode>
    where
        N: CanNetwork<FrameHandle = H>,
    {
        let input = InputChannel::from_index(channel).ok_or(ErrorCode::InvalidChannel { channel })?;

        network.sync();

        network.read_frame(self.read_frames.pdo1, &mut self.read_payload);
        let pdo1 = decode_pdo1(&self.read_payload);
        self.measures[InputChannel::Position.index()] = pdo1.position as f64;
        self.measures[InputChannel::Current.index()] = pdo1.current;
        self.status_word = pdo1.status_word;

        network.read_frame(self.read_frames.pdo2, &mut self.read_payload);
        let pdo2 = decode_pdo2(&self.read_payload);
        self.measures[InputChannel::Velocity.index()] = pdo2.velocity as f64;
        self.measures[InputChannel::Analog.index()] = pdo2.analog as f64;

        Ok(self.measures[input.index()])
    }

    /// Sends `value` as position, velocity, current and digital output setpoint
    /// at once; the acquired mode of operation decides which one the drive
    /// follows. The bus is synced once after both PDOs are written.
    pub fn write<N>(&mut self, network: &mut N, channel: u32, value: f64) -> Result<(), ErrorCode>
    where
        N: CanNetwork<FrameHandle = H>,
    {
        OutputChannel::from_index(channel).ok_or(ErrorCode::InvalidChannel { channel })?;

        let setpoint = value as i32;

        encode_pdo1(&mut self.write_payload, setpoint, encode_current(value), self.control_word);
        network.write_frame(self.write_frames.pdo1, &self.write_payload);

        encode_pdo2(&mut self.write_payload, setpoint, truncate_i16(value));
        network.write_frame(self.write_frames.pdo2, &self.write_payload);

        network.sync();
        Ok(())
    }
}

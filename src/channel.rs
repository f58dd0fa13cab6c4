use crate::constant::{INPUT_CHANNELS_NUMBER, OUTPUT_CHANNELS_NUMBER};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum InputChannel {
    Position,
    Velocity,
    Current,
    Analog,
}

impl InputChannel {
    pub const ALL: [InputChannel; INPUT_CHANNELS_NUMBER] = [
        InputChannel::Position,
        InputChannel::Velocity,
        InputChannel::Current,
        InputChannel::Analog,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(channel: u32) -> Option<Self> {
        Self::ALL.get(channel as usize).copied()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OutputChannel {
    Position,
    Velocity,
    Current,
}

impl OutputChannel {
    pub const ALL: [OutputChannel; OUTPUT_CHANNELS_NUMBER] = [
        OutputChannel::Position,
        OutputChannel::Velocity,
        OutputChannel::Current,
    ];

    pub fn from_index(channel: u32) -> Option<Self> {
        Self::ALL.get(channel as usize).copied()
    }

    pub fn operation_mode(&self) -> OperationMode {
        match *self {
            OutputChannel::Position => OperationMode::Position,
            OutputChannel::Velocity => OperationMode::Velocity,
            OutputChannel::Current => OperationMode::Current,
        }
    }
}

/// Modes of operation (0x6060) written when an output channel is acquired.
/// These are the EPOS specific position, velocity and current modes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OperationMode {
    Disabled,
    Position,
    Velocity,
    Current,
}

impl OperationMode {
    pub fn code(&self) -> u8 {
        match *self {
            OperationMode::Disabled => 0x00,
            OperationMode::Position => 0xFF,
            OperationMode::Velocity => 0xFE,
            OperationMode::Current => 0xFD,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(OperationMode::Disabled),
            0xFF => Some(OperationMode::Position),
            0xFE => Some(OperationMode::Velocity),
            0xFD => Some(OperationMode::Current),
            _ => None,
        }
    }
}

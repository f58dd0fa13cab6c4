use core::fmt::Formatter;

use crate::prelude::{fmt, Debug, String, Vec};

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorCode {
    InvalidNodeId { node_id: u32 },
    InvalidStandardId { cob_id: u16 },
    FrameCreationFailed { data: Vec<u8> },
    FrameAlreadyBound { cob_id: u16 },
    TaskLoadFailed { config: String, more_info: String },
    UnknownTask { handle: i32 },
    InvalidChannel { channel: u32 },
    OutputChannelInUse { channel: u32 },
}

impl Debug for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidNodeId { node_id } => write!(f, "Invalid node id: {}", node_id),
            ErrorCode::InvalidStandardId { cob_id } => write!(f, "Invalid Standard ID: {:#x}", cob_id),
            ErrorCode::FrameCreationFailed { data } => write!(f, "Frame creation failed, data: {:x?}", data),
            ErrorCode::FrameAlreadyBound { cob_id } => write!(f, "Cob id {:#x} is already bound", cob_id),
            ErrorCode::TaskLoadFailed { config, more_info } =>
                write!(f, "Loading task '{}' failed, more info: {:?}", config, more_info),
            ErrorCode::UnknownTask { handle } => write!(f, "No task for handle {}", handle),
            ErrorCode::InvalidChannel { channel } => write!(f, "Invalid channel: {}", channel),
            ErrorCode::OutputChannelInUse { channel } =>
                write!(f, "Output channel {} requested while another one is in use", channel),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

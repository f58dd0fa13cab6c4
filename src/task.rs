use crate::constant::{INPUT_CHANNELS_NUMBER, PDO_PAYLOAD_LENGTH, REG_CONTROL_WORD};
use crate::control_word::{ControlWord, StatusWord};
use crate::error::ErrorCode;
use crate::network::{CanNetwork, FrameDirection, FrameKind};
use crate::prelude::{format, Debug, ToString, Vec};
use crate::util::parse_node_id;
use crate::{debug, info, warn};

/// One frame handle per frame kind, all bound in the same direction.
#[derive(Debug, Clone, Copy)]
pub struct FrameSet<H> {
    pub pdo1: H,
    pub pdo2: H,
    pub sdo: H,
}

impl<H: Copy> FrameSet<H> {
    pub fn handles(&self) -> [H; 3] {
        [self.pdo1, self.pdo2, self.sdo]
    }
}

/// Everything the driver keeps for one node.
///
/// A task is not thread-safe: the payload buffers and the mirrored words are
/// reused by every call, so callers must serialize access per task (one
/// control thread per node, or an external mutex around the registry).
#[derive(Debug)]
pub struct Task<H> {
    pub(crate) node_id: u32,
    pub(crate) read_frames: FrameSet<H>,
    pub(crate) write_frames: FrameSet<H>,
    pub(crate) status_word: StatusWord,
    // Re-embedded in every outbound PDO1, so it must always hold the last command.
    pub(crate) control_word: ControlWord,
    pub(crate) measures: [f64; INPUT_CHANNELS_NUMBER],
    pub(crate) is_reading: bool,
    pub(crate) is_output_channel_used: bool,
    pub(crate) read_payload: [u8; PDO_PAYLOAD_LENGTH],
    pub(crate) write_payload: [u8; PDO_PAYLOAD_LENGTH],
    pub(crate) settle_interval_ms: u32,
}

impl<H: Copy + Debug> Task<H> {
    /// Binds the six frames of the node named by `config` and puts the drive
    /// in its safe baseline (voltage enabled, quick stop released).
    ///
    /// If any frame cannot be bound, the ones already bound are released
    /// before the error is returned.
    pub fn load<N>(network: &mut N, config: &str, settle_interval_ms: u32) -> Result<Self, ErrorCode>
    where
        N: CanNetwork<FrameHandle = H>,
    {
        let node_id = parse_node_id(config);
        debug!("loading task '{}' for node {}", config, node_id);

        let mut acquired: Vec<H> = Vec::with_capacity(6);
        let frames = Self::init_frames(network, node_id, &mut acquired);
        let (read_frames, write_frames) = match frames {
            Ok(frames) => frames,
            Err(err) => {
                warn!("failed to bind frames for node {}: {:?}", node_id, err);
                for frame in acquired {
                    network.end_frame(frame);
                }
                return Err(ErrorCode::TaskLoadFailed {
                    config: config.to_string(),
                    more_info: format!("{:?}", err),
                });
            }
        };

        let mut task = Task {
            node_id,
            read_frames,
            write_frames,
            status_word: StatusWord::new(),
            control_word: ControlWord::new().with_enable_voltage(true).with_quick_stop(true),
            measures: [0.0; INPUT_CHANNELS_NUMBER],
            is_reading: true,
            is_output_channel_used: false,
            read_payload: [0; PDO_PAYLOAD_LENGTH],
            write_payload: [0; PDO_PAYLOAD_LENGTH],
            settle_interval_ms,
        };
        task.send_control_word(network);
        info!("task for node {} loaded, control word = {:#06x}", node_id, u16::from(task.control_word));
        Ok(task)
    }

    fn init_frames<N>(
        network: &mut N,
        node_id: u32,
        acquired: &mut Vec<H>,
    ) -> Result<(FrameSet<H>, FrameSet<H>), ErrorCode>
    where
        N: CanNetwork<FrameHandle = H>,
    {
        let mut bind = |kind: FrameKind, direction: FrameDirection| -> Result<H, ErrorCode> {
            let frame = network.init_frame(kind, direction, node_id)?;
            acquired.push(frame);
            Ok(frame)
        };
        let mut read = Vec::with_capacity(3);
        let mut write = Vec::with_capacity(3);
        for kind in FrameKind::ALL {
            read.push(bind(kind, FrameDirection::In)?);
            write.push(bind(kind, FrameDirection::Out)?);
        }
        Ok((
            FrameSet { pdo1: read[0], pdo2: read[1], sdo: read[2] },
            FrameSet { pdo1: write[0], pdo2: write[1], sdo: write[2] },
        ))
    }

    /// Releases every frame binding of the task.
    pub fn unload<N>(self, network: &mut N)
    where
        N: CanNetwork<FrameHandle = H>,
    {
        debug!("ending task for node {}", self.node_id);
        for (read, write) in self.read_frames.handles().into_iter().zip(self.write_frames.handles()) {
            network.end_frame(read);
            network.end_frame(write);
        }
    }

    pub(crate) fn send_control_word<N>(&mut self, network: &mut N)
    where
        N: CanNetwork<FrameHandle = H>,
    {
        network.write_single_value(self.write_frames.sdo, REG_CONTROL_WORD, 0x00, u16::from(self.control_word) as u32);
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn status_word(&self) -> StatusWord {
        self.status_word
    }

    pub fn control_word(&self) -> ControlWord {
        self.control_word
    }

    pub fn measures(&self) -> &[f64; INPUT_CHANNELS_NUMBER] {
        &self.measures
    }

    pub fn is_reading(&self) -> bool {
        self.is_reading
    }

    pub fn is_output_channel_used(&self) -> bool {
        self.is_output_channel_used
    }

    pub fn has_fault(&self) -> bool {
        self.status_word.fault()
    }

    pub fn is_output_enabled(&self) -> bool {
        self.status_word.switched_on() || self.status_word.operation_enabled()
    }
}

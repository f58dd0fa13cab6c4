use crate::prelude::Debug;
use crate::error::ErrorCode;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FrameKind {
    Pdo1,
    Pdo2,
    Sdo,
}

impl FrameKind {
    pub const ALL: [FrameKind; 3] = [FrameKind::Pdo1, FrameKind::Pdo2, FrameKind::Sdo];
}

/// Direction as seen from the master: `In` frames are produced by the drive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FrameDirection {
    In,
    Out,
}

/// The transport a task talks through.
///
/// Implementations own the frame buffers; a task only holds the handles
/// returned by [`CanNetwork::init_frame`]. None of the calls report transmit
/// failures back to the caller, the drive state is only ever confirmed by the
/// next decoded status word.
pub trait CanNetwork {
    type FrameHandle: Copy + Debug;

    /// Binds one frame of `kind` in `direction` to the node.
    fn init_frame(
        &mut self,
        kind: FrameKind,
        direction: FrameDirection,
        node_id: u32,
    ) -> Result<Self::FrameHandle, ErrorCode>;

    /// Releases a binding. Unknown or already released handles are ignored.
    fn end_frame(&mut self, frame: Self::FrameHandle);

    /// Copies the current payload of an inbound frame.
    fn read_frame(&mut self, frame: Self::FrameHandle, payload: &mut [u8; 8]);

    /// Replaces the payload of an outbound frame, sent on the next `sync`.
    fn write_frame(&mut self, frame: Self::FrameHandle, payload: &[u8; 8]);

    /// Blocks until pending outbound frames are sent and inbound ones refreshed.
    fn sync(&mut self);

    /// Service data write of a single value through an outbound SDO frame.
    fn write_single_value(&mut self, frame: Self::FrameHandle, index: u16, sub_index: u8, value: u32);
}

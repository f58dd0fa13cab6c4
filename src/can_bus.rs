use embedded_can::nb::Can;
use embedded_can::Frame;
use hashbrown::HashMap;

use crate::constant::{
    COB_FUNC_RECEIVE_SDO, COB_FUNC_RPDO_0, COB_FUNC_RPDO_1, COB_FUNC_SYNC, COB_FUNC_TPDO_0,
    COB_FUNC_TPDO_1, COB_FUNC_TRANSMIT_SDO, DEFAULT_SYNC_POLL_LIMIT, MAX_NODE_ID, MIN_NODE_ID,
    PDO_PAYLOAD_LENGTH, SDO_EXPEDITED_DOWNLOAD,
};
use crate::error::ErrorCode;
use crate::network::{CanNetwork, FrameDirection, FrameKind};
use crate::prelude::{Debug, Vec};
use crate::util::{create_frame, get_cob_id, to_payload};
use crate::{debug, warn};

/// Handle of a frame bound on a [`CanBus`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameId(usize);

#[derive(Debug, Clone)]
struct FrameBinding {
    cob_id: u16,
    kind: FrameKind,
    direction: FrameDirection,
    payload: [u8; PDO_PAYLOAD_LENGTH],
    // Outbound: payload not sent yet. Inbound PDO: no frame since the last SYNC.
    pending: bool,
}

impl FrameBinding {
    fn is_inbound_pdo(&self) -> bool {
        self.direction == FrameDirection::In && self.kind != FrameKind::Sdo
    }
}

/// COB-ID of a frame kind for `node_id`, seen from the master.
pub fn cob_id(kind: FrameKind, direction: FrameDirection, node_id: u8) -> u16 {
    let base = match (kind, direction) {
        (FrameKind::Pdo1, FrameDirection::In) => COB_FUNC_TPDO_0,
        (FrameKind::Pdo1, FrameDirection::Out) => COB_FUNC_RPDO_0,
        (FrameKind::Pdo2, FrameDirection::In) => COB_FUNC_TPDO_1,
        (FrameKind::Pdo2, FrameDirection::Out) => COB_FUNC_RPDO_1,
        (FrameKind::Sdo, FrameDirection::In) => COB_FUNC_TRANSMIT_SDO,
        (FrameKind::Sdo, FrameDirection::Out) => COB_FUNC_RECEIVE_SDO,
    };
    base + node_id as u16
}

/// [`CanNetwork`] on top of an `embedded-can` controller.
///
/// Outbound PDOs are buffered until [`CanNetwork::sync`], which sends them,
/// emits a SYNC and then polls the controller until every bound inbound PDO
/// has answered, or until the poll limit runs out. SDO writes go out
/// immediately and their responses are not waited for.
pub struct CanBus<CAN> where CAN: Can, CAN::Frame: Frame + Debug {
    can_network: CAN,
    bindings: Vec<Option<FrameBinding>>,
    cob_to_index: HashMap<u16, usize>,
    sync_poll_limit: u32,
}

impl<CAN> CanBus<CAN> where CAN: Can, CAN::Frame: Frame + Debug {
    pub fn new(can_network: CAN) -> Self {
        CanBus {
            can_network,
            bindings: Vec::new(),
            cob_to_index: HashMap::new(),
            sync_poll_limit: DEFAULT_SYNC_POLL_LIMIT,
        }
    }

    /// Empty polls [`CanNetwork::sync`] tolerates while waiting for the
    /// inbound PDOs of the cycle.
    pub fn with_sync_poll_limit(mut self, polls: u32) -> Self {
        self.sync_poll_limit = polls;
        self
    }

    pub fn can(&self) -> &CAN {
        &self.can_network
    }

    pub fn can_mut(&mut self) -> &mut CAN {
        &mut self.can_network
    }

    pub fn bound_frames(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }

    fn awaited_pdos(&self) -> usize {
        self.bindings.iter().flatten().filter(|b| b.is_inbound_pdo() && b.pending).count()
    }

    fn binding(&self, frame: FrameId) -> Option<&FrameBinding> {
        self.bindings.get(frame.0).and_then(|b| b.as_ref())
    }

    fn transmit(&mut self, cob_id: u16, data: &[u8]) {
        let frame: CAN::Frame = match create_frame(cob_id, data) {
            Ok(f) => f,
            Err(err) => {
                warn!("Errors in generating frame {:#x}, err: {:?}", cob_id, err);
                return;
            }
        };
        match nb::block!(self.can_network.transmit(&frame)) {
            Ok(_) => {
                debug!("sent a frame : {:?}", frame);
            }
            Err(err) => {
                warn!("Failed to transmit frame {:?}, err: {:?}", frame, err);
            }
        }
    }

    fn process_one_frame(&mut self) -> bool {
        let frame = match self.can_network.receive() {
            Ok(f) => f,
            Err(nb::Error::WouldBlock) => return false,
            Err(nb::Error::Other(err)) => {
                warn!("Errors in reading CAN frame, {:?}", err);
                return false;
            }
        };
        if let Some(index) = get_cob_id(&frame).and_then(|cob_id| self.cob_to_index.get(&cob_id).copied()) {
            if let Some(Some(binding)) = self.bindings.get_mut(index) {
                binding.payload = to_payload(frame.data());
                binding.pending = false;
            }
        }
        true
    }
}

impl<CAN> CanNetwork for CanBus<CAN> where CAN: Can, CAN::Frame: Frame + Debug {
    type FrameHandle = FrameId;

    fn init_frame(&mut self, kind: FrameKind, direction: FrameDirection, node_id: u32)
        -> Result<FrameId, ErrorCode> {
        if !(MIN_NODE_ID..=MAX_NODE_ID).contains(&node_id) {
            return Err(ErrorCode::InvalidNodeId { node_id });
        }
        let cob_id = cob_id(kind, direction, node_id as u8);
        if direction == FrameDirection::In && self.cob_to_index.contains_key(&cob_id) {
            return Err(ErrorCode::FrameAlreadyBound { cob_id });
        }

        let binding = FrameBinding { cob_id, kind, direction, payload: [0; PDO_PAYLOAD_LENGTH], pending: false };
        let index = match self.bindings.iter().position(|b| b.is_none()) {
            Some(index) => {
                self.bindings[index] = Some(binding);
                index
            }
            None => {
                self.bindings.push(Some(binding));
                self.bindings.len() - 1
            }
        };
        if direction == FrameDirection::In {
            self.cob_to_index.insert(cob_id, index);
        }
        debug!("bound {:?} {:?} frame on cob id {:#x}", kind, direction, cob_id);
        Ok(FrameId(index))
    }

    fn end_frame(&mut self, frame: FrameId) {
        if let Some(binding) = self.bindings.get_mut(frame.0).and_then(|b| b.take()) {
            if binding.direction == FrameDirection::In {
                self.cob_to_index.remove(&binding.cob_id);
            }
        }
    }

    fn read_frame(&mut self, frame: FrameId, payload: &mut [u8; 8]) {
        if let Some(binding) = self.binding(frame) {
            *payload = binding.payload;
        }
    }

    fn write_frame(&mut self, frame: FrameId, payload: &[u8; 8]) {
        if let Some(Some(binding)) = self.bindings.get_mut(frame.0) {
            if binding.direction == FrameDirection::Out && binding.kind != FrameKind::Sdo {
                binding.payload = *payload;
                binding.pending = true;
            }
        }
    }

    fn sync(&mut self) {
        // Frames of earlier cycles must not count as answers to this SYNC.
        while self.process_one_frame() {}

        let mut outbound = Vec::new();
        for binding in self.bindings.iter_mut().flatten() {
            if binding.is_inbound_pdo() {
                binding.pending = true;
            } else if binding.pending {
                binding.pending = false;
                outbound.push((binding.cob_id, binding.payload));
            }
        }
        for (cob_id, payload) in outbound {
            self.transmit(cob_id, &payload);
        }
        self.transmit(COB_FUNC_SYNC, &[]);

        let mut empty_polls = 0;
        while self.awaited_pdos() > 0 {
            if !self.process_one_frame() {
                empty_polls += 1;
                if empty_polls >= self.sync_poll_limit {
                    warn!("sync: {} inbound PDO(s) not refreshed after {} polls",
                        self.awaited_pdos(), empty_polls);
                    break;
                }
            }
        }
        while self.process_one_frame() {}
    }

    fn write_single_value(&mut self, frame: FrameId, index: u16, sub_index: u8, value: u32) {
        let cob_id = match self.binding(frame) {
            Some(b) if b.kind == FrameKind::Sdo && b.direction == FrameDirection::Out => b.cob_id,
            _ => {
                warn!("SDO write of {:#x}:{} through unbound frame {:?}", index, sub_index, frame);
                return;
            }
        };
        let [il, ih] = index.to_le_bytes();
        let [v0, v1, v2, v3] = value.to_le_bytes();
        self.transmit(cob_id, &[SDO_EXPEDITED_DOWNLOAD, il, ih, sub_index, v0, v1, v2, v3]);
    }
}

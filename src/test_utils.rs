use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::can_bus::cob_id;
use crate::delay::Delay;
use crate::error::ErrorCode;
use crate::network::{CanNetwork, FrameDirection, FrameKind};
use crate::prelude::Vec;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCall {
    InitFrame(FrameKind, FrameDirection, u32),
    EndFrame(u32),
    ReadFrame(u32),
    WriteFrame(u32, [u8; 8]),
    Sync,
    WriteValue(u32, u16, u8, u32),
    Delay(u32),
}

/// Calls of a network and a delay interleaved in the order they happened.
pub type CallTrace = Rc<RefCell<Vec<NetworkCall>>>;

/// Records every call and serves inbound payloads per frame kind.
#[derive(Debug, Default)]
pub struct MockNetwork {
    pub calls: Vec<NetworkCall>,
    pub fail_on: Option<(FrameKind, FrameDirection)>,
    pub inbound: HashMap<FrameKind, [u8; 8]>,
    bindings: HashMap<u32, (FrameKind, FrameDirection)>,
    next_handle: u32,
    trace: Option<CallTrace>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self { next_handle: 1, ..Default::default() }
    }

    /// A network and a delay writing into one shared trace.
    pub fn traced() -> (MockNetwork, RecordingDelay, CallTrace) {
        let trace = CallTrace::default();
        let network = MockNetwork { trace: Some(trace.clone()), ..MockNetwork::new() };
        let delay = RecordingDelay { calls: Vec::new(), trace: Some(trace.clone()) };
        (network, delay, trace)
    }

    fn record(&mut self, call: NetworkCall) {
        if let Some(trace) = &self.trace {
            trace.borrow_mut().push(call.clone());
        }
        self.calls.push(call);
    }

    pub fn live_frames(&self) -> usize {
        self.bindings.len()
    }

    pub fn ended_frames(&self) -> Vec<u32> {
        self.calls.iter().filter_map(|c| match c {
            NetworkCall::EndFrame(h) => Some(*h),
            _ => None,
        }).collect()
    }

    pub fn sdo_writes(&self) -> Vec<(u32, u16, u8, u32)> {
        self.calls.iter().filter_map(|c| match c {
            NetworkCall::WriteValue(h, index, sub_index, value) => Some((*h, *index, *sub_index, *value)),
            _ => None,
        }).collect()
    }

    pub fn sdo_values(&self, index: u16) -> Vec<u32> {
        self.sdo_writes().into_iter().filter(|w| w.1 == index).map(|w| w.3).collect()
    }

    pub fn sync_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == NetworkCall::Sync).count()
    }

    /// Payloads written to outbound frames of `kind`, oldest first.
    pub fn written(&self, kind: FrameKind) -> Vec<[u8; 8]> {
        self.calls.iter().filter_map(|c| match c {
            NetworkCall::WriteFrame(h, payload)
                if self.bindings.get(h).map(|b| b.0) == Some(kind) => Some(*payload),
            _ => None,
        }).collect()
    }
}

impl CanNetwork for MockNetwork {
    type FrameHandle = u32;

    fn init_frame(&mut self, kind: FrameKind, direction: FrameDirection, node_id: u32)
        -> Result<u32, ErrorCode> {
        self.record(NetworkCall::InitFrame(kind, direction, node_id));
        if self.fail_on == Some((kind, direction)) {
            return Err(ErrorCode::FrameAlreadyBound { cob_id: cob_id(kind, direction, node_id as u8) });
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.bindings.insert(handle, (kind, direction));
        Ok(handle)
    }

    fn end_frame(&mut self, frame: u32) {
        self.record(NetworkCall::EndFrame(frame));
        self.bindings.remove(&frame);
    }

    fn read_frame(&mut self, frame: u32, payload: &mut [u8; 8]) {
        self.record(NetworkCall::ReadFrame(frame));
        if let Some((kind, _)) = self.bindings.get(&frame) {
            *payload = self.inbound.get(kind).copied().unwrap_or_default();
        }
    }

    fn write_frame(&mut self, frame: u32, payload: &[u8; 8]) {
        self.record(NetworkCall::WriteFrame(frame, *payload));
    }

    fn sync(&mut self) {
        self.record(NetworkCall::Sync);
    }

    fn write_single_value(&mut self, frame: u32, index: u16, sub_index: u8, value: u32) {
        self.record(NetworkCall::WriteValue(frame, index, sub_index, value));
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: Vec<u32>,
    trace: Option<CallTrace>,
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        if let Some(trace) = &self.trace {
            trace.borrow_mut().push(NetworkCall::Delay(ms));
        }
        self.calls.push(ms);
    }
}

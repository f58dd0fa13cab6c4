use std::collections::{BTreeMap, VecDeque};

use embedded_can::nb::Can;
use embedded_can::{ErrorKind, Frame, Id, StandardId};

#[derive(Clone, PartialEq, Eq)]
pub struct TestFrame {
    id: Id,
    data: Vec<u8>,
}

impl Frame for TestFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            None
        } else {
            Some(TestFrame { id: id.into(), data: data.to_vec() })
        }
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for TestFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", frame_to_string(self))
    }
}

pub fn frame_to_string<F: Frame>(frame: &F) -> String {
    let id = match frame.id() {
        Id::Standard(sid) => sid.as_raw() as u32,
        Id::Extended(eid) => eid.as_raw(),
    };
    let data_string = frame
        .data()
        .iter()
        .fold(String::from(""), |a, b| format!("{} {:02x}", a, b));

    format!("{:X}  [{}] {}", id, frame.dlc(), data_string)
}

pub fn raw_id(frame: &TestFrame) -> u16 {
    match frame.id() {
        Id::Standard(sid) => sid.as_raw(),
        Id::Extended(_) => 0xFFFF,
    }
}

#[derive(Debug)]
pub struct SimError;

impl embedded_can::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One EPOS drive as seen on the bus: RPDO setpoints are looped back into
/// the TPDO measures on every SYNC.
#[derive(Debug, Default)]
pub struct SimDrive {
    pub control_word: u16,
    pub operation_mode: u8,
    pub fault: bool,
    pub analog: u16,
    pub rpdo1: [u8; 8],
    pub rpdo2: [u8; 8],
    pub sdo_log: Vec<(u16, u8, u32)>,
}

impl SimDrive {
    pub fn status_word(&self) -> u16 {
        if self.fault {
            return 0x0208;
        }
        let cw = self.control_word;
        if cw & 0x000F == 0x000F {
            0x0237
        } else if cw & 0x0007 == 0x0007 {
            0x0233
        } else if cw & 0x0006 == 0x0006 {
            0x0231
        } else {
            0x0240
        }
    }

    pub fn control_words(&self) -> Vec<u32> {
        self.sdo_log.iter().filter(|w| w.0 == 0x6040).map(|w| w.2).collect()
    }

    pub fn operation_modes(&self) -> Vec<u32> {
        self.sdo_log.iter().filter(|w| w.0 == 0x6060).map(|w| w.2).collect()
    }

    fn apply_sdo(&mut self, index: u16, sub_index: u8, value: u32) {
        self.sdo_log.push((index, sub_index, value));
        match index {
            0x6040 => {
                let cw = value as u16;
                if cw & 0x80 != 0 && self.control_word & 0x80 == 0 {
                    self.fault = false;
                }
                self.control_word = cw;
            }
            0x6060 => self.operation_mode = value as u8,
            _ => {}
        }
    }
}

/// A bus with simulated drives behind it, implementing the controller side.
///
/// With a non-zero `reply_latency`, replies stay in flight until that many
/// `receive` polls have come back empty, like a controller whose drives
/// answer after the SYNC call has returned.
#[derive(Debug, Default)]
pub struct SimBus {
    pub drives: BTreeMap<u8, SimDrive>,
    pub sent: Vec<TestFrame>,
    pub reply_latency: u32,
    pub empty_polls: u32,
    rx_queue: VecDeque<TestFrame>,
    in_flight: VecDeque<TestFrame>,
    countdown: u32,
}

impl SimBus {
    pub fn with_nodes(node_ids: &[u8]) -> Self {
        let mut bus = SimBus::default();
        for &id in node_ids {
            bus.drives.insert(id, SimDrive::default());
        }
        bus
    }

    pub fn drive(&self, node_id: u8) -> &SimDrive {
        &self.drives[&node_id]
    }

    pub fn drive_mut(&mut self, node_id: u8) -> &mut SimDrive {
        self.drives.get_mut(&node_id).expect("no such drive")
    }

    pub fn sent_with_id(&self, cob_id: u16) -> Vec<Vec<u8>> {
        self.sent.iter().filter(|f| raw_id(f) == cob_id).map(|f| f.data.clone()).collect()
    }

    pub fn with_reply_latency(mut self, polls: u32) -> Self {
        self.reply_latency = polls;
        self
    }

    fn queue(&mut self, cob_id: u16, data: &[u8]) {
        let frame = TestFrame::new(StandardId::new(cob_id).expect("bad cob id"), data).expect("bad frame");
        if self.reply_latency == 0 {
            self.rx_queue.push_back(frame);
        } else {
            if self.in_flight.is_empty() {
                self.countdown = self.reply_latency;
            }
            self.in_flight.push_back(frame);
        }
    }

    fn on_sync(&mut self) {
        let mut replies = Vec::new();
        for (&id, drive) in self.drives.iter() {
            let mut tpdo1 = [0u8; 8];
            tpdo1[0..6].copy_from_slice(&drive.rpdo1[0..6]);
            tpdo1[6..8].copy_from_slice(&drive.status_word().to_le_bytes());
            let mut tpdo2 = [0u8; 8];
            tpdo2[0..4].copy_from_slice(&drive.rpdo2[0..4]);
            tpdo2[4..6].copy_from_slice(&drive.analog.to_le_bytes());
            replies.push((0x180 + id as u16, tpdo1));
            replies.push((0x280 + id as u16, tpdo2));
        }
        for (cob_id, data) in replies {
            self.queue(cob_id, &data);
        }
    }
}

impl Can for SimBus {
    type Frame = TestFrame;
    type Error = SimError;

    fn transmit(&mut self, frame: &TestFrame) -> nb::Result<Option<TestFrame>, SimError> {
        self.sent.push(frame.clone());
        let cob_id = raw_id(frame);
        let node_id = (cob_id & 0x7F) as u8;
        let data = frame.data().to_vec();

        match cob_id & 0xFF80 {
            0x080 if node_id == 0 => self.on_sync(),
            0x200 => {
                if let Some(drive) = self.drives.get_mut(&node_id) {
                    drive.rpdo1.copy_from_slice(&data);
                }
            }
            0x300 => {
                if let Some(drive) = self.drives.get_mut(&node_id) {
                    drive.rpdo2.copy_from_slice(&data);
                }
            }
            0x600 if data.len() == 8 && data[0] == 0x22 => {
                let index = u16::from_le_bytes([data[1], data[2]]);
                let sub_index = data[3];
                let value = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
                if let Some(drive) = self.drives.get_mut(&node_id) {
                    drive.apply_sdo(index, sub_index, value);
                    self.queue(0x580 + node_id as u16, &[0x60, data[1], data[2], sub_index, 0, 0, 0, 0]);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<TestFrame, SimError> {
        if let Some(frame) = self.rx_queue.pop_front() {
            return Ok(frame);
        }
        if self.in_flight.is_empty() || self.countdown > 0 {
            self.countdown = self.countdown.saturating_sub(1);
            self.empty_polls += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.rx_queue.extend(self.in_flight.drain(..));
        self.rx_queue.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

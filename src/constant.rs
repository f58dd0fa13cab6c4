/// Canopen Function code prefixes on COB_ID
pub(crate) const COB_FUNC_SYNC: u16 = 0x080;
pub(crate) const COB_FUNC_TPDO_0: u16 = 0x180;
pub(crate) const COB_FUNC_RPDO_0: u16 = 0x200;
pub(crate) const COB_FUNC_TPDO_1: u16 = 0x280;
pub(crate) const COB_FUNC_RPDO_1: u16 = 0x300;
pub(crate) const COB_FUNC_TRANSMIT_SDO: u16 = 0x580;
pub(crate) const COB_FUNC_RECEIVE_SDO: u16 = 0x600;

/// Node ids accepted on the bus.
pub(crate) const MIN_NODE_ID: u32 = 1;
pub(crate) const MAX_NODE_ID: u32 = 127;

/// CiA 402 Registers
pub const REG_CONTROL_WORD: u16 = 0x6040;
pub const REG_MODES_OF_OPERATION: u16 = 0x6060;

/// SDO expedited download, size not indicated.
pub(crate) const SDO_EXPEDITED_DOWNLOAD: u8 = 0x22;

/// Misc
pub const PDO_PAYLOAD_LENGTH: usize = 8;
pub const DEFAULT_SETTLE_INTERVAL_MS: u32 = 200;
pub const DEFAULT_SYNC_POLL_LIMIT: u32 = 10_000;
pub(crate) const CURRENT_SCALE: f64 = 1000.0;
pub(crate) const INPUT_CHANNELS_NUMBER: usize = 4;
pub(crate) const OUTPUT_CHANNELS_NUMBER: usize = 3;

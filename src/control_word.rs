use bitfield_struct::bitfield;

/// Controlword (0x6040) of the drive.
/// The bitfield representation is based on an `u16` with the least significant bit first,
/// so every flag sits at its wire position.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct ControlWord {
    /// 0 Switch on.
    pub switch_on: bool,
    /// 1 Enable voltage.
    pub enable_voltage: bool,
    /// 2 Quick stop, active low on the drive.
    pub quick_stop: bool,
    /// 3 Enable operation.
    pub enable_operation: bool,
    /// 4 New setpoint (profile position mode).
    pub new_setpoint: bool,
    /// 5 Change set immediately (profile position mode).
    pub change_immediately: bool,
    /// 6 Absolute / relative target (profile position mode).
    pub abs_rel: bool,
    /// 7 Fault reset, acts on the rising edge.
    pub fault_reset: bool,
    /// 8 Halt.
    pub halt: bool,
    #[bits(7)]
    _reserved_0: u8,
}

/// Statusword (0x6041) of the drive.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct StatusWord {
    /// 0 Ready to switch on.
    pub ready_to_switch_on: bool,
    /// 1 Switched on.
    pub switched_on: bool,
    /// 2 Operation enabled.
    pub operation_enabled: bool,
    /// 3 Fault.
    pub fault: bool,
    /// 4 Voltage enabled.
    pub voltage_enabled: bool,
    /// 5 Quick stop, low while a quick stop is active.
    pub quick_stop: bool,
    /// 6 Switch on disabled.
    pub switch_on_disabled: bool,
    #[bits(2)]
    _reserved_0: u8,
    /// 9 Remote, the drive follows NMT commands.
    pub remote: bool,
    /// 10 Target reached.
    pub target_reached: bool,
    #[bits(1)]
    _reserved_1: u8,
    /// 12 Setpoint acknowledge.
    pub setpoint_ack: bool,
    #[bits(3)]
    _reserved_2: u8,
}

/// CiA 402 power state machine states.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriveState {
    NotReadyToSwitchOn,
    SwitchOnDisabled,
    ReadyToSwitchOn,
    SwitchedOn,
    OperationEnabled,
    QuickStopActive,
    FaultReactionActive,
    Fault,
}

impl DriveState {
    /// Decodes the state from bits 0-3, 5 and 6 of a status word.
    pub fn from_status_word(status_word: StatusWord) -> Self {
        let raw = u16::from(status_word);
        match raw & 0x4F {
            0x00 => DriveState::NotReadyToSwitchOn,
            0x40 => DriveState::SwitchOnDisabled,
            0x0F => DriveState::FaultReactionActive,
            0x08 => DriveState::Fault,
            _ => match raw & 0x6F {
                0x21 => DriveState::ReadyToSwitchOn,
                0x23 => DriveState::SwitchedOn,
                0x27 => DriveState::OperationEnabled,
                0x07 => DriveState::QuickStopActive,
                _ if status_word.fault() => DriveState::Fault,
                _ => DriveState::NotReadyToSwitchOn,
            },
        }
    }
}

use crate::channel::{OperationMode, OutputChannel};
use crate::constant::REG_MODES_OF_OPERATION;
use crate::delay::Delay;
use crate::error::ErrorCode;
use crate::network::CanNetwork;
use crate::prelude::Debug;
use crate::task::Task;
use crate::{debug, info};

// Every command below is best effort: the SDO write reports nothing back, the
// next decoded status word is the only confirmation of the drive state.
impl<H: Copy + Debug> Task<H> {
    /// Walks the drive to operation enabled, or back to ready to switch on.
    ///
    /// The drive does not allow jumping between those two states, so both
    /// directions pass through switched on first and wait for the settle
    /// interval before the second control word.
    pub fn enable_output<N, D>(&mut self, network: &mut N, delay: &mut D, enable: bool)
    where
        N: CanNetwork<FrameHandle = H>,
        D: Delay,
    {
        self.control_word.set_switch_on(true);
        self.control_word.set_enable_operation(false);
        self.send_control_word(network);

        delay.delay_ms(self.settle_interval_ms);

        if enable {
            self.control_word.set_enable_operation(true);
        } else {
            self.control_word.set_switch_on(false);
        }
        self.send_control_word(network);
        debug!("node {}: output {}, control word = {:#06x}",
            self.node_id, if enable { "enabled" } else { "disabled" }, u16::from(self.control_word));
    }

    /// Pulses the fault reset bit, the drive clears faults on the rising edge.
    pub fn reset<N, D>(&mut self, network: &mut N, delay: &mut D)
    where
        N: CanNetwork<FrameHandle = H>,
        D: Delay,
    {
        info!("node {}: fault reset", self.node_id);
        self.control_word.set_fault_reset(true);
        self.send_control_word(network);

        delay.delay_ms(self.settle_interval_ms);

        self.control_word.set_fault_reset(false);
        self.send_control_word(network);
    }

    /// Selects the mode of operation for `channel` and enables the output.
    /// Only one output channel may be held at a time.
    pub fn acquire_output_channel<N, D>(
        &mut self,
        network: &mut N,
        delay: &mut D,
        channel: u32,
    ) -> Result<(), ErrorCode>
    where
        N: CanNetwork<FrameHandle = H>,
        D: Delay,
    {
        let output = OutputChannel::from_index(channel).ok_or(ErrorCode::InvalidChannel { channel })?;
        if self.is_output_channel_used {
            return Err(ErrorCode::OutputChannelInUse { channel });
        }

        let mode = output.operation_mode();
        info!("node {}: setting operation mode {:X}", self.node_id, mode.code());
        self.send_operation_mode(network, mode);
        self.enable_output(network, delay, true);
        self.is_output_channel_used = true;
        Ok(())
    }

    /// Disables the output and the mode of operation. Unknown channels are ignored.
    pub fn release_output_channel<N, D>(&mut self, network: &mut N, delay: &mut D, channel: u32)
    where
        N: CanNetwork<FrameHandle = H>,
        D: Delay,
    {
        if OutputChannel::from_index(channel).is_none() {
            return;
        }

        self.send_operation_mode(network, OperationMode::Disabled);
        self.enable_output(network, delay, false);
        self.is_output_channel_used = false;
    }

    fn send_operation_mode<N>(&mut self, network: &mut N, mode: OperationMode)
    where
        N: CanNetwork<FrameHandle = H>,
    {
        network.write_single_value(self.write_frames.sdo, REG_MODES_OF_OPERATION, 0x00, mode.code() as u32);
    }
}

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]

extern crate alloc;

pub mod can_bus;
pub mod channel;
pub mod constant;
pub mod control_word;
pub mod delay;
pub mod error;
pub mod network;
pub mod pdo;
pub mod registry;
pub mod state_machine;
pub mod task;
pub mod util;

mod prelude;
#[cfg(test)]
mod test_utils;

pub use can_bus::{CanBus, FrameId};
pub use channel::{InputChannel, OperationMode, OutputChannel};
pub use control_word::{ControlWord, DriveState, StatusWord};
pub use delay::{Delay, NoDelay};
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub use delay::StdDelay;
pub use error::ErrorCode;
pub use network::{CanNetwork, FrameDirection, FrameKind};
pub use registry::{TaskHandle, TaskRegistry};
pub use task::Task;

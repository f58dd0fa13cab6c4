#[cfg(not(all(target_arch = "arm", target_os = "none")))]
mod std_items {
    pub use std::fmt;
    pub use std::fmt::Debug;
    pub use std::format;
    pub use std::string::{String, ToString};
    pub use std::vec::Vec;
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub use std_items::*;

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod no_std_items {
    pub use alloc::fmt;
    pub use alloc::fmt::Debug;
    pub use alloc::format;
    pub use alloc::string::{String, ToString};
    pub use alloc::vec::Vec;
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use no_std_items::*;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        {
            log::info!("[epos] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::info!("[epos] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        {
            log::debug!("[epos] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::debug!("[epos] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        {
            log::warn!("[epos] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::warn!("[epos] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        {
            log::error!("[epos] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::error!("[epos] {}", defmt::Debug2Format(&value_str));
        }
    };
}

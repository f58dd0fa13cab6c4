#![allow(dead_code)]

pub mod sim_bus;
pub mod util;

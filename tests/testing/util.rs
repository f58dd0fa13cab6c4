use epos_canopen::{CanBus, Delay, TaskRegistry};

use super::sim_bus::SimBus;

pub type SimRegistry = TaskRegistry<CanBus<SimBus>, RecordingDelay>;

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: Vec<u32>,
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}

pub fn registry_with_nodes(node_ids: &[u8]) -> SimRegistry {
    registry_with_bus(CanBus::new(SimBus::with_nodes(node_ids)))
}

pub fn registry_with_bus(bus: CanBus<SimBus>) -> SimRegistry {
    TaskRegistry::new(bus, RecordingDelay::default())
}

pub fn sim(registry: &SimRegistry) -> &SimBus {
    registry.network().can()
}

pub fn sim_mut(registry: &mut SimRegistry) -> &mut SimBus {
    registry.network_mut().can_mut()
}

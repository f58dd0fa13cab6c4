/// Blocking wait used between successive control word writes.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Sleeps the calling thread.
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Returns immediately. For simulated buses and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

use hashbrown::HashMap;

use crate::channel::InputChannel;
use crate::constant::DEFAULT_SETTLE_INTERVAL_MS;
use crate::control_word::{ControlWord, DriveState, StatusWord};
use crate::delay::Delay;
use crate::error::ErrorCode;
use crate::network::CanNetwork;
use crate::task::Task;
use crate::util::config_hash;
use crate::{debug, error, info};

/// Handle of a registered task, the hash of its configuration text.
pub type TaskHandle = i32;

type TaskMap<H> = HashMap<TaskHandle, Task<H>>;

fn lookup<H>(tasks: &mut Option<TaskMap<H>>, handle: TaskHandle) -> Result<&mut Task<H>, ErrorCode> {
    tasks
        .as_mut()
        .and_then(|t| t.get_mut(&handle))
        .ok_or(ErrorCode::UnknownTask { handle })
}

/// Owns the network, the settle delay and every task registered on them.
///
/// The map of tasks is created on the first registration and dropped again
/// once the last task is unregistered. Nothing here is synchronized: calls
/// for the same handle must not overlap, and registration must be serialized
/// with everything else.
pub struct TaskRegistry<N: CanNetwork, D: Delay> {
    network: N,
    delay: D,
    tasks: Option<TaskMap<N::FrameHandle>>,
    settle_interval_ms: u32,
}

impl<N: CanNetwork, D: Delay> TaskRegistry<N, D> {
    pub fn new(network: N, delay: D) -> Self {
        TaskRegistry { network, delay, tasks: None, settle_interval_ms: DEFAULT_SETTLE_INTERVAL_MS }
    }

    /// Wait between two control word writes of tasks registered afterwards.
    pub fn with_settle_interval(mut self, ms: u32) -> Self {
        self.settle_interval_ms = ms;
        self
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn task_count(&self) -> usize {
        self.tasks.as_ref().map_or(0, |t| t.len())
    }

    pub fn task(&self, handle: TaskHandle) -> Option<&Task<N::FrameHandle>> {
        self.tasks.as_ref().and_then(|t| t.get(&handle))
    }

    /// Returns the handle of the task for `config`, loading it on first use.
    ///
    /// Configurations hashing to the same handle share one task, whether the
    /// text is identical or not.
    pub fn register(&mut self, config: &str) -> Result<TaskHandle, ErrorCode> {
        let key = config_hash(config);
        let tasks = self.tasks.get_or_insert_with(HashMap::new);
        if tasks.contains_key(&key) {
            debug!("task '{}' (key {}) already exists", config, key);
            return Ok(key);
        }

        match Task::load(&mut self.network, config, self.settle_interval_ms) {
            Ok(task) => {
                tasks.insert(key, task);
                info!("task '{}' registered with key {} (total: {})", config, key, tasks.len());
                Ok(key)
            }
            Err(err) => {
                error!("loading task '{}' failed: {:?}", config, err);
                if tasks.is_empty() {
                    self.tasks = None;
                }
                Err(err)
            }
        }
    }

    /// Disables the output of the task and releases its frames. Unknown
    /// handles are ignored.
    pub fn unregister(&mut self, handle: TaskHandle) {
        let tasks = match self.tasks.as_mut() {
            Some(tasks) => tasks,
            None => return,
        };
        let mut task = match tasks.remove(&handle) {
            Some(task) => task,
            None => return,
        };

        task.is_reading = false;
        task.enable_output(&mut self.network, &mut self.delay, false);
        task.unload(&mut self.network);
        info!("task {} unregistered", handle);

        if tasks.is_empty() {
            self.tasks = None;
        }
    }

    pub fn max_input_samples(&self, handle: TaskHandle) -> usize {
        match self.task(handle) {
            Some(_) => 1,
            None => 0,
        }
    }

    pub fn read(&mut self, handle: TaskHandle, channel: u32) -> Result<f64, ErrorCode> {
        lookup(&mut self.tasks, handle)?.read(&mut self.network, channel)
    }

    pub fn write(&mut self, handle: TaskHandle, channel: u32, value: f64) -> Result<(), ErrorCode> {
        lookup(&mut self.tasks, handle)?.write(&mut self.network, channel, value)
    }

    /// Fault bit of the status word decoded by the last read.
    pub fn has_fault(&self, handle: TaskHandle) -> bool {
        self.task(handle).map_or(false, |t| t.has_fault())
    }

    pub fn reset(&mut self, handle: TaskHandle) {
        if let Ok(task) = lookup(&mut self.tasks, handle) {
            task.reset(&mut self.network, &mut self.delay);
        }
    }

    pub fn channel_valid(&self, handle: TaskHandle, channel: u32) -> bool {
        self.task(handle).is_some() && InputChannel::from_index(channel).is_some()
    }

    pub fn acquire_output(&mut self, handle: TaskHandle, channel: u32) -> Result<(), ErrorCode> {
        lookup(&mut self.tasks, handle)?.acquire_output_channel(&mut self.network, &mut self.delay, channel)
    }

    pub fn release_output(&mut self, handle: TaskHandle, channel: u32) {
        if let Ok(task) = lookup(&mut self.tasks, handle) {
            task.release_output_channel(&mut self.network, &mut self.delay, channel);
        }
    }

    /// Whether the last read reported the drive as switched on or enabled.
    pub fn is_output_enabled(&self, handle: TaskHandle) -> bool {
        self.task(handle).map_or(false, |t| t.is_output_enabled())
    }

    pub fn drive_state(&self, handle: TaskHandle) -> Option<DriveState> {
        self.task(handle).map(|t| DriveState::from_status_word(t.status_word()))
    }

    pub fn status_word(&self, handle: TaskHandle) -> Option<StatusWord> {
        self.task(handle).map(|t| t.status_word())
    }

    pub fn control_word(&self, handle: TaskHandle) -> Option<ControlWord> {
        self.task(handle).map(|t| t.control_word())
    }
}

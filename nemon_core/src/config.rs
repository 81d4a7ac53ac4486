use crate::watchpoint::DEFAULT_CAPACITY;

pub const DEFAULT_PROMPT: &str = "(nemon) ";
pub const DEFAULT_HISTORY_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    Interactive,
    // Runs the machine to completion once, without reading any input
    Batch,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub mode: MonitorMode,
    pub watchpoint_capacity: usize,
    pub prompt: String,
    pub history_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> MonitorConfig {
        MonitorConfig {
            mode: MonitorMode::Interactive,
            watchpoint_capacity: DEFAULT_CAPACITY,
            prompt: DEFAULT_PROMPT.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

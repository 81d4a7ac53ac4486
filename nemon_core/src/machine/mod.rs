mod eval;
pub mod image;

use crate::errors::MonitorError;
use std::io::{self, Write};

pub use self::image::ImageMachine;

pub trait Evaluator {
    /// Evaluates `expression` against the current machine state, `None` if it is not valid.
    fn evaluate(&mut self, expression: &str) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCount {
    Bounded(u64),
    Unbounded,
}

impl From<i64> for StepCount {
    // A negative count runs until the machine stops on its own
    fn from(count: i64) -> StepCount {
        if count < 0 {
            StepCount::Unbounded
        } else {
            StepCount::Bounded(count as u64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Stopped,
    Running,
    Ended { pc: u64, code: i64 },
    Aborted { pc: u64 },
}

impl ExecState {
    pub fn is_finished(&self) -> bool {
        matches!(self, ExecState::Ended { .. } | ExecState::Aborted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    Byte = 1,
    Half = 2,
    Word = 4,
    Double = 8,
}

impl AccessWidth {
    #[inline]
    pub fn byte_count(self) -> u64 {
        self as u64
    }
}

/// The emulated machine as seen by the monitor.
///
/// `step_or_run` must call `on_retire` once after every instruction it retires,
/// handing the machine itself back as the evaluator. The monitor hooks watchpoint
/// re-evaluation in there and never calls back into the stepper from it.
pub trait Machine: Evaluator {
    fn state(&self) -> ExecState;

    fn step_or_run(
        &mut self,
        count: StepCount,
        on_retire: &mut dyn FnMut(&mut dyn Evaluator),
    ) -> Result<ExecState, MonitorError>;

    fn read_memory(&mut self, address: u64, width: AccessWidth) -> Result<u64, MonitorError>;

    fn display_registers(&self, out: &mut dyn Write) -> io::Result<()>;
}

use crate::errors::MonitorError;
use enum_dispatch::enum_dispatch;

pub mod readline;
pub mod script;

pub use self::readline::ReadlineFrontend;
pub use self::script::ScriptFrontend;

#[enum_dispatch]
pub trait LineReader {
    /// Reads one trimmed line, `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MonitorError>;
    fn add_history(&mut self, line: &str);
}

#[enum_dispatch(LineReader)]
pub enum MonitorFrontend {
    ReadlineFrontend,
    ScriptFrontend,
}

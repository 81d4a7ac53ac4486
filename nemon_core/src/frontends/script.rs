use crate::errors::MonitorError;
use crate::frontends::LineReader;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Replays a fixed list of command lines, as if an operator had typed them.
pub struct ScriptFrontend {
    lines: VecDeque<String>,

    history: VecDeque<String>,
    history_size: usize,
}

impl ScriptFrontend {
    pub fn new<I, S>(lines: I, history_size: usize) -> ScriptFrontend
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptFrontend {
            lines: lines.into_iter().map(Into::into).collect(),
            history: VecDeque::with_capacity(history_size),
            history_size,
        }
    }

    pub fn from_path(path: &Path, history_size: usize) -> Result<ScriptFrontend, MonitorError> {
        let script = fs::read_to_string(path)?;
        Ok(ScriptFrontend::new(script.lines(), history_size))
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    /// Recorded lines, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

impl LineReader for ScriptFrontend {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, MonitorError> {
        Ok(self.lines.pop_front().map(|line| line.trim().to_string()))
    }

    fn add_history(&mut self, line: &str) {
        if self.history_size == 0 || self.history.back().map(String::as_str) == Some(line) {
            return;
        }
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }
}

use crate::errors::MonitorError;
use crate::frontends::LineReader;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing::warn;

pub struct ReadlineFrontend {
    editor: Editor<(), DefaultHistory>,
}

impl ReadlineFrontend {
    pub fn new(history_size: usize) -> Result<ReadlineFrontend, MonitorError> {
        let config = Config::builder()
            .max_history_size(history_size)
            .map_err(input_error)?
            .history_ignore_dups(true)
            .map_err(input_error)?
            .build();

        let editor = Editor::with_config(config).map_err(input_error)?;

        Ok(ReadlineFrontend { editor })
    }
}

impl LineReader for ReadlineFrontend {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MonitorError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            // Ctrl-C drops the current line, Ctrl-D ends the session
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(input_error(e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!("Could not record history entry: {}", e);
        }
    }
}

fn input_error(e: ReadlineError) -> MonitorError {
    MonitorError::Input(e.to_string())
}

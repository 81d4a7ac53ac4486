#[macro_use]
extern crate nom;

pub mod command;
pub mod config;
mod errors;
pub mod frontends;
pub mod machine;
mod parsers;
pub mod watchpoint;

use crate::command::{CommandContext, CommandSignal};
use crate::frontends::LineReader;
use crate::machine::Machine;
use crate::watchpoint::WatchpointPool;

use std::io::{self, Write};
use tracing::{debug, info};

pub use crate::config::{MonitorConfig, MonitorMode};
pub use crate::errors::MonitorError;
pub use crate::frontends::{MonitorFrontend, ReadlineFrontend, ScriptFrontend};
pub use crate::machine::ImageMachine;

/// The monitor: owns the machine under inspection, the watchpoint pool and the
/// sink all operator-facing output goes to.
pub struct Monitor<M: Machine, W: Write = io::Stdout> {
    machine: M,
    watchpoints: WatchpointPool,
    out: W,

    config: MonitorConfig,
}

impl<M: Machine> Monitor<M> {
    pub fn new(machine: M, config: MonitorConfig) -> Monitor<M> {
        Monitor::with_output(machine, config, io::stdout())
    }
}

impl<M: Machine, W: Write> Monitor<M, W> {
    pub fn with_output(machine: M, config: MonitorConfig, out: W) -> Monitor<M, W> {
        let watchpoints = WatchpointPool::new(config.watchpoint_capacity);

        Monitor {
            machine,
            watchpoints,
            out,
            config,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn watchpoints(&self) -> &WatchpointPool {
        &self.watchpoints
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Executes a single command line.
    pub fn execute(&mut self, line: &str) -> Result<CommandSignal, MonitorError> {
        let mut ctx = CommandContext {
            machine: &mut self.machine,
            watchpoints: &mut self.watchpoints,
            out: &mut self.out,
        };

        command::dispatch(&mut ctx, line)
    }

    /// Runs the monitor until the operator quits or input runs out. In batch mode
    /// the machine is run to completion once and `reader` is never touched.
    pub fn run<R: LineReader>(&mut self, reader: &mut R) -> Result<(), MonitorError> {
        if self.config.mode == MonitorMode::Batch {
            info!("batch mode, running to completion");
            self.execute("c")?;
            return self.out.flush().map_err(MonitorError::from);
        }

        loop {
            let line = match reader.read_line(&self.config.prompt)? {
                Some(line) => line,
                None => {
                    debug!("end of input");
                    break;
                }
            };

            if line.is_empty() {
                continue;
            }
            reader.add_history(&line);

            match self.execute(&line) {
                Ok(CommandSignal::Continue) => {}
                Ok(CommandSignal::Quit) => {
                    debug!("quit requested");
                    break;
                }
                Err(e) => {
                    debug!(line = line.as_str(), error = %e, "command failed");
                    writeln!(self.out, "{}", e)?;
                }
            }
            self.out.flush()?;
        }

        self.out.flush().map_err(MonitorError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::image::MEM_BASE;

    fn monitor(config: MonitorConfig) -> Monitor<ImageMachine, Vec<u8>> {
        Monitor::with_output(ImageMachine::with_builtin_image(0x1000), config, Vec::new())
    }

    fn output(monitor: &Monitor<ImageMachine, Vec<u8>>) -> String {
        String::from_utf8(monitor.output().clone()).unwrap()
    }

    #[test]
    fn quit_stops_reading_input() {
        let mut monitor = monitor(MonitorConfig::default());
        let mut script = ScriptFrontend::new(vec!["si", "q", "si"], 10);

        monitor.run(&mut script).unwrap();

        assert_eq!(script.remaining(), 1);
        assert_eq!(monitor.machine().pc(), MEM_BASE + 4);
    }

    #[test]
    fn end_of_input_stops_loop() {
        let mut monitor = monitor(MonitorConfig::default());
        let mut script = ScriptFrontend::new(vec!["si 2"], 10);

        monitor.run(&mut script).unwrap();

        assert_eq!(monitor.machine().pc(), MEM_BASE + 8);
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let mut monitor = monitor(MonitorConfig::default());
        let mut script = ScriptFrontend::new(vec!["bogus", "d 3", "si x", "si"], 10);

        monitor.run(&mut script).unwrap();

        assert_eq!(
            output(&monitor),
            "Unknown command 'bogus'\nWatchpoint 3 is not set\nUsage: si [N]\n"
        );
        assert_eq!(monitor.machine().pc(), MEM_BASE + 4);
    }

    #[test]
    fn non_empty_lines_are_recorded_in_history() {
        let mut monitor = monitor(MonitorConfig::default());
        let mut script = ScriptFrontend::new(vec!["", "  ", "info w", "q"], 10);

        monitor.run(&mut script).unwrap();

        assert_eq!(script.history().collect::<Vec<_>>(), vec!["info w", "q"]);
    }

    #[test]
    fn batch_mode_runs_without_reading_input() {
        let config = MonitorConfig {
            mode: MonitorMode::Batch,
            ..MonitorConfig::default()
        };
        let mut monitor = monitor(config);
        let mut script = ScriptFrontend::new(vec!["q"], 10);

        monitor.run(&mut script).unwrap();

        assert_eq!(script.remaining(), 1);
        assert!(monitor.machine().state().is_finished());
        assert_eq!(output(&monitor), "nemon: HIT GOOD TRAP at pc = 0x8000000c\n");
    }

    #[test]
    fn monitor_frontend_dispatches_to_script() {
        let mut monitor = monitor(MonitorConfig::default());
        let mut frontend = MonitorFrontend::from(ScriptFrontend::new(vec!["w $pc", "c"], 10));

        monitor.run(&mut frontend).unwrap();

        assert!(output(&monitor).starts_with("Watchpoint 0: $pc\n"));
        assert_eq!(monitor.watchpoints().get(0).unwrap().last_value(), (MEM_BASE + 12) as i64);
    }
}

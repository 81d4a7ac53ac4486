pub mod args;
mod handlers;

use crate::errors::MonitorError;
use crate::machine::Machine;
use crate::watchpoint::WatchpointPool;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSignal {
    Continue,
    Quit,
}

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    pub machine: &'a mut dyn Machine,
    pub watchpoints: &'a mut WatchpointPool,
    pub out: &'a mut dyn Write,
}

pub type Handler = fn(&mut CommandContext<'_>, Option<&str>) -> Result<CommandSignal, MonitorError>;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    handler: Handler,
}

pub static COMMAND_TABLE: [CommandEntry; 9] = [
    CommandEntry {
        name: "help",
        description: "Display information about all supported commands",
        handler: handlers::help,
    },
    CommandEntry {
        name: "c",
        description: "Continue the execution of the program",
        handler: handlers::continue_execution,
    },
    CommandEntry {
        name: "q",
        description: "Exit the monitor",
        handler: handlers::quit,
    },
    CommandEntry {
        name: "si",
        description: "Usage: si [N]. Execute N instructions and pause, N defaults to 1",
        handler: handlers::step,
    },
    CommandEntry {
        name: "info",
        description: "Usage: info r|w. Print the registers or the watchpoints",
        handler: handlers::info,
    },
    CommandEntry {
        name: "x",
        description: "Usage: x N EXPR. Print N 4-byte words of memory starting at EXPR",
        handler: handlers::scan_memory,
    },
    CommandEntry {
        name: "p",
        description: "Usage: p EXPR. Evaluate the expression EXPR",
        handler: handlers::print_expression,
    },
    CommandEntry {
        name: "w",
        description: "Usage: w EXPR. Report whenever the value of EXPR changes",
        handler: handlers::watch,
    },
    CommandEntry {
        name: "d",
        description: "Usage: d N. Delete watchpoint number N",
        handler: handlers::delete_watchpoint,
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandEntry> {
    COMMAND_TABLE.iter().find(|entry| entry.name == name)
}

/// Splits a line into its command name and the argument tail. The tail is the
/// rest of the line with its surrounding whitespace removed, inner spacing is
/// left untouched for the handler to tokenize.
/// Returns `None` for a blank line; an all-blank tail becomes `None` as well.
pub fn split_command(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }

    let (name, tail) = match line.find(char::is_whitespace) {
        Some(index) => (&line[..index], line[index..].trim()),
        None => (line, ""),
    };
    let args = if tail.is_empty() { None } else { Some(tail) };

    Some((name, args))
}

/// Executes one input line. A blank line is a no-op.
pub fn dispatch(ctx: &mut CommandContext<'_>, line: &str) -> Result<CommandSignal, MonitorError> {
    let (name, args) = match split_command(line) {
        Some(split) => split,
        None => return Ok(CommandSignal::Continue),
    };

    let entry = find_command(name).ok_or_else(|| MonitorError::UnknownCommand(name.to_string()))?;
    debug!(command = entry.name, args = args.unwrap_or(""), "dispatching");

    (entry.handler)(ctx, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::ImageMachine;

    fn run_line(line: &str) -> (Result<CommandSignal, MonitorError>, String) {
        let mut machine = ImageMachine::with_builtin_image(0x1000);
        let mut watchpoints = WatchpointPool::default();
        let mut out = Vec::new();

        let result = {
            let mut ctx = CommandContext {
                machine: &mut machine,
                watchpoints: &mut watchpoints,
                out: &mut out,
            };
            dispatch(&mut ctx, line)
        };

        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn command_names_are_unique() {
        for (i, entry) in COMMAND_TABLE.iter().enumerate() {
            assert!(COMMAND_TABLE[i + 1..].iter().all(|other| other.name != entry.name));
        }
    }

    #[test]
    fn splits_name_from_raw_tail() {
        assert_eq!(split_command("x 4 0x80000000"), Some(("x", Some("4 0x80000000"))));
        assert_eq!(split_command("  si   "), Some(("si", None)));
        assert_eq!(split_command("p\t*$sp"), Some(("p", Some("*$sp"))));
        assert_eq!(split_command("w  $a0  "), Some(("w", Some("$a0"))));
        assert_eq!(split_command("x  4 \t 0x10 "), Some(("x", Some("4 \t 0x10"))));
        assert_eq!(split_command("   "), None);
        assert_eq!(split_command(""), None);
    }

    #[test]
    fn help_lists_every_command_in_order() {
        let (result, out) = run_line("help");

        assert_eq!(result.unwrap(), CommandSignal::Continue);
        let names: Vec<_> = out
            .lines()
            .map(|line| line.split(" - ").next().unwrap())
            .collect();
        let expected: Vec<_> = COMMAND_TABLE.iter().map(|entry| entry.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn help_for_single_command() {
        let (result, out) = run_line("help q");

        assert_eq!(result.unwrap(), CommandSignal::Continue);
        assert_eq!(out, "q - Exit the monitor\n");
    }

    #[test]
    fn help_for_unknown_command() {
        let (result, out) = run_line("help bogus");

        assert!(matches!(result, Err(MonitorError::UnknownCommand(ref name)) if name == "bogus"));
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_command_is_reported() {
        let (result, _) = run_line("frobnicate 1 2");

        match result {
            Err(e @ MonitorError::UnknownCommand(_)) => {
                assert_eq!(e.to_string(), "Unknown command 'frobnicate'")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn quit_signals_termination() {
        let (result, _) = run_line("q");

        assert_eq!(result.unwrap(), CommandSignal::Quit);
    }

    #[test]
    fn blank_line_is_a_no_op() {
        let (result, out) = run_line("   ");

        assert_eq!(result.unwrap(), CommandSignal::Continue);
        assert!(out.is_empty());
    }
}

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("No free watchpoint left (all {0} slots in use)")]
    CapacityExhausted(usize),
    #[error("Watchpoint {0} does not exist")]
    NotFound(usize),
    #[error("Watchpoint {0} is not set")]
    NotActive(usize),
    #[error("Expression is {len} bytes long, at most {max} are allowed")]
    ExpressionTooLong { len: usize, max: usize },
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
    #[error("Usage: {0}")]
    MalformedArgument(&'static str),
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Address 0x{0:08X} is out of bound")]
    AddressOutOfBounds(u64),
    #[error("Error reading input: {0}")]
    Input(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

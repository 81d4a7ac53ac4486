use super::args::{self, InfoSelector, PRINT_USAGE, WATCH_USAGE};
use super::{find_command, CommandContext, CommandSignal, COMMAND_TABLE};
use crate::errors::MonitorError;
use crate::machine::{AccessWidth, Evaluator, ExecState, StepCount};
use crate::watchpoint::WatchpointChange;
use std::io::{self, Write};
use tracing::info;

pub fn help(ctx: &mut CommandContext<'_>, args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    match args {
        None => {
            for entry in COMMAND_TABLE.iter() {
                writeln!(ctx.out, "{} - {}", entry.name, entry.description)?;
            }
        }
        Some(args) => {
            let name = args.split_whitespace().next().unwrap_or(args);
            let entry = find_command(name)
                .ok_or_else(|| MonitorError::UnknownCommand(name.to_string()))?;
            writeln!(ctx.out, "{} - {}", entry.name, entry.description)?;
        }
    }

    Ok(CommandSignal::Continue)
}

pub fn continue_execution(
    ctx: &mut CommandContext<'_>,
    _args: Option<&str>,
) -> Result<CommandSignal, MonitorError> {
    run_machine(ctx, StepCount::Unbounded)
}

pub fn quit(_ctx: &mut CommandContext<'_>, _args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    Ok(CommandSignal::Quit)
}

pub fn step(ctx: &mut CommandContext<'_>, args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    let count = args::parse_step_count(args)?;
    run_machine(ctx, count)
}

pub fn info(ctx: &mut CommandContext<'_>, args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    match args::parse_info_selector(args)? {
        InfoSelector::Registers => ctx.machine.display_registers(ctx.out)?,
        InfoSelector::Watchpoints => list_watchpoints(ctx)?,
    }

    Ok(CommandSignal::Continue)
}

pub fn scan_memory(ctx: &mut CommandContext<'_>, args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    let (count, expression) = args::parse_scan_args(args)?;
    let base = match args::parse_address(expression) {
        Some(address) => address,
        None => evaluate(ctx, expression)? as u64,
    };

    let step = AccessWidth::Word.byte_count();
    for i in 0..count {
        let address = base.wrapping_add(i.wrapping_mul(step));
        let value = ctx.machine.read_memory(address, AccessWidth::Word)?;
        writeln!(ctx.out, "0x{:08x}: 0x{:08x}", address, value)?;
    }

    Ok(CommandSignal::Continue)
}

pub fn print_expression(
    ctx: &mut CommandContext<'_>,
    args: Option<&str>,
) -> Result<CommandSignal, MonitorError> {
    let expression = args.ok_or(MonitorError::MalformedArgument(PRINT_USAGE))?;
    let value = evaluate(ctx, expression)?;
    writeln!(ctx.out, "{} = {}", expression, value)?;

    Ok(CommandSignal::Continue)
}

pub fn watch(ctx: &mut CommandContext<'_>, args: Option<&str>) -> Result<CommandSignal, MonitorError> {
    let expression = args.ok_or(MonitorError::MalformedArgument(WATCH_USAGE))?;
    let value = evaluate(ctx, expression)?;

    let id = ctx.watchpoints.watch(expression, value)?;
    writeln!(ctx.out, "Watchpoint {}: {}", id, expression)?;

    Ok(CommandSignal::Continue)
}

pub fn delete_watchpoint(
    ctx: &mut CommandContext<'_>,
    args: Option<&str>,
) -> Result<CommandSignal, MonitorError> {
    let id = args::parse_watchpoint_id(args)?;

    let released = ctx.watchpoints.release(id)?;
    writeln!(ctx.out, "Delete watchpoint {}: {}", released.id(), released.expression())?;

    Ok(CommandSignal::Continue)
}

//
// helpers
//

fn evaluate(ctx: &mut CommandContext<'_>, expression: &str) -> Result<i64, MonitorError> {
    ctx.machine
        .evaluate(expression)
        .ok_or_else(|| MonitorError::InvalidExpression(expression.to_string()))
}

fn list_watchpoints(ctx: &mut CommandContext<'_>) -> io::Result<()> {
    if ctx.watchpoints.is_empty() {
        return writeln!(ctx.out, "No watchpoints set");
    }

    writeln!(ctx.out, "{:<8}{:<16}{}", "Num", "Expr", "Value")?;
    for wp in ctx.watchpoints.iter_active() {
        writeln!(ctx.out, "{:<8}{:<16}{}", wp.id(), wp.expression(), wp.last_value())?;
    }

    Ok(())
}

/// Runs the machine with every active watchpoint re-checked after each retired
/// instruction. Changes are only reported, execution is not paused on them.
pub fn run_machine(ctx: &mut CommandContext<'_>, count: StepCount) -> Result<CommandSignal, MonitorError> {
    if ctx.machine.state().is_finished() {
        writeln!(
            ctx.out,
            "Program execution has ended. To restart the program, exit the monitor and run again."
        )?;
        return Ok(CommandSignal::Continue);
    }

    let watchpoints = &mut *ctx.watchpoints;
    let out = &mut *ctx.out;
    let mut report: io::Result<()> = Ok(());

    let state = ctx.machine.step_or_run(count, &mut |evaluator: &mut dyn Evaluator| {
        let changes = watchpoints.reevaluate_all(|expression| evaluator.evaluate(expression));
        for change in changes.iter() {
            if report.is_ok() {
                report = report_change(out, change);
            }
        }
    })?;
    report?;

    report_state(ctx.out, state)?;
    Ok(CommandSignal::Continue)
}

fn report_change(out: &mut dyn Write, change: &WatchpointChange) -> io::Result<()> {
    info!(id = change.id, old_value = change.old_value, new_value = change.new_value, "watchpoint triggered");

    writeln!(out, "Watchpoint {}: {}", change.id, change.expression)?;
    writeln!(out, "Old value = {}", change.old_value)?;
    writeln!(out, "New value = {}", change.new_value)
}

fn report_state(out: &mut dyn Write, state: ExecState) -> io::Result<()> {
    match state {
        ExecState::Ended { pc, code } => {
            let verdict = if code == 0 { "HIT GOOD TRAP" } else { "HIT BAD TRAP" };
            writeln!(out, "nemon: {} at pc = 0x{:08x}", verdict, pc)
        }
        ExecState::Aborted { pc } => writeln!(out, "nemon: ABORT at pc = 0x{:08x}", pc),
        ExecState::Stopped | ExecState::Running => Ok(()),
    }
}

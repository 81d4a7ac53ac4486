use anyhow::{Context, Result};
use clap::Parser;
use nemon_core::machine::image::DEFAULT_MEM_SIZE;
use nemon_core::watchpoint::DEFAULT_CAPACITY;
use nemon_core::{
    ImageMachine, Monitor, MonitorConfig, MonitorFrontend, MonitorMode, ReadlineFrontend,
    ScriptFrontend,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nemon", version, about = "Interactive monitor for an emulated machine")]
struct Cli {
    /// Raw little-endian image loaded at the memory base (a built-in image is used if omitted)
    image: Option<PathBuf>,

    /// Run to completion without prompting for commands
    #[arg(short, long)]
    batch: bool,

    /// Write the log to FILE instead of stderr
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of watchpoint slots
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_CAPACITY)]
    watchpoints: usize,

    /// Read commands from FILE instead of the terminal
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log.as_deref(), cli.verbose)?;

    let machine = match cli.image {
        Some(ref path) => load_machine(path)?,
        None => {
            info!("No image is given, using the built-in image");
            ImageMachine::with_builtin_image(DEFAULT_MEM_SIZE)
        }
    };

    let config = MonitorConfig {
        mode: if cli.batch {
            MonitorMode::Batch
        } else {
            MonitorMode::Interactive
        },
        watchpoint_capacity: cli.watchpoints,
        ..MonitorConfig::default()
    };
    let history_size = config.history_size;

    let mut frontend: MonitorFrontend = match (config.mode, cli.script) {
        (MonitorMode::Batch, _) => ScriptFrontend::new(Vec::<String>::new(), 0).into(),
        (MonitorMode::Interactive, Some(ref path)) => ScriptFrontend::from_path(path, history_size)
            .with_context(|| format!("Could not read script {}", path.display()))?
            .into(),
        (MonitorMode::Interactive, None) => {
            println!("Welcome to nemon! Type \"help\" for the list of commands.");
            ReadlineFrontend::new(history_size)?.into()
        }
    };

    let mut monitor = Monitor::new(machine, config);
    monitor.run(&mut frontend)?;

    Ok(())
}

fn load_machine(path: &Path) -> Result<ImageMachine> {
    let image = fs::read(path).with_context(|| format!("Could not read image {}", path.display()))?;

    let mut machine = ImageMachine::new(DEFAULT_MEM_SIZE);
    machine.load_image(&image)?;

    info!(path = %path.display(), size = image.len(), "image loaded");
    Ok(machine)
}

fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, log_file.is_some())));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

// Keep the terminal quiet unless asked, the log file gets everything from info up
fn default_level(verbose: bool, to_file: bool) -> &'static str {
    match (verbose, to_file) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_levels() {
        assert_eq!(default_level(false, false), "warn");
        assert_eq!(default_level(false, true), "info");
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(true, true), "debug");
    }

    #[test]
    fn cli_arguments() {
        let cli = Cli::parse_from(["nemon", "-b", "-w", "4", "image.bin"]);

        assert!(cli.batch);
        assert_eq!(cli.watchpoints, 4);
        assert_eq!(cli.image, Some(PathBuf::from("image.bin")));
        assert!(cli.log.is_none());
    }
}

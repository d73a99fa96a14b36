//! Binary that installs, controls and runs the warden background service.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod commands;
mod console;
mod error;
mod platform;

use error::{Error, Result};

use std::error::Error as _;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use warden_admin::StopPolicy;
use warden_host::{ServiceIdentity, StartType};
use warden_service::ServiceOptions;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument => {
                println!("Invalid command.");
                process::exit(-1);
            }
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(-1);
            }
        },
    };

    // Another subscriber may already be installed when embedded; keep it.
    let _ = tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(cli.service.log_level)
            .with_writer(std::io::stderr)
            .finish(),
    );

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    };

    process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io("failed to start runtime", e))?;

    match cli.command {
        None => commands::service(&cli.service, &runtime),
        Some(Commands::Install(args)) => commands::install(&cli.service, &args),
        Some(Commands::Uninstall(args)) => {
            runtime.block_on(commands::uninstall(&cli.service, &args))
        }
        Some(Commands::Start(args)) => commands::start(&cli.service, &args),
        Some(Commands::Stop(args)) => runtime.block_on(commands::stop(&cli.service, &args)),
        Some(Commands::Status) => commands::status(&cli.service),
        Some(Commands::Console) => runtime.block_on(commands::console(&cli.service)),
        Some(Commands::Help) => {
            println!("{}", Cli::command().render_help());
            Ok(())
        }
    }
}

fn report(e: &Error) {
    eprintln!("error: {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Runs as a managed background service when started by the \
                  service manager with no command.",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register the service with the service manager
    Install(InstallArgs),
    /// Stop the service if it is running and remove it from the service manager
    Uninstall(StopArgs),
    /// Ask the service manager to start the service
    Start(StartArgs),
    /// Stop the running service and wait for it to exit
    Stop(StopArgs),
    /// Print the state recorded by the service manager
    Status,
    /// Run the service in the foreground; Ctrl-C stops it
    Console,
    /// Print usage
    Help,
}

#[derive(Args, Debug)]
struct ServiceArgs {
    /// Name the service is registered under
    #[arg(long, global = true, env = "WARDEN_SERVICE_NAME", default_value = "warden")]
    service_name: String,

    /// Name shown by service management tools
    #[arg(long, global = true, env = "WARDEN_DISPLAY_NAME", default_value = "Warden Service")]
    display_name: String,

    /// Executable registered with the service manager (defaults to this binary)
    #[arg(long, global = true, env = "WARDEN_EXECUTABLE_PATH")]
    executable_path: Option<PathBuf>,

    /// Interval between cancellation checks, in milliseconds
    #[arg(long, global = true, env = "WARDEN_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Wait hint published while starting, in milliseconds
    #[arg(long, global = true, env = "WARDEN_START_WAIT_HINT_MS", default_value_t = 3000)]
    start_wait_hint_ms: u64,

    /// Wait hint published while stopping, in milliseconds
    #[arg(long, global = true, env = "WARDEN_STOP_WAIT_HINT_MS")]
    stop_wait_hint_ms: Option<u64>,

    /// Maximum level of diagnostic output
    #[arg(long, global = true, env = "WARDEN_LOG_LEVEL", default_value_t = Level::INFO)]
    log_level: Level,
}

impl ServiceArgs {
    fn identity(&self) -> Result<ServiceIdentity> {
        let executable_path = match &self.executable_path {
            Some(path) => path.clone(),
            None => std::env::current_exe()
                .map_err(|e| Error::Io("failed to locate current executable", e))?,
        };

        Ok(ServiceIdentity::new(
            self.service_name.clone(),
            self.display_name.clone(),
            executable_path,
        )?)
    }

    fn options(&self) -> Result<ServiceOptions> {
        let mut options = ServiceOptions::new(self.identity()?)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms));

        options.start_wait_hint = Duration::from_millis(self.start_wait_hint_ms);
        if let Some(stop_wait_hint_ms) = self.stop_wait_hint_ms {
            options.stop_wait_hint = Duration::from_millis(stop_wait_hint_ms);
        }

        Ok(options)
    }
}

#[derive(Args, Debug)]
struct InstallArgs {
    /// When the service manager starts the service: auto, demand or disabled
    #[arg(long, default_value_t = StartType::Auto)]
    start_type: StartType,
}

#[derive(Args, Debug)]
struct StartArgs {
    /// Arguments passed to the service's entry point
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

#[derive(Args, Debug)]
struct StopArgs {
    /// Delay between status queries while waiting for the service to stop, in milliseconds
    #[arg(long, env = "WARDEN_STOP_POLL_INTERVAL_MS", default_value_t = 1000)]
    stop_poll_interval_ms: u64,

    /// Status queries made before giving up on the stop
    #[arg(long, env = "WARDEN_MAX_STOP_POLLS", default_value_t = 30)]
    max_stop_polls: u32,
}

impl StopArgs {
    const fn policy(&self) -> StopPolicy {
        StopPolicy {
            poll_interval: Duration::from_millis(self.stop_poll_interval_ms),
            max_polls: self.max_stop_polls,
        }
    }
}

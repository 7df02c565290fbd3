//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags, SessionFlags};
use crate::commands;
use crate::infra::secret::SecretSource;

/// Encrypted, containerised per-project dev sessions
#[derive(Parser)]
#[command(
    name = "capsule",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
#[command(group(ArgGroup::new("password").args(["password_env", "password_stdin"])))]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Encrypted volume file
    #[arg(long, global = true, value_name = "PATH", env = "CAPSULE_VOLUME")]
    pub volume: Option<PathBuf>,

    /// Read the volume password from this environment variable
    #[arg(long, global = true, value_name = "VAR")]
    pub password_env: Option<String>,

    /// Read the volume password from the first line of stdin
    #[arg(long, global = true)]
    pub password_stdin: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the encrypted volume
    Init(commands::init::InitArgs),

    /// Unlock the volume, start the container and open a shell
    Start(commands::start::StartArgs),

    /// Stop and remove the container (volume stays unlocked)
    Stop,

    /// Stop the container and lock the volume
    Lock,

    /// Unlock the volume without starting a container
    Unlock(commands::unlock::UnlockArgs),

    /// Show volume, container and docs link state
    Status(commands::status::StatusArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            workspace,
            volume,
            password_env,
            password_stdin,
            command,
        } = self;

        let secret_source = match (password_env, password_stdin) {
            (Some(var), _) => Some(SecretSource::Env(var)),
            (None, true) => Some(SecretSource::Stdin),
            (None, false) => None,
        };
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            session: SessionFlags {
                workspace,
                volume,
                secret_source,
            },
        })?;

        match command {
            Command::Init(args) => commands::init::run(&app, &args).await,
            Command::Start(args) => commands::start::run(&app, &args).await,
            Command::Stop => commands::stop::run(&app).await,
            Command::Lock => commands::lock::run(&app).await,
            Command::Unlock(args) => commands::unlock::run(&app, &args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}

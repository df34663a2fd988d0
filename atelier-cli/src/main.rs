use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use atelier_core::{config, display};
use atelier_kernel::config::UpdateMode;

mod actions;
use crate::actions::*;

/// A CLI that builds and edits single-page web applications with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "atelier",
    version,
    about,
    // Show help when you forget a subcommand
    arg_required_else_help = true,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug, Default)]
struct GlobalOpts {
    /// Enable debug logging; streams raw generation output
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Errors only
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Session file linking this conversation to its project
    #[arg(short = 's', long, global = true, value_name = "FILE")]
    session: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one request through the workflow: classify, dispatch, report
    ///
    /// Examples:
    ///   atelier run "make me a pomodoro timer"
    ///   git log --oneline | atelier run -
    Run(RunCmd),

    /// Create a project directly, skipping intent classification
    New(NewCmd),

    /// Show the current session's project path and application record
    Info(InfoCmd),

    /// List stored revisions of a project artifact
    History(HistoryCmd),

    /// Print a project artifact, current or at a stored revision
    Show(ShowCmd),
}

#[derive(ClapArgs, Debug)]
struct RunCmd {
    /// The request to process in a single workflow turn
    #[arg(value_name = "MESSAGE")]
    message: Option<String>,

    /// File with extra conversation context to prepend
    #[arg(short = 'c', long, value_name = "FILE")]
    context: Option<PathBuf>,

    /// Override the configured update mode for this run
    #[arg(short = 'u', long, value_name = "MODE")]
    update_mode: Option<UpdateMode>,
}

#[derive(ClapArgs, Debug)]
struct NewCmd {
    /// Description of the application to create
    #[arg(value_name = "DESCRIPTION")]
    message: Option<String>,

    /// File with extra conversation context to prepend
    #[arg(short = 'c', long, value_name = "FILE")]
    context: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct InfoCmd {}

#[derive(ClapArgs, Debug)]
struct HistoryCmd {
    /// Artifact name, fuzzy-matched against the project's files
    #[arg(value_name = "ARTIFACT")]
    artifact: String,
}

#[derive(ClapArgs, Debug)]
struct ShowCmd {
    /// Artifact name, fuzzy-matched against the project's files
    #[arg(value_name = "ARTIFACT")]
    artifact: String,

    /// Stored revision to print instead of the live file
    #[arg(short = 'r', long)]
    revision: Option<u64>,
}

fn read_all_stdin() -> Result<String, std::io::Error> {
    use std::io::{self, Read};
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn resolve_message(cmd: &RunCmd) -> Result<String, Box<dyn std::error::Error>> {
    match cmd.message.as_deref() {
        Some("-") => {
            let msg = read_all_stdin()?;
            if msg.trim().is_empty() {
                return Err("stdin is empty; provide MESSAGE or pipe content".into());
            }
            Ok(msg)
        }
        Some(positional) => Ok(positional.to_owned()),
        None => {
            if !std::io::stdin().is_terminal() {
                let msg = read_all_stdin()?;
                if msg.trim().is_empty() {
                    return Err("stdin is empty; provide MESSAGE or pipe content".into());
                }
                Ok(msg)
            } else {
                Err("no MESSAGE provided; pass a message, use '-', or pipe stdin".into())
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    display::set_verbosity(if cli.global.quiet {
        display::Verbosity::Quiet
    } else if cli.global.debug {
        display::Verbosity::Debug
    } else {
        display::Verbosity::Normal
    });

    let cwd = std::env::current_dir()?;
    let session_path = cli
        .global
        .session
        .clone()
        .unwrap_or_else(|| cwd.join(".atelier").join("session.json"));

    let cfg = config::load_config(&cwd)?;

    match cli.command {
        Commands::Run(cmd) => {
            let message = resolve_message(&cmd)?;
            run(cfg, &session_path, &message, cmd.context.as_deref(), cmd.update_mode)
        }
        Commands::New(cmd) => {
            let message = cmd
                .message
                .clone()
                .ok_or("no DESCRIPTION provided for the new application")?;
            new_project(cfg, &session_path, &message, cmd.context.as_deref())
        }
        Commands::Info(_) => info(&session_path),
        Commands::History(cmd) => history(&session_path, &cmd.artifact),
        Commands::Show(cmd) => show(&session_path, &cmd.artifact, cmd.revision),
    }
}

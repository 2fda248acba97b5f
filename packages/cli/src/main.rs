mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, compile, decompose, init, tree, CheckArgs, CompileArgs, DecomposeArgs, InitArgs, TreeArgs,
};
use tracing_subscriber::EnvFilter;

/// Sitegen CLI - component trees in, websites out
#[derive(Parser, Debug)]
#[command(name = "sitegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a starter project
    Init(InitArgs),

    /// Render a project into index.html plus asset files
    Compile(CompileArgs),

    /// Turn an HTML document into a new project
    Decompose(DecomposeArgs),

    /// Validate a project's tree
    Check(CheckArgs),

    /// Print a project's node outline
    Tree(TreeArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Compile(args) => compile(args, &cwd),
        Command::Decompose(args) => decompose(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Tree(args) => tree(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

use super::load_tree;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Project to check
    pub project: String,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let tree = load_tree(&config, cwd, &args.project)?;
    let violations = tree.validate();

    println!("🔍 {} {}", "Checking".green().bold(), args.project);
    println!("   Nodes: {}", tree.count());
    println!();

    if violations.is_empty() {
        println!("✨ {} No problems found", "Done".green().bold());
        return Ok(());
    }

    for violation in &violations {
        println!("   {} {}", "✗".red(), violation);
    }
    println!();
    Err(anyhow!("{} problem(s) in '{}'", violations.len(), args.project))
}

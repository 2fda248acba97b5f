use super::load_tree;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitegen_common::{DirectoryStore, ProjectStore};
use sitegen_compiler_html::{build_bundle, INDEX_FILE};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Project to compile
    pub project: String,

    /// Output index.html to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let tree = load_tree(&config, cwd, &args.project)?;
    let bundle = build_bundle(&tree, &config.compile_options())?;

    if args.stdout {
        println!("{}", bundle.get(INDEX_FILE).unwrap_or_default());
        return Ok(());
    }

    println!(
        "{}",
        format!("🔨 Compiling {}...", args.project).bright_blue().bold()
    );

    let out_root = match &args.out_dir {
        Some(dir) => PathBuf::from(cwd).join(dir),
        None => config.out_path(cwd),
    };
    let store = DirectoryStore::new(&out_root);

    for file in &bundle.files {
        store.save_text(&args.project, &file.path, &file.content)?;
        println!("  {} {}", "✓".green(), file.path);
    }

    println!();
    println!(
        "{} Wrote {} files to {}",
        "✅".green(),
        bundle.files.len(),
        out_root.join(&args.project).display()
    );

    Ok(())
}

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use sitegen_common::{DirectoryStore, OfflineGenerator, ProjectStore};
use sitegen_compiler_html::PROJECT_FILE;
use sitegen_editor::EditorService;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DecomposeArgs {
    /// HTML document to import
    pub input: PathBuf,

    /// Project name (defaults to the file stem)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Replace an existing project
    #[arg(short, long)]
    pub force: bool,
}

pub fn decompose(args: DecomposeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let project = match &args.project {
        Some(name) => name.clone(),
        None => args
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("cannot derive a project name from {}", args.input.display()))?,
    };

    let store = DirectoryStore::new(config.projects_path(cwd));
    if store.read_text(&project, PROJECT_FILE).is_ok() && !args.force {
        return Err(anyhow!(
            "project '{}' already exists (use --force to replace it)",
            project
        ));
    }

    println!(
        "{}",
        format!("🧩 Decomposing {}...", args.input.display()).bright_blue().bold()
    );

    // No generation backend: the deterministic parser does the work
    let service = EditorService::new(OfflineGenerator, store, config.editor_config(&project))?
        .with_decompose_options(config.decompose_options());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(service.import_html(&html))?;

    let tree = runtime.block_on(service.tree());
    println!("  {} {} nodes ({:?})", "✓".green(), tree.count(), outcome.strategy);
    for path in &outcome.result.changed {
        println!("  {} {}/{}", "✓".green(), project, path);
    }

    let violations = tree.validate();
    if !violations.is_empty() {
        println!();
        for violation in &violations {
            println!("  {} {}", "⚠️".yellow(), violation);
        }
    }

    println!();
    println!("{} Project '{}' created", "✅".green(), project);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_tree::{NodeKind, SiteTree};

    #[test]
    fn test_decompose_creates_project() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let input = dir.path().join("landing.html");
        fs::write(
            &input,
            r#"<html><head><title>Shop</title><style>h1{color:red}</style></head>
<body><h1 id="title">Sale</h1><script>function buy() { return 1; }</script></body></html>"#,
        )
        .unwrap();

        let args = || DecomposeArgs {
            input: input.clone(),
            project: None,
            force: false,
        };
        decompose(args(), &cwd).unwrap();

        let project = dir.path().join("projects/landing");
        let tree =
            SiteTree::deserialize(&fs::read_to_string(project.join("project.json")).unwrap()).unwrap();
        assert_eq!(tree.find("buy").unwrap().kind, NodeKind::JsFunction);
        assert!(project.join("index.html").is_file());

        // Refuses to clobber without --force
        assert!(decompose(args(), &cwd).is_err());
    }
}

use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitegen_common::{DirectoryStore, ProjectStore};
use sitegen_compiler_html::PROJECT_FILE;
use sitegen_tree::{Node, NodeKind, SiteTree, HEAD_ID, ROOT_ID};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name of the starter project
    #[arg(default_value = "my-site")]
    pub name: String,

    /// Projects directory
    #[arg(short, long, default_value = "projects")]
    pub projects_dir: String,

    /// Force overwrite existing config and project
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Sitegen workspace...".bright_blue().bold());

    let config = Config {
        projects_dir: args.projects_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let store = DirectoryStore::new(config.projects_path(cwd));
    if store.read_text(&args.name, PROJECT_FILE).is_ok() && !args.force {
        println!(
            "  {} {}/{} already exists, leaving it alone",
            "⚠️".yellow(),
            args.name,
            PROJECT_FILE
        );
    } else {
        let tree = starter_tree(&config.title)?;
        store.save_text(&args.name, PROJECT_FILE, &tree.serialize_pretty()?)?;
        println!(
            "  {} Created {}/{}/{}",
            "✓".green(),
            args.projects_dir,
            args.name,
            PROJECT_FILE
        );
    }

    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/{}/{}", args.projects_dir, args.name, PROJECT_FILE);
    println!("  2. Run: sitegen compile {}", args.name);
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

/// A one-section page with a head, a stylesheet and a click handler
pub fn starter_tree(title: &str) -> Result<SiteTree> {
    let root = Node::container(ROOT_ID)
        .with_description("Starter page")
        .with_child(
            Node::new(HEAD_ID, NodeKind::Head)
                .with_code(format!("<meta charset=\"UTF-8\">\n<title>{}</title>", title)),
        )
        .with_child(
            Node::html(
                "hero",
                r#"<section id="hero"><h1>Hello</h1><button id="hero-cta" onclick="greet()">Say hi</button></section>"#,
            )
            .with_description("Landing banner with a greeting button"),
        )
        .with_child(
            Node::css(
                "base-styles",
                "body { font-family: sans-serif; margin: 0; }\n#hero { padding: 4rem 2rem; text-align: center; }",
            )
            .with_description("Page typography and hero spacing"),
        )
        .with_child(
            Node::new("greet", NodeKind::JsFunction)
                .with_code("function greet() {\n  alert('Hi!');\n}")
                .with_description("Shows a greeting"),
        );

    let mut tree = SiteTree::new(root)?;
    tree.resolve_all();
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_tree_is_valid() {
        let tree = starter_tree("Demo").unwrap();
        assert!(tree.validate().is_empty());
        assert!(tree.head().unwrap().code.contains("<title>Demo</title>"));
    }

    #[test]
    fn test_init_writes_config_and_project() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(
            InitArgs {
                name: "demo".into(),
                projects_dir: "sites".into(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.projects_dir, "sites");
        assert!(dir.path().join("sites/demo/project.json").is_file());
    }
}

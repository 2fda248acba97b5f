use super::load_tree;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitegen_tree::{Node, SiteTree};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Project to print
    pub project: String,

    /// Include node descriptions
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let tree = load_tree(&config, cwd, &args.project)?;

    for line in outline(&tree, args.verbose) {
        println!("{}", line);
    }
    Ok(())
}

fn outline(tree: &SiteTree, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    tree.root().walk_with_depth(0, &mut |node, depth| {
        lines.push(format_line(node, depth, verbose));
    });
    lines
}

fn format_line(node: &Node, depth: usize, verbose: bool) -> String {
    let mut line = format!(
        "{}{} {}",
        "  ".repeat(depth),
        node.id.bold(),
        format!("({})", node.kind).dimmed()
    );
    if let (Some(selector), Some(position)) = (&node.selector, node.position) {
        line.push_str(&format!(" → {} {}", selector, position).cyan().to_string());
    }
    if verbose && !node.description.is_empty() {
        line.push_str(&format!(" - {}", node.description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_tree::ROOT_ID;

    #[test]
    fn test_outline_indents_by_depth() {
        colored::control::set_override(false);
        let mut tree = SiteTree::new(
            Node::container(ROOT_ID).with_child(
                Node::html("hero", r#"<section id="hero"></section>"#)
                    .with_description("Banner")
                    .with_child(Node::html("title", r#"<h1 id="title"></h1>"#)),
            ),
        )
        .unwrap();
        tree.resolve_all();

        let lines = outline(&tree, true);
        assert_eq!(lines[0], "whole-page (container)");
        assert_eq!(lines[1], "  hero (html) → #whole-page beforeend - Banner");
        assert_eq!(lines[2], "    title (html) → #hero beforeend");
    }
}

pub mod check;
pub mod compile;
pub mod decompose;
pub mod init;
pub mod tree;

pub use check::{check, CheckArgs};
pub use compile::{compile, CompileArgs};
pub use decompose::{decompose, DecomposeArgs};
pub use init::{init, InitArgs};
pub use tree::{tree, TreeArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use sitegen_common::{DirectoryStore, ProjectStore};
use sitegen_compiler_html::PROJECT_FILE;
use sitegen_tree::SiteTree;

/// Read `<projectsDir>/<project>/project.json`
fn load_tree(config: &Config, cwd: &str, project: &str) -> Result<SiteTree> {
    let store = DirectoryStore::new(config.projects_path(cwd));
    tracing::debug!(project, root = %store.root().display(), "loading project tree");
    let text = store
        .read_text(project, PROJECT_FILE)
        .with_context(|| format!("cannot open project '{}'", project))?;
    Ok(SiteTree::deserialize(&text)?)
}

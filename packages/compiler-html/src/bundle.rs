use crate::compiler::{compile_to_html, CompileError, CompileOptions};
use sitegen_common::{walk_children, Visitor};
use sitegen_tree::{IdAllocator, Node, SiteTree};

pub const INDEX_FILE: &str = "index.html";
pub const PROJECT_FILE: &str = "project.json";

/// One output file of a rendered project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: String,
    pub content: String,
}

/// The multi-file rendering of a tree
///
/// `index.html` holds the composite document, every css node gets
/// `css/<id>.css`, every script node gets `js/<id>.js`, and `project.json`
/// holds the tree itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub files: Vec<BundleFile>,
}

impl Bundle {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

#[derive(Default)]
struct AssetCollector {
    names: IdAllocator,
    files: Vec<BundleFile>,
}

impl AssetCollector {
    fn push(&mut self, dir: &str, ext: &str, node: &Node) {
        let name = self.names.allocate(&node.id);
        self.files.push(BundleFile {
            path: format!("{}/{}.{}", dir, name, ext),
            content: node.code.clone(),
        });
    }
}

impl Visitor for AssetCollector {
    fn visit_css(&mut self, css: &Node) {
        self.push("css", "css", css);
        walk_children(self, css);
    }

    fn visit_javascript(&mut self, script: &Node) {
        self.push("js", "js", script);
        walk_children(self, script);
    }

    fn visit_js_function(&mut self, function: &Node) {
        self.push("js", "js", function);
        walk_children(self, function);
    }
}

/// Render every output file of a tree
pub fn build_bundle(tree: &SiteTree, options: &CompileOptions) -> Result<Bundle, CompileError> {
    let mut files = vec![BundleFile {
        path: INDEX_FILE.to_string(),
        content: compile_to_html(tree, options),
    }];

    let mut assets = AssetCollector::default();
    assets.visit_tree(tree);
    files.extend(assets.files);

    files.push(BundleFile {
        path: PROJECT_FILE.to_string(),
        content: tree.serialize_pretty()?,
    });

    Ok(Bundle { files })
}

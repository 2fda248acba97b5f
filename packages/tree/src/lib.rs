//! # Sitegen Tree
//!
//! The component tree: typed nodes, lookups, canonical serialization and the
//! insertion-chain resolver that keeps sibling `html` nodes anchored.
//!
//! ```text
//! whole-page (container)
//!  ├── head-content (head)
//!  ├── hero (html)        selector=#whole-page  position=beforeend
//!  ├── features (html)    selector=#hero        position=afterend
//!  ├── base-styles (css)
//!  └── toggleMenu (js-function)
//! ```

pub mod error;
pub mod id_generator;
pub mod node;
pub mod resolver;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use id_generator::{slugify, IdAllocator};
pub use node::{Node, NodeKind, Position};
pub use resolver::{
    expected_anchors, extract_id_attribute, resolve_all, resolve_children, resolve_siblings, Anchor,
};
pub use tree::{NodeWithParent, SiteTree, Violation, HEAD_ID, PREVIEW_MOUNT_ID, ROOT_ID};

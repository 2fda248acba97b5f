//! # Sitegen HTML Compiler
//!
//! Serializes a component tree into one composite document:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//! <head> {head node or default meta/title} <style> {all css} </style> </head>
//! <body> {html nodes in authoring order} <script> (function() { {all js} })(); </script> </body>
//! </html>
//! ```
//!
//! Output is a pure function of the tree. The same tree always yields
//! byte-identical output.

mod bundle;
mod compiler;
mod wrapper;


pub use bundle::{build_bundle, Bundle, BundleFile, INDEX_FILE, PROJECT_FILE};
pub use compiler::{compile_to_html, render_body, CompileError, CompileOptions};
pub use wrapper::wrap_markup;

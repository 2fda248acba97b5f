pub mod error;
pub mod generation;
pub mod result;
pub mod store;
pub mod visitor;

pub use error::*;
pub use generation::*;
pub use result::*;
pub use store::*;
pub use visitor::*;

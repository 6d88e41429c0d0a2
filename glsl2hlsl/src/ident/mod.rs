//! Identifier information and scoped lookup

mod info;
pub use info::*;

mod table;
pub use table::*;

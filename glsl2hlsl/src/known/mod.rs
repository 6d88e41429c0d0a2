//! Registry of built-in symbols, functions and variables
//!
//! The tables are registered into the symbol and identifier tables when a compilation context
//! is created, so built-ins resolve through the same scoped lookup as user declarations.

mod symbols;
pub use symbols::*;

mod functions;
pub use functions::*;

mod variables;
pub use variables::*;

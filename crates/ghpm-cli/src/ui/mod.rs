//! Console output.

pub mod output;
pub mod table;

pub use output::Output;

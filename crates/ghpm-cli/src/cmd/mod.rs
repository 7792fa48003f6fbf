//! Command handlers, one module per subcommand.

pub mod info;
pub mod install;
pub mod list;
pub mod search;
pub mod uninstall;

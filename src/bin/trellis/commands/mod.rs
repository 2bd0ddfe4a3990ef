//! Command implementations

pub mod add;
pub mod completions;
pub mod init;
pub mod populate;
pub mod remove;
pub mod tree;
pub mod update;
pub mod validate;

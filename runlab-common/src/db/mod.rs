//! Database bootstrap for the composition store

pub mod init;

pub use init::*;

//! Database access layer for runlab-cs
//!
//! Schema creation lives in `runlab_common::db`; this module holds the
//! record store operations over it.

pub mod runs;

pub use runlab_common::db::init_database;

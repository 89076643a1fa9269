//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration once and routes CLI subcommands to their implementations.
//! Exit codes follow the error category: 0 ok, 1 fatal, 3 forbidden,
//! 4 timeout.

pub mod cache;
pub mod dispatcher;
pub mod key;
pub mod name;
pub mod phase;
pub mod picture;
pub mod prefetch;
pub mod resolve;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

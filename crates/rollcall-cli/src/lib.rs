//! Command line front end for rollcall
//!
//! A thin shell over [`rollcall_client::ViewingSession`]: each invocation
//! signs in if asked to, runs one [`Command`], and writes plain text. All
//! synchronization logic lives in the client and core crates.
//!
//! The backing service keeps the viewer's identity in a cookie that lives only
//! as long as the process, so credentials are passed on every invocation
//! ([`Credentials`]).
//!
//! # Components
//!
//! - [`command`]: subcommands and their execution
//! - [`render`]: text output for events, details and sessions
//! - [`simulation`]: seeded in-process service for trying the CLI offline

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod render;
pub mod simulation;

mod error;

pub use command::{Command, CreateArgs, Credentials, run};
pub use error::CliError;

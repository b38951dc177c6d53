//! Interactive terminal front end for the session core.

pub mod error;
pub mod formatter;
pub mod runner;

pub use error::CliError;
pub use runner::{run_chat, run_rooms};

//! feelflow: navigate an emotion taxonomy, rate the feeling, keep a history.
//!
//! Layers, innermost first:
//! - `domain`: taxonomy, navigation state machine, session records
//! - `application`: services over I/O traits (session, finalizer, history)
//! - `infrastructure`: trait implementations and the service container
//! - `cli`: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

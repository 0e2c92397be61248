//! # cadscope
//!
//! Command-line front end for the cadscope inspection engine. The binary in
//! `main.rs` only sets up logging and dispatches to [`cli::execute`].

pub mod cli;

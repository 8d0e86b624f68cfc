//! Test doubles for the interactive layer
//!
//! - [`MockExecutor`]: records every command and answers from canned responses
//! - [`ScriptedConsole`]: feeds pre-recorded input lines and captures output

pub mod mocks;

pub use mocks::{MockExecutor, MockResponse, ScriptedConsole};

//! Command-line surface of the `nexus-tool` binary

mod app;


pub use app::Cli;

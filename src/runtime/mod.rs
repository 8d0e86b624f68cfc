//! Host-facing runtime: subprocess execution and environment discovery

pub mod discovery;
pub mod process;

pub use discovery::{find_executable, is_elevated, user_home, ToolPaths};
pub use process::{
    foreground_child_running, interrupt_action, shell_quote, CapturedOutput, CommandSpec,
    Executor, InterruptAction, ProcessExecutor, INTERRUPTED_EXIT_CODE,
};

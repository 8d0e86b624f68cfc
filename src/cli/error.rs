use thiserror::Error;

/// Error type for the interactive front ends
#[derive(Error, Debug)]
pub enum InteractiveError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input closed")]
    InputClosed,

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Core(#[from] crate::core::Error),
}

impl InteractiveError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a terminal error
    pub fn terminal<S: Into<String>>(msg: S) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Exit code the binary should use when this error ends the program
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputClosed => 0,
            _ => 1,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(_) => {
                "This tool must be run with sudo. Try again with: sudo nexus-tool".to_string()
            }
            Self::ExecutableNotFound(name) if name == crate::core::NEXUS_CLI_NAME => format!(
                "'{}' was not found. Run 'Check dependency status' (1) and 'Update Nexus CLI' (2).",
                name
            ),
            Self::ExecutableNotFound(name) => format!(
                "'{}' was not found. Install it with 'sudo apt install {}'.",
                name, name
            ),
            Self::InputClosed => "Input closed, leaving the tool.".to_string(),
            Self::Terminal(msg) => format!(
                "Terminal error: {}. Run again without --panel to use the plain menu.",
                msg
            ),
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the interactive CLI
pub type Result<T> = std::result::Result<T, InteractiveError>;

/// Trait for converting errors to user-friendly messages
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
}

impl UserFriendlyError for InteractiveError {
    fn user_message(&self) -> String {
        self.user_message()
    }
}

use super::error::*;
use std::io;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        (
            InteractiveError::PermissionDenied("euid 1000".to_string()),
            "Permission denied: euid 1000",
        ),
        (
            InteractiveError::ExecutableNotFound("screen".to_string()),
            "Executable not found: screen",
        ),
        (
            InteractiveError::invalid_input("Bad choice"),
            "Invalid input: Bad choice",
        ),
        (InteractiveError::InputClosed, "Input closed"),
        (
            InteractiveError::terminal("raw mode unavailable"),
            "Terminal error: raw mode unavailable",
        ),
        (
            InteractiveError::configuration("Config error"),
            "Configuration error: Config error",
        ),
    ];

    for (error, expected_message) in errors {
        assert_eq!(error.to_string(), expected_message);
    }
}

#[test]
fn test_user_friendly_error_messages() {
    let message = InteractiveError::PermissionDenied("not root".to_string()).user_message();
    assert!(message.contains("sudo nexus-tool"));

    let message = InteractiveError::ExecutableNotFound("nexus-network".to_string()).user_message();
    assert!(message.contains("Update Nexus CLI"));

    let message = InteractiveError::ExecutableNotFound("screen".to_string()).user_message();
    assert!(message.contains("sudo apt install screen"));

    let message = InteractiveError::terminal("no tty").user_message();
    assert!(message.contains("no tty"));
    assert!(message.contains("--panel"));

    // Generic error should fall back to Display
    let message = InteractiveError::configuration("Invalid config").user_message();
    assert_eq!(message, "Configuration error: Invalid config");
}

#[test]
fn test_exit_codes() {
    assert_eq!(InteractiveError::InputClosed.exit_code(), 0);
    assert_eq!(
        InteractiveError::PermissionDenied("x".to_string()).exit_code(),
        1
    );
    assert_eq!(
        InteractiveError::Io(io::Error::new(io::ErrorKind::Other, "x")).exit_code(),
        1
    );
}

#[test]
fn test_error_type_conversions() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let interactive_error: InteractiveError = io_error.into();
    assert!(matches!(interactive_error, InteractiveError::Io(_)));

    let core_error = crate::core::Error::ExecutableNotFound("screen".to_string());
    let interactive_error: InteractiveError = core_error.into();
    match interactive_error {
        InteractiveError::Core(ref inner) => assert!(inner.is_missing_program()),
        _ => panic!("Expected Core error"),
    }
    assert_eq!(interactive_error.to_string(), "Executable not found: screen");
}

#[test]
fn test_user_friendly_error_trait() {
    let error = InteractiveError::ExecutableNotFound("screen".to_string());
    let user_friendly: &dyn UserFriendlyError = &error;
    assert_eq!(user_friendly.user_message(), error.user_message());
}

use std::path::PathBuf;

use serde_json::Value;
use taskheap::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    for err in [
        Error::InvalidName("name cannot be empty".to_string()),
        Error::InvalidPriority("1.5".to_string()),
        Error::InvalidDate("not-a-date".to_string()),
        Error::DuplicateTask("a".to_string()),
        Error::InvalidConfig("bad".to_string()),
    ] {
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
    }
}

#[test]
fn exit_code_no_result() {
    assert_eq!(Error::EmptyStore.exit_code(), exit_codes::NO_RESULT);
    assert_eq!(Error::NoReadyTask.exit_code(), exit_codes::NO_RESULT);
    assert_eq!(
        Error::TaskNotFound("x".to_string()).exit_code(),
        exit_codes::NO_RESULT
    );
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);

    let err = Error::persistence("add_task", Error::LockFailed(PathBuf::from("tasks.json.lock")));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn persistence_error_keeps_source() {
    let err = Error::persistence("complete_task", Error::OperationFailed("disk full".to_string()));
    let message = err.to_string();
    assert!(message.contains("complete_task"));
    assert!(message.contains("disk full"));

    let source = std::error::Error::source(&err).expect("source");
    assert!(source.to_string().contains("disk full"));
}

#[test]
fn json_error_includes_details() {
    let err = Error::persistence("add_task", Error::OperationFailed("boom".to_string()));
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::OPERATION_FAILED);
    let details = json.details.expect("details");
    assert_eq!(details["operation"], Value::String("add_task".to_string()));
    assert_eq!(details["in_memory_ahead"], Value::Bool(true));

    let json = JsonError::from(&Error::TaskNotFound("ghost".to_string()));
    assert_eq!(json.details.expect("details")["task"], "ghost");
}

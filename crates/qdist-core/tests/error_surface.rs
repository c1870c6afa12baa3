use qdist_core::errors::{ErrorInfo, QdistError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("line", "3")
        .with_context("reason", "example")
}

#[test]
fn dem_error_surface() {
    let err = QdistError::Dem(sample_info("invalid-syntax", "missing closing parenthesis"));
    assert_eq!(err.code(), "invalid-syntax");
    assert!(err.info().context.contains_key("line"));
}

#[test]
fn unsupported_error_surface() {
    let err = QdistError::Unsupported(sample_info("shift-detectors-unsupported", "shifted"));
    assert_eq!(err.info().code, "shift-detectors-unsupported");
    assert!(err
        .to_string()
        .starts_with("unsupported detector error model: [shift-detectors-unsupported]"));
}

#[test]
fn solver_error_surface() {
    let err = QdistError::Solver(sample_info("engine-unavailable", "not compiled in"));
    assert_eq!(err.code(), "engine-unavailable");
}

#[test]
fn config_error_surface() {
    let err = QdistError::Config(sample_info("invalid-time-limit", "negative"));
    assert_eq!(err.code(), "invalid-time-limit");
}

#[test]
fn serde_error_surface() {
    let err = QdistError::Serde(sample_info("json-deserialize", "schema mismatch"));
    assert_eq!(err.code(), "json-deserialize");
}

#[test]
fn display_includes_context_and_hint() {
    let err = QdistError::Dem(
        ErrorInfo::new("invalid-syntax", "bad target")
            .with_line(7)
            .with_context("target", "X3")
            .with_hint("targets look like D3 or L0"),
    );
    assert_eq!(
        err.to_string(),
        "invalid detector error model: [invalid-syntax] bad target \
         {line=7, target=X3}; hint: targets look like D3 or L0"
    );
    assert_eq!(err.info().line(), Some(7));
    assert_eq!(ErrorInfo::new("x", "y").line(), None);
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = QdistError::Unsupported(ErrorInfo::new("shift-detectors-unsupported", "x"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Unsupported");
    assert_eq!(json["detail"]["code"], "shift-detectors-unsupported");
    let restored: QdistError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}

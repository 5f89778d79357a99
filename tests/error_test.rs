use std::io;

use archetyper::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::MissingPropertyError { key: "groupId".to_string() };
    assert_eq!(err.to_string(), "Missing required property 'groupId'.");

    let err = Error::UnsupportedEncodingError("klingon".to_string());
    assert_eq!(err.to_string(), "Unsupported encoding: 'klingon'.");
}

#[test]
fn test_entry_error_names_file_and_fileset() {
    let err = Error::EntryError {
        path: "src/main/java/App.java".to_string(),
        fileset: "sources".to_string(),
        source: Box::new(Error::MalformedContentError { encoding: "UTF-8".to_string() }),
    };
    let message = err.to_string();
    assert!(message.contains("src/main/java/App.java"));
    assert!(message.contains("sources"));
    assert!(message.contains("UTF-8"));
}

#[test]
fn test_overwrite_conflicts_are_distinguished() {
    let conflict = Error::OverwriteConflictError {
        output_dir: "out".to_string(),
        existing: vec!["pom.xml".to_string()],
    };
    assert!(conflict.is_overwrite_conflict());
    assert!(Error::OutputDirectoryExistsError { output_dir: "out".to_string() }
        .is_overwrite_conflict());
    assert!(!Error::IoError(io::Error::other("disk full")).is_overwrite_conflict());
}

#![allow(missing_docs)]
use otp_keygen_core::handler::NOT_FOUND_MESSAGE;
use otp_keygen_core::key_file::{self, CollisionPolicy};
use otp_keygen_core::{KeyRequestHandler, Outcome, Reply, Status};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn request_for(path: &Path) -> String {
    path.to_str().expect("Temp path is not UTF-8").to_owned()
}

#[test]
fn test_ten_character_message_yields_ten_character_key() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("msg.txt");
    fs::write(&input_path, "0123456789").expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    let outcome = handler.handle(&request_for(&input_path));
    assert_eq!(outcome, Outcome::Generated("key_msg.txt".to_owned()));

    let key = fs::read_to_string(temp_dir.path().join("key_msg.txt")).expect("Failed to read key");
    assert_eq!(key.chars().count(), 10);

    let reply = Reply::from(outcome);
    assert_eq!(reply, Reply::new(Status::Success, "key_msg.txt"));
}

#[test]
fn test_missing_input_reports_not_found_and_writes_nothing() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let handler = KeyRequestHandler::new(temp_dir.path());

    let outcome = handler.handle(&request_for(&temp_dir.path().join("missing.txt")));
    assert_eq!(outcome, Outcome::NotFound);
    assert!(!temp_dir.path().join("key_missing.txt").exists());

    let reply = Reply::from(outcome);
    assert_eq!(reply.status, Status::Error);
    assert_eq!(reply.payload, "Input file not found");
    assert_eq!(reply.payload, NOT_FOUND_MESSAGE);
}

#[test]
fn test_multibyte_input_is_counted_in_characters() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("unicode.txt");
    let content = "héllo wörld ✓";
    fs::write(&input_path, content).expect("Failed to write input file");
    assert_ne!(content.len(), content.chars().count());

    let handler = KeyRequestHandler::new(temp_dir.path());
    let outcome = handler.handle(&request_for(&input_path));
    assert_eq!(outcome, Outcome::Generated("key_unicode.txt".to_owned()));

    let key = fs::read_to_string(temp_dir.path().join("key_unicode.txt"))
        .expect("Failed to read key");
    assert_eq!(key.chars().count(), content.chars().count());
    assert_eq!(key.len(), content.chars().count());
}

#[test]
fn test_line_breaks_are_counted_as_text() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("lines.txt");
    fs::write(&input_path, "a\r\nb\r\n").expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    handler.handle(&request_for(&input_path));

    let key = fs::read_to_string(temp_dir.path().join("key_lines.txt"))
        .expect("Failed to read key");
    assert_eq!(key.len(), 4, "\\r\\n must count as a single character");

    // Old Mac line endings: a lone \r is one character as well.
    fs::write(&input_path, "a\rb\r\nc\n").expect("Failed to write input file");
    handler.handle(&request_for(&input_path));
    let key = fs::read_to_string(temp_dir.path().join("key_lines.txt"))
        .expect("Failed to read key");
    assert_eq!(key.len(), 6);
}

#[test]
fn test_empty_input_yields_empty_key_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("empty.txt");
    fs::write(&input_path, "").expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    let outcome = handler.handle(&request_for(&input_path));
    assert_eq!(outcome, Outcome::Generated("key_empty.txt".to_owned()));

    let key = fs::read(temp_dir.path().join("key_empty.txt")).expect("Failed to read key");
    assert!(key.is_empty());
}

#[test]
fn test_invalid_utf8_input_is_a_failure() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("binary.dat");
    fs::write(&input_path, [0xff, 0xfe, 0x00, 0x80]).expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    match handler.handle(&request_for(&input_path)) {
        Outcome::Failure(detail) => assert!(detail.starts_with("Error generating key: ")),
        other => panic!("Expected a failure, got {other:?}"),
    }
    assert!(!temp_dir.path().join("key_binary.txt").exists());
}

#[test]
fn test_directory_input_is_a_failure() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let handler = KeyRequestHandler::new(temp_dir.path());
    assert!(matches!(
        handler.handle(&request_for(temp_dir.path())),
        Outcome::Failure(_)
    ));
}

#[test]
fn test_same_stem_overwrites_previous_key() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let text_input = temp_dir.path().join("a.txt");
    let binary_input = temp_dir.path().join("a.bin");
    fs::write(&text_input, "x".repeat(20)).expect("Failed to write input file");
    fs::write(&binary_input, "y".repeat(7)).expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    assert_eq!(
        handler.handle(&request_for(&text_input)),
        Outcome::Generated("key_a.txt".to_owned())
    );
    let first_key = fs::read_to_string(temp_dir.path().join("key_a.txt"))
        .expect("Failed to read key");
    assert_eq!(first_key.len(), 20);

    assert_eq!(
        handler.handle(&request_for(&binary_input)),
        Outcome::Generated("key_a.txt".to_owned())
    );
    let second_key = fs::read_to_string(temp_dir.path().join("key_a.txt"))
        .expect("Failed to read key");
    assert_eq!(second_key.len(), 7, "second request must overwrite the first key");
}

#[test]
fn test_fail_policy_keeps_existing_key() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let text_input = temp_dir.path().join("a.txt");
    let binary_input = temp_dir.path().join("a.bin");
    fs::write(&text_input, "x".repeat(20)).expect("Failed to write input file");
    fs::write(&binary_input, "y".repeat(7)).expect("Failed to write input file");

    let handler =
        KeyRequestHandler::new(temp_dir.path()).with_collision_policy(CollisionPolicy::Fail);
    assert_eq!(handler.collision_policy(), CollisionPolicy::Fail);
    assert_eq!(
        handler.handle(&request_for(&text_input)),
        Outcome::Generated("key_a.txt".to_owned())
    );
    let first_key = fs::read_to_string(temp_dir.path().join("key_a.txt"))
        .expect("Failed to read key");

    assert_eq!(
        handler.handle(&request_for(&binary_input)),
        Outcome::Failure("Error generating key: key file key_a.txt already exists".to_owned())
    );
    let kept_key = fs::read_to_string(temp_dir.path().join("key_a.txt"))
        .expect("Failed to read key");
    assert_eq!(first_key, kept_key);
}

#[test]
fn test_no_temporary_files_are_left_behind() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("msg.txt");
    fs::write(&input_path, "hello").expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path());
    handler.handle(&request_for(&input_path));
    handler.handle(&request_for(&input_path));

    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .expect("Failed to list temp dir")
        .map(|entry| entry.expect("Bad dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["key_msg.txt", "msg.txt"]);
}

#[test]
fn test_missing_key_directory_is_a_failure() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("msg.txt");
    fs::write(&input_path, "hello").expect("Failed to write input file");

    let handler = KeyRequestHandler::new(temp_dir.path().join("does-not-exist"));
    assert!(matches!(
        handler.handle(&request_for(&input_path)),
        Outcome::Failure(_)
    ));
}

#[test]
fn test_key_file_name_derivation() {
    assert_eq!(key_file::key_file_name("msg.txt"), "key_msg.txt");
    assert_eq!(key_file::key_file_name("/tmp/in/report.pdf"), "key_report.txt");
    assert_eq!(key_file::key_file_name("archive.tar.gz"), "key_archive.tar.txt");
    assert_eq!(key_file::key_file_name("noext"), "key_noext.txt");
    assert_eq!(key_file::key_file_name(".hidden"), "key_.hidden.txt");
    assert_eq!(key_file::key_file_name("..hidden"), "key_..hidden.txt");
    assert_eq!(key_file::key_file_name("dir/..a.b"), "key_..a.txt");
    assert_eq!(key_file::key_file_name("trailing."), "key_trailing.txt");
    assert_eq!(key_file::key_file_name("dir.d/plain"), "key_plain.txt");
    assert_eq!(key_file::key_file_name(""), "key_.txt");
}

#[test]
fn test_collision_policy_config_names() {
    let policy: CollisionPolicy = serde_json::from_str("\"fail\"").expect("Failed to parse policy");
    assert_eq!(policy, CollisionPolicy::Fail);
    assert_eq!(
        serde_json::to_string(&CollisionPolicy::Overwrite).expect("Failed to serialize policy"),
        "\"overwrite\""
    );
    assert_eq!(CollisionPolicy::default(), CollisionPolicy::Overwrite);
}

#[test]
fn test_status_tags() {
    assert_eq!(Status::Success.as_str(), "success");
    assert_eq!("error".parse::<Status>(), Ok(Status::Error));
    assert!("ok".parse::<Status>().is_err());
}

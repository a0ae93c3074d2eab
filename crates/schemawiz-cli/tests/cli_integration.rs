//! Integration tests for the command-line interface.

use clap::Parser;
use pretty_assertions::assert_eq;
use schemawiz_cli::{render_error, run, Args, CliError};
use schemawiz_core::ErrorKind;
use std::io::Write;
use tempfile::NamedTempFile;

fn schema_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn args(file: &NamedTempFile, extra: &[&str]) -> Args {
    let path = file.path().to_str().unwrap().to_string();
    let mut argv = vec!["schemawiz".to_string(), path];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::try_parse_from(argv).unwrap()
}

const BLOG: &str = r#"{
    "models": {
        "Comment": { "body": "text", "post": "belongsTo" },
        "Post": { "title": "string", "author": "belongsTo:User" },
        "User": { "name": "string", "posts": "hasMany:Post" }
    }
}"#;

#[test]
fn test_order_output() {
    let file = schema_file(BLOG);
    let output = run(&args(&file, &["--format", "order"])).unwrap();
    assert_eq!(output, "User\nPost\nComment");
}

#[test]
fn test_json_output_with_namespace() {
    let file = schema_file(BLOG);
    let output = run(&args(
        &file,
        &["--format", "json", "--namespace", "Blog/Models", "--no-timestamps"],
    ))
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["entities"]["User"]["namespace"], "Blog\\Models");
    assert_eq!(value["entities"]["User"]["timestamps"], false);
    assert_eq!(
        value["entities"]["Post"]["relations"]["author"]["foreign_key"],
        "user_id"
    );
}

#[test]
fn test_table_output() {
    let file = schema_file(BLOG);
    let output = run(&args(&file, &[])).unwrap();
    assert!(output.contains("App\\Models\\Comment (comments)"));
    assert!(output.contains("post_id"));
    assert!(output.contains("User.posts"));
}

#[test]
fn test_resolution_error() {
    let file = schema_file(r#"{ "Post": { "author": "belongsTo:Writer" } }"#);
    let args = args(&file, &[]);
    let err = run(&args).unwrap_err();

    match &err {
        CliError::Resolve(e) => assert_eq!(e.kind, ErrorKind::UnknownTarget),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        render_error(&args, &err),
        "error[UnknownTargetError]: The [author] relation in [Post] points to a non-existent [Writer] model."
    );
}

#[test]
fn test_invalid_json() {
    let file = schema_file("{ not json");
    let err = run(&args(&file, &[])).unwrap_err();
    match err {
        CliError::Resolve(e) => assert_eq!(e.kind, ErrorKind::InvalidSchema),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let args = Args::try_parse_from(["schemawiz", path.to_str().unwrap()]).unwrap();
    let err = run(&args).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
    assert!(render_error(&args, &err).starts_with("error: cannot read"));
}

//! Integration tests for the built-in tool set as assembled by
//! `builtin_registry`.

use std::sync::Arc;

use serde_json::json;

use burrow_sandbox::SandboxGuard;
use burrow_tools::{builtin_registry, FileLimits, RegistryError, ToolRegistry};
use burrow_types::ToolErrorKind;

fn registry(dir: &tempfile::TempDir) -> ToolRegistry {
    let guard = Arc::new(SandboxGuard::new([dir.path()]).expect("guard"));
    builtin_registry(guard, FileLimits::default()).expect("registry")
}

#[test]
fn registers_all_builtins_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reg = registry(&dir);
    let names: Vec<&str> = reg.list().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "greeting",
            "read_file",
            "write_file",
            "create_directory",
            "list_directory"
        ]
    );
}

#[test]
fn registering_builtins_twice_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let guard = Arc::new(SandboxGuard::new([dir.path()]).expect("guard"));
    let mut reg = builtin_registry(Arc::clone(&guard), FileLimits::default()).expect("first");
    let err = burrow_tools::register_builtin_tools(&mut reg, guard, FileLimits::default())
        .expect_err("duplicate");
    assert_eq!(
        err,
        RegistryError::DuplicateName {
            name: "greeting".into()
        }
    );
}

#[test]
fn every_descriptor_has_object_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    for d in registry(&dir).list() {
        assert_eq!(d.input_schema["type"], "object", "{}", d.name);
        assert!(d.input_schema["required"].is_array(), "{}", d.name);
    }
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reg = registry(&dir);
    let path = dir.path().join("x.txt");
    let path = path.to_string_lossy();

    let write = reg.resolve("write_file").expect("write_file").handler();
    write
        .call(json!({"path": path, "content": "hello"}))
        .await
        .expect("write");

    let read = reg.resolve("read_file").expect("read_file").handler();
    let out = read.call(json!({"path": path})).await.expect("read");
    assert_eq!(out.text, "hello");
}

#[tokio::test]
async fn repeated_writes_are_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reg = registry(&dir);
    let target = dir.path().join("same.txt");
    let write = reg.resolve("write_file").expect("write_file").handler();
    let args = json!({"path": target.to_string_lossy(), "content": "same bytes"});

    write.call(args.clone()).await.expect("first");
    let first = std::fs::read(&target).expect("read first");
    write.call(args).await.expect("second");
    let second = std::fs::read(&target).expect("read second");
    assert_eq!(first, second);
}

#[tokio::test]
async fn create_then_list_shows_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reg = registry(&dir);
    let mkdir = reg.resolve("create_directory").expect("mkdir").handler();
    mkdir
        .call(json!({"path": dir.path().join("docs").to_string_lossy()}))
        .await
        .expect("mkdir");

    let list = reg.resolve("list_directory").expect("list").handler();
    let out = list
        .call(json!({"path": dir.path().to_string_lossy()}))
        .await
        .expect("list");
    assert_eq!(
        out.structured.expect("structured")["entries"],
        json!([{"name": "docs", "type": "directory"}])
    );
}

#[tokio::test]
async fn traversal_out_of_root_is_denied_for_every_fs_tool() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("root");
    std::fs::create_dir(&root).expect("root");
    std::fs::write(dir.path().join("secret.txt"), "secret").expect("secret");

    let guard = Arc::new(SandboxGuard::new([&root]).expect("guard"));
    let reg = builtin_registry(guard, FileLimits::default()).expect("registry");
    let escaped = root.join("../secret.txt");
    let escaped = escaped.to_string_lossy();

    for (tool, args) in [
        ("read_file", json!({"path": escaped})),
        ("write_file", json!({"path": escaped, "content": "x"})),
        ("list_directory", json!({"path": escaped})),
        ("create_directory", json!({"path": escaped})),
    ] {
        let err = reg
            .resolve(tool)
            .expect("tool")
            .handler()
            .call(args)
            .await
            .expect_err(tool);
        assert_eq!(err.kind, ToolErrorKind::AccessDenied, "{tool}");
    }
    assert_eq!(
        std::fs::read_to_string(dir.path().join("secret.txt")).expect("secret"),
        "secret"
    );
}

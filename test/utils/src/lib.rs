use std::env;
use std::fs;
use std::path;

use serde_json::json;
use serde_json::Value;

/// Creates a fresh, empty directory under the system temp dir.
pub fn temp_dir(prefix: &str) -> path::PathBuf {
    let dir = env::temp_dir().join(format!("parley-{prefix}-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    return dir;
}

/// Writes a file relative to `root`, creating parent directories.
pub fn write_file(root: &path::Path, relative: &str, contents: &str) -> path::PathBuf {
    let file_path = root.join(relative);
    fs::create_dir_all(file_path.parent().unwrap()).unwrap();
    fs::write(&file_path, contents).unwrap();
    return file_path;
}

pub fn assistant_fixture(id: &str, file_ids: &[&str]) -> Value {
    return json!({
        "id": id,
        "object": "assistant",
        "created_at": 1699009709,
        "name": "Laura",
        "description": "The ultimate librarian",
        "model": "gpt-4-1106-preview",
        "instructions": "You are the ultimate librarian.",
        "tools": [{ "type": "code_interpreter" }, { "type": "retrieval" }],
        "file_ids": file_ids,
        "metadata": {}
    });
}

pub fn file_fixture(id: &str, filename: &str) -> Value {
    return json!({
        "id": id,
        "object": "file",
        "bytes": 120000,
        "created_at": 1699009709,
        "filename": filename,
        "purpose": "assistants"
    });
}

pub fn run_fixture(id: &str, status: &str) -> Value {
    return json!({
        "id": id,
        "object": "thread.run",
        "created_at": 1699009709,
        "thread_id": "thread_abc",
        "assistant_id": "asst_abc",
        "status": status,
        "last_error": null
    });
}

pub fn message_fixture(id: &str, role: &str, text: &str, run_id: Option<&str>) -> Value {
    return json!({
        "id": id,
        "object": "thread.message",
        "created_at": 1699009709,
        "thread_id": "thread_abc",
        "role": role,
        "content": [{
            "type": "text",
            "text": { "value": text, "annotations": [] }
        }],
        "file_ids": [],
        "assistant_id": null,
        "run_id": run_id,
        "metadata": {}
    });
}

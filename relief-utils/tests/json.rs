use relief_utils::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    zeta: u32,
    alpha: Vec<f64>,
    nested: Nested,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Nested {
    y: i64,
    x: i64,
}

fn sample() -> Sample {
    Sample {
        zeta: 7,
        alpha: vec![1.5, 2.0],
        nested: Nested { y: -1, x: 3 },
    }
}

#[test]
fn test_jsonify_sorts_keys() {
    assert_eq!(
        jsonify(&sample()).unwrap(),
        r#"{"alpha":[1.5,2.0],"nested":{"x":3,"y":-1},"zeta":7}"#
    );
    assert_eq!(
        jsonify(&json!([{ "b": 1, "a": 2 }])).unwrap(),
        r#"[{"a":2,"b":1}]"#
    );
}

#[test]
fn test_dejsonify_rejects_missing_fields() {
    assert!(dejsonify::<Sample>(r#"{"zeta":1,"alpha":[]}"#).is_err());
    let parsed: Sample = dejsonify(&jsonify(&sample()).unwrap()).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn test_compressed_files_load() {
    let dir = std::env::temp_dir().join(format!("relief-utils-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let compressed = dir.join("sample.zlib");
    fs::write(&compressed, compress_obj(&sample()).unwrap()).unwrap();
    assert_eq!(load_obj::<Sample>(&compressed).unwrap(), sample());

    let plain = dir.join("sample.json");
    fs::write(&plain, jsonify_pretty(&sample()).unwrap()).unwrap();
    assert_eq!(load_obj::<Sample>(&plain).unwrap(), sample());

    assert!(decompress_obj::<Sample>(b"not zlib").is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_read_json_arg_passes_inline_text_through() {
    assert_eq!(read_json_arg(r#"{"seed":1}"#).unwrap(), r#"{"seed":1}"#);
    assert!(read_json_arg("/definitely/missing/file.json").is_err());
}

#[test]
fn test_logging_writes_json_lines() {
    let dir = std::env::temp_dir().join(format!("relief-logs-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let logfile = dir.join("run.log");
    {
        let _guard = init_test_logging(Some(&logfile)).unwrap();
        tracing::warn!(answer = 42, "hello");
    }
    assert!(logfile.exists());
    assert!(init_test_logging(None::<&str>).unwrap().is_none());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_logging_reports_unwritable_log_file() {
    let missing = std::env::temp_dir()
        .join(format!("relief-missing-{}", std::process::id()))
        .join("nested")
        .join("run.log");
    assert!(init_logging_with(DEFAULT_LOG_FILTER, Some(&missing), true).is_err());
}

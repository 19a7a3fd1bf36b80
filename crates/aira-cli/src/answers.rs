//! Reading answer files and writing command output.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Load a flat answer object from a JSON or YAML file. `-` reads stdin.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as
/// JSON.
pub fn load_answers(path: &Path) -> Result<Map<String, Value>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read answers from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers file: {}", path.display()))?
    };

    let value: Value = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))?
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => bail!(
            "answers file {} must contain an object, found {}",
            path.display(),
            kind(&other)
        ),
    }
}

/// Write `value` to `out`, or pretty JSON to stdout when `out` is `None`.
pub fn write_output<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let Some(path) = out else {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    };

    let rendered = if is_yaml(path) {
        serde_yaml::to_string(value)?
    } else {
        let mut s = serde_json::to_string_pretty(value)?;
        s.push('\n');
        s
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    tracing::info!(path = %path.display(), "output written");
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

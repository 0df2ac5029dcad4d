use super::types::{ExportRequest, ExportSummary, ExportTarget};
use crate::error::{Error, Result};
use crate::ingestion::types::{DEFAULT_START_DATE, Record, parse_optional_date};

use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the records of `batch` dated on or after the requested date to a file.
///
/// The date is validated and the output rendered in memory before the file system is
/// touched, so a rejected export leaves any existing file alone. A file already at the
/// resolved path is deleted first and replaced, never appended to.
pub fn export(
    batch: &[Record],
    request: &ExportRequest,
    export_dir: &Path,
) -> Result<ExportSummary> {
    let from_date =
        parse_optional_date(request.from_date.as_deref())?.unwrap_or(DEFAULT_START_DATE);
    let path = resolve_export_path(
        request.path.as_deref(),
        &from_date.to_string(),
        request.target,
        export_dir,
    );

    let matched: Vec<&Record> = batch
        .iter()
        .filter(|record| record.date().is_some_and(|date| date >= from_date))
        .collect();

    let contents = match request.target {
        ExportTarget::Kibana => render_kibana(&matched)?.into_bytes(),
        ExportTarget::Elastic => render_elastic(&matched)?.into_bytes(),
        ExportTarget::Csv => {
            if matched.is_empty() {
                return Err(Error::EmptyExport {
                    from_date: from_date.to_string(),
                });
            }
            render_csv(&matched)?
        }
    };

    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    write_staged(&path, &contents)?;

    tracing::info!("Exported {} records to: {}", matched.len(), path.display());
    Ok(ExportSummary {
        path,
        record_count: matched.len(),
    })
}

/// Writes `contents` to a temp file next to `path` and renames it into place, so a
/// failed write never leaves a truncated export behind.
fn write_staged(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.flush()?;
    staged.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Resolves where an export lands.
///
/// No path: `<export_dir>/<from_date>.<ext>`. A path without a directory is placed in
/// `export_dir`; a path without an extension gets the target's.
pub fn resolve_export_path(
    path: Option<&str>,
    from_date: &str,
    target: ExportTarget,
    export_dir: &Path,
) -> PathBuf {
    let Some(path) = path.map(str::trim).filter(|path| !path.is_empty()) else {
        return export_dir.join(format!("{}.{}", from_date, target.extension()));
    };

    let mut resolved = if path.contains('/') {
        PathBuf::from(path)
    } else {
        export_dir.join(path)
    };
    if resolved.extension().is_none() {
        resolved.set_extension(target.extension());
    }
    resolved
}

/// One object per line with every value rendered as a string.
pub fn render_kibana(records: &[&Record]) -> Result<String> {
    let mut output = String::new();
    for record in records {
        let line: Map<String, Value> = record
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(scalar_text(value, "None"))))
            .collect();
        output.push_str(&serde_json::to_string(&line)?);
        output.push('\n');
    }
    Ok(output)
}

/// A single JSON array. Nulls are written as the string `"None"` for the importers that
/// consume this format.
pub fn render_elastic(records: &[&Record]) -> Result<String> {
    let documents: Vec<Value> = records
        .iter()
        .map(|record| {
            Value::Object(
                record
                    .iter()
                    .map(|(key, value)| (key.clone(), null_as_none(value)))
                    .collect(),
            )
        })
        .collect();
    Ok(serde_json::to_string(&documents)?)
}

/// Header row from the first record's keys, then one row per record in that column order.
/// Columns a later record lacks are left empty; keys it adds are not written.
pub fn render_csv(records: &[&Record]) -> Result<Vec<u8>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let header: Vec<&String> = first.keys().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for record in records {
        let row = header.iter().map(|column| {
            record
                .get(column.as_str())
                .map(|value| scalar_text(value, ""))
                .unwrap_or_default()
        });
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::Null => null.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn null_as_none(value: &Value) -> Value {
    match value {
        Value::Null => Value::String("None".to_string()),
        Value::Array(items) => Value::Array(items.iter().map(null_as_none).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), null_as_none(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

//! 历史导出与导入解析
//!
//! - JSON：带版本号的文档，`entries` 为记录数组
//! - CSV：首行为表头，包含分隔符、引号或换行的值自动加引号
//! - Text：每行 `[RFC3339 时间] [ok|failed 12.5ms] 命令`，状态块仅在包含元数据时输出

use super::error::{HistoryError, HistoryResult};
use super::types::{single_line_command, ExportFormat, HistoryEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

pub const EXPORT_VERSION: u32 = 1;

const CSV_HEADER: [&str; 3] = ["id", "timestamp", "command"];
const CSV_METADATA_HEADER: [&str; 4] = ["success", "executionTimeMs", "errorMessage", "sessionId"];

static TEXT_LINE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^\[(?P<ts>[^\]]+)\](?: \[(?P<status>ok|failed)(?: (?P<ms>-?(?:[0-9]+(?:\.[0-9]+)?|inf|NaN))ms)?\])? (?P<command>.+)$")
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    version: u32,
    exported_at: String,
    total_entries: usize,
    entries: Vec<Value>,
}

pub fn export_entries(
    entries: &[&HistoryEntry],
    format: ExportFormat,
    include_metadata: bool,
    now_ms: i64,
) -> HistoryResult<String> {
    match format {
        ExportFormat::Json => export_json(entries, include_metadata, now_ms),
        ExportFormat::Csv => export_csv(entries, include_metadata),
        ExportFormat::Text => Ok(export_text(entries, include_metadata)),
    }
}

fn export_json(entries: &[&HistoryEntry], include_metadata: bool, now_ms: i64) -> HistoryResult<String> {
    let entries = entries
        .iter()
        .map(|entry| {
            if include_metadata {
                serde_json::to_value(entry)
            } else {
                Ok(json!({
                    "id": entry.id,
                    "command": entry.command,
                    "timestamp": entry.timestamp,
                }))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let document = ExportDocument {
        version: EXPORT_VERSION,
        exported_at: format_timestamp(now_ms),
        total_entries: entries.len(),
        entries,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn export_csv(entries: &[&HistoryEntry], include_metadata: bool) -> HistoryResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = CSV_HEADER.to_vec();
    if include_metadata {
        header.extend(CSV_METADATA_HEADER);
    }
    writer.write_record(&header)?;

    for entry in entries {
        let mut record = vec![
            entry.id.to_string(),
            entry.timestamp.to_string(),
            entry.command.clone(),
        ];
        if include_metadata {
            record.push(entry.success.to_string());
            record.push(entry.execution_time_ms.to_string());
            record.push(entry.error_message.clone().unwrap_or_default());
            record.push(entry.session_id.clone());
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| HistoryError::parse(format!("flushing CSV output: {e}")))?;
    String::from_utf8(bytes).map_err(|e| HistoryError::parse(format!("CSV output is not UTF-8: {e}")))
}

fn export_text(entries: &[&HistoryEntry], include_metadata: bool) -> String {
    entries
        .iter()
        .map(|entry| {
            let timestamp = format_timestamp(entry.timestamp);
            // 每条记录必须占一行
            let command = single_line_command(&entry.command);
            if include_metadata {
                let status = if entry.success { "ok" } else { "failed" };
                format!(
                    "[{timestamp}] [{status} {}ms] {command}",
                    clamp_duration(entry.execution_time_ms)
                )
            } else {
                format!("[{timestamp}] {command}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 非有限或负数的耗时按 0 处理
fn clamp_duration(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(ms) = value.trim().parse::<i64>() {
        return Some(ms);
    }
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// 导入时的一条候选记录
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub id: Option<u64>,
    pub command: String,
    pub timestamp: i64,
    pub session_id: String,
    pub success: bool,
    pub execution_time_ms: f64,
    pub error_message: Option<String>,
}

impl ImportRecord {
    fn new(command: String, timestamp: i64) -> Option<Self> {
        let command = single_line_command(&command);
        if command.is_empty() || timestamp <= 0 {
            return None;
        }
        Some(Self {
            id: None,
            command,
            timestamp,
            session_id: String::new(),
            success: true,
            execution_time_ms: 0.0,
            error_message: None,
        })
    }

    pub fn into_entry(self, id: u64) -> HistoryEntry {
        HistoryEntry {
            id,
            command: self.command,
            timestamp: self.timestamp,
            session_id: self.session_id,
            success: self.success,
            execution_time_ms: self.execution_time_ms,
            error_message: self.error_message,
        }
    }
}

/// 解析结果：有效记录与跳过计数
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub records: Vec<ImportRecord>,
    pub skipped: usize,
    pub total: usize,
}

impl ParsedImport {
    fn push(&mut self, record: Option<ImportRecord>) {
        self.total += 1;
        match record {
            Some(record) => self.records.push(record),
            None => self.skipped += 1,
        }
    }
}

/// 解析导入数据；只有整体无法解析的文档返回错误
pub fn parse_import(data: &str, format: ExportFormat) -> HistoryResult<ParsedImport> {
    match format {
        ExportFormat::Json => parse_json(data),
        ExportFormat::Csv => parse_csv(data),
        ExportFormat::Text => parse_text(data),
    }
}

fn parse_json(data: &str) -> HistoryResult<ParsedImport> {
    let document: Value = serde_json::from_str(data)?;
    let records = match &document {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("entries") {
            Some(Value::Array(items)) => items,
            _ => return Err(HistoryError::parse("JSON document has no entries array")),
        },
        _ => return Err(HistoryError::parse("expected a JSON array or object")),
    };

    let mut parsed = ParsedImport::default();
    for item in records {
        parsed.push(json_record(item));
    }
    Ok(parsed)
}

fn json_record(value: &Value) -> Option<ImportRecord> {
    let object = value.as_object()?;
    let command = object.get("command")?.as_str()?.to_string();
    let timestamp = match object.get("timestamp")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        _ => return None,
    };

    let mut record = ImportRecord::new(command, timestamp)?;
    record.id = object.get("id").and_then(Value::as_u64);
    if let Some(session) = object.get("sessionId").and_then(Value::as_str) {
        record.session_id = session.to_string();
    }
    if let Some(success) = object.get("success").and_then(Value::as_bool) {
        record.success = success;
    }
    if let Some(ms) = object.get("executionTimeMs").and_then(Value::as_f64) {
        record.execution_time_ms = clamp_duration(ms);
    }
    record.error_message = object
        .get("errorMessage")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(record)
}

fn parse_csv(data: &str) -> HistoryResult<ParsedImport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let command_idx =
        column("command").ok_or_else(|| HistoryError::parse("CSV is missing the command column"))?;
    let timestamp_idx = column("timestamp")
        .ok_or_else(|| HistoryError::parse("CSV is missing the timestamp column"))?;
    let id_idx = column("id");
    let success_idx = column("success");
    let time_idx = column("executionTimeMs");
    let error_idx = column("errorMessage");
    let session_idx = column("sessionId");

    let mut parsed = ParsedImport::default();
    for row in reader.records() {
        let record = row.ok().and_then(|row| {
            let command = row.get(command_idx)?.to_string();
            let timestamp = parse_timestamp(row.get(timestamp_idx)?)?;
            let mut record = ImportRecord::new(command, timestamp)?;

            let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).filter(|v| !v.is_empty());
            record.id = field(id_idx).and_then(|v| v.parse().ok());
            if let Some(success) = field(success_idx).and_then(|v| v.parse().ok()) {
                record.success = success;
            }
            if let Some(ms) = field(time_idx).and_then(|v| v.parse().ok()) {
                record.execution_time_ms = clamp_duration(ms);
            }
            record.error_message = field(error_idx).map(str::to_string);
            if let Some(session) = field(session_idx) {
                record.session_id = session.to_string();
            }
            Some(record)
        });
        parsed.push(record);
    }
    Ok(parsed)
}

fn parse_text(data: &str) -> HistoryResult<ParsedImport> {
    let pattern = TEXT_LINE
        .as_ref()
        .map_err(|e| HistoryError::parse(format!("text line pattern: {e}")))?;

    let mut parsed = ParsedImport::default();
    for line in data.lines().filter(|line| !line.trim().is_empty()) {
        let record = pattern.captures(line).and_then(|caps| {
            let timestamp = parse_timestamp(caps.name("ts")?.as_str())?;
            let mut record = ImportRecord::new(caps.name("command")?.as_str().to_string(), timestamp)?;
            if let Some(status) = caps.name("status") {
                record.success = status.as_str() == "ok";
            }
            if let Some(ms) = caps.name("ms").and_then(|m| m.as_str().parse().ok()) {
                record.execution_time_ms = clamp_duration(ms);
            }
            Some(record)
        });
        parsed.push(record);
    }
    Ok(parsed)
}

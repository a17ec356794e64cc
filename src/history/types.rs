//! 历史记录相关的类型定义

use crate::history::error::HistoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 一条历史记录
///
/// 创建后不再修改，只会被 FIFO 裁剪或整体清空/替换移除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub command: String,
    /// 毫秒时间戳
    pub timestamp: i64,
    #[serde(default)]
    pub session_id: String,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub execution_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// 把命令压成单行：逐行去空白，丢弃空行后用单个空格连接
pub fn single_line_command(command: &str) -> String {
    command
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_success() -> bool {
    true
}

impl HistoryEntry {
    pub fn new(
        id: u64,
        command: impl Into<String>,
        timestamp: i64,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            command: command.into(),
            timestamp,
            session_id: session_id.into(),
            success: true,
            execution_time_ms: 0.0,
            error_message: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ExecutionMetadata) -> Self {
        self.success = metadata.success;
        self.execution_time_ms = metadata.execution_time_ms;
        self.error_message = metadata.error_message;
        self
    }

    /// 命令名（第一个 token）
    pub fn command_name(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or("")
    }
}

/// 命令执行结果，由命令分发器回报
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub success: bool,
    pub execution_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Default for ExecutionMetadata {
    fn default() -> Self {
        Self::success(0.0)
    }
}

impl ExecutionMetadata {
    pub fn success(execution_time_ms: f64) -> Self {
        Self {
            success: true,
            execution_time_ms,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>, execution_time_ms: f64) -> Self {
        Self {
            success: false,
            execution_time_ms,
            error_message: Some(message.into()),
        }
    }
}

/// 历史导航方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Up,
    Down,
    First,
    Last,
}

impl FromStr for NavigateDirection {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "previous" | "prev" => Ok(Self::Up),
            "down" | "next" => Ok(Self::Down),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(HistoryError::parse(format!(
                "unknown navigation direction: {other}"
            ))),
        }
    }
}

/// 搜索模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Exact,
    Contains,
    #[default]
    Fuzzy,
    /// 正则
    #[serde(alias = "regex")]
    Pattern,
}

impl FromStr for SearchMode {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" => Ok(Self::Contains),
            "fuzzy" => Ok(Self::Fuzzy),
            "regex" | "pattern" => Ok(Self::Pattern),
            other => Err(HistoryError::parse(format!("unknown search type: {other}"))),
        }
    }
}

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    /// 最新在前
    Timestamp,
    /// 使用次数最多在前
    Frequency,
}

/// 闭区间时间范围（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        (self.start..=self.end).contains(&timestamp)
    }
}

/// 搜索选项，整体参与缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub mode: SearchMode,
    /// 为空时使用配置中的默认条数
    pub limit: Option<usize>,
    pub sort_by: SortKey,
    pub time_range: Option<TimeRange>,
    pub command_prefix: Option<String>,
    /// 只返回成功/失败的记录
    pub success: Option<bool>,
}

impl SearchOptions {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = key;
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = Some(prefix.into());
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(HistoryError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 导出选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    pub include_metadata: bool,
    pub time_range: Option<TimeRange>,
    /// 只导出最新的 N 条
    pub limit: Option<usize>,
}

impl ExportOptions {
    pub fn with_metadata() -> Self {
        Self {
            include_metadata: true,
            ..Self::default()
        }
    }
}

/// 导入选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// true：追加新记录；false：替换全部
    pub merge: bool,
}

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported_count: usize,
    /// 校验失败被跳过的记录
    pub skipped_count: usize,
    /// 合并时 id 已存在的记录
    pub duplicate_count: usize,
    /// 文档中的记录总数
    pub total_count: usize,
}

/// 命令使用次数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCount {
    pub command: String,
    pub count: u64,
}

/// 当前会话信息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub command_count: usize,
    pub total_execution_time_ms: f64,
}

/// 历史统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatistics {
    /// 累计记录过的命令数（裁剪不减少）
    pub total_commands: u64,
    /// 成功比例 0.0..=1.0
    pub success_rate: f64,
    pub top_commands: Vec<CommandCount>,
    /// 平均执行耗时（毫秒）
    pub average_execution_time: f64,
    pub session_commands: usize,
    pub average_command_length: f64,
    pub history_size: usize,
    pub error_commands: Vec<String>,
    pub current_session: SessionInfo,
}

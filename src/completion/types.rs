//! 补全功能相关的类型定义

use crate::completion::metadata::ParameterKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 建议项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionType {
    /// 已注册命令
    Command,
    /// 命令别名
    Alias,
    /// 历史命令行
    HistoryValue,
    /// 参数取值
    ParameterValue,
    /// 控制台变量
    Variable,
    /// 仅模糊匹配命中的命令
    FuzzyMatch,
}

impl SuggestionType {
    pub const ALL: [SuggestionType; 6] = [
        SuggestionType::Command,
        SuggestionType::Alias,
        SuggestionType::HistoryValue,
        SuggestionType::ParameterValue,
        SuggestionType::Variable,
        SuggestionType::FuzzyMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Alias => "alias",
            Self::HistoryValue => "history-value",
            Self::ParameterValue => "parameter-value",
            Self::Variable => "variable",
            Self::FuzzyMatch => "fuzzy-match",
        }
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 补全建议
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// 补全文本
    pub text: String,

    /// 建议类型 (前端期望字段名为 kind)
    #[serde(rename = "kind")]
    pub suggestion_type: SuggestionType,

    /// 描述信息
    pub description: String,

    /// 分类（命令分组等）
    pub category: String,

    /// 排序分数
    pub score: f64,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, suggestion_type: SuggestionType) -> Self {
        Self {
            text: text.into(),
            suggestion_type,
            description: String::new(),
            category: String::new(),
            score: 0.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// 光标所在位置的补全类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    /// 正在输入命令名
    Command,
    /// 已知命令的已知参数
    Parameter(ParameterKind),
    /// 未知命令或超出参数列表
    GenericArg,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Parameter(kind) => kind.as_str(),
            Self::GenericArg => "generic_arg",
        }
    }
}

/// 输入行分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct InputContext {
    /// 光标之前的输入
    pub input: String,

    /// 命令名（第一个 token）
    pub command_name: String,

    /// 别名解析后的规范命令名
    pub resolved_command: Option<String>,

    /// 参数列表；输入以空白结尾时末尾追加一个空参数
    pub args: Vec<String>,

    /// 当前正在编辑的 token
    pub current_token: String,

    /// 当前参数序号
    pub arg_index: usize,

    pub context_type: ContextType,
}

impl InputContext {
    pub fn is_completing_command(&self) -> bool {
        self.context_type == ContextType::Command
    }

    /// 规范命令名，未解析时退回原始命令名
    pub fn command(&self) -> &str {
        self.resolved_command
            .as_deref()
            .unwrap_or(self.command_name.as_str())
    }
}

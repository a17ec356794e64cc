//! 补全候选生成器
//!
//! 每个生成器对应一种候选来源，声明自己服务哪些上下文。
//! 生成器只负责产出带匹配方式的候选，评分和排序由引擎完成。

pub mod commands;
pub mod history;
pub mod parameters;
pub mod variables;

pub use commands::{AliasGenerator, CommandGenerator};
pub use history::HistoryGenerator;
pub use parameters::ParameterValueGenerator;
pub use variables::VariableGenerator;

use crate::completion::learning::FrequencyModel;
use crate::completion::matching::MatchKind;
use crate::completion::metadata::CommandCatalog;
use crate::completion::types::{InputContext, SuggestionType};
use crate::config::CompletionConfig;
use crate::history::HistoryEntry;
use std::collections::BTreeMap;
use std::fmt;

/// 候选来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CandidateSource {
    Commands,
    Aliases,
    HistoryLines,
    ParameterValues,
    Variables,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Aliases => "aliases",
            Self::HistoryLines => "history",
            Self::ParameterValues => "parameters",
            Self::Variables => "variables",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 待评分的候选
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub kind: SuggestionType,
    pub description: String,
    pub category: String,
    /// 参与匹配的查询文本
    pub query: String,
    pub match_kind: Option<MatchKind>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, kind: SuggestionType) -> Self {
        Self {
            text: text.into(),
            kind,
            description: String::new(),
            category: String::new(),
            query: String::new(),
            match_kind: None,
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

    pub fn with_match(mut self, query: impl Into<String>, match_kind: MatchKind) -> Self {
        self.query = query.into();
        self.match_kind = Some(match_kind);
        self
    }
}

/// 生成候选时可读取的数据
pub struct CandidateSources<'a> {
    pub catalog: &'a dyn CommandCatalog,
    /// 按时间顺序（最旧在前）
    pub history: &'a [HistoryEntry],
    pub model: &'a FrequencyModel,
    pub variables: &'a BTreeMap<String, String>,
    pub config: &'a CompletionConfig,
}

impl CandidateSources<'_> {
    /// 当前查询是否启用模糊匹配，返回阈值
    pub fn fuzzy_threshold(&self, query: &str) -> Option<f64> {
        (query.chars().count() >= self.config.fuzzy_min_query_length)
            .then_some(self.config.fuzzy_threshold)
    }
}

/// 候选生成器
pub trait CandidateGenerator: Send + Sync {
    fn source(&self) -> CandidateSource;

    /// 检查是否应该为给定上下文生成候选
    fn should_provide(&self, context: &InputContext) -> bool;

    /// 按稳定顺序生成候选
    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate>;

    fn name(&self) -> &'static str {
        self.source().as_str()
    }
}

/// 固定的生成器表，顺序即候选生成顺序
pub fn default_generators() -> Vec<Box<dyn CandidateGenerator>> {
    vec![
        Box::new(CommandGenerator),
        Box::new(AliasGenerator),
        Box::new(HistoryGenerator),
        Box::new(ParameterValueGenerator),
        Box::new(VariableGenerator),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::completion::metadata::CommandRegistry;

    /// 测试用的数据源集合
    pub struct Fixture {
        pub registry: CommandRegistry,
        pub history: Vec<HistoryEntry>,
        pub model: FrequencyModel,
        pub variables: BTreeMap<String, String>,
        pub config: CompletionConfig,
    }

    impl Fixture {
        pub fn builtin() -> Self {
            Self {
                registry: CommandRegistry::with_builtin(),
                history: Vec::new(),
                model: FrequencyModel::default(),
                variables: BTreeMap::new(),
                config: CompletionConfig::default(),
            }
        }

        pub fn sources(&self) -> CandidateSources<'_> {
            CandidateSources {
                catalog: &self.registry,
                history: &self.history,
                model: &self.model,
                variables: &self.variables,
                config: &self.config,
            }
        }

        pub fn push_history(&mut self, command: &str) {
            let id = self.history.len() as u64 + 1;
            self.history
                .push(HistoryEntry::new(id, command, id as i64 * 1000, "test"));
        }
    }
}

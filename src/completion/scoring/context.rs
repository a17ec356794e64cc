//! 评分上下文
//!
//! 封装评分计算所需的所有数据，评分逻辑放在各个评分器中

use crate::completion::matching::MatchKind;
use crate::completion::types::SuggestionType;

/// 评分上下文
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// 当前 token（查询）
    pub query: String,

    /// 候选文本
    pub text: String,

    /// 候选类型
    pub kind: SuggestionType,

    /// 命中的匹配策略；`None` 表示未经过匹配（如回退列表）
    pub match_kind: Option<MatchKind>,

    /// 学习模型中的使用次数
    pub usage_count: u64,

    /// 是否在最近命令列表中
    pub is_recent: bool,
}

impl ScoringContext {
    /// 创建新的评分上下文
    pub fn new(
        query: impl Into<String>,
        text: impl Into<String>,
        kind: SuggestionType,
    ) -> Self {
        Self {
            query: query.into(),
            text: text.into(),
            kind,
            match_kind: None,
            usage_count: 0,
            is_recent: false,
        }
    }

    pub fn with_match(mut self, match_kind: MatchKind) -> Self {
        self.match_kind = Some(match_kind);
        self
    }

    pub fn with_usage_count(mut self, count: u64) -> Self {
        self.usage_count = count;
        self
    }

    pub fn with_recent(mut self, is_recent: bool) -> Self {
        self.is_recent = is_recent;
        self
    }

    /// 候选文本比查询多出的字符数
    pub fn length_gap(&self) -> usize {
        self.text
            .chars()
            .count()
            .saturating_sub(self.query.chars().count())
    }
}

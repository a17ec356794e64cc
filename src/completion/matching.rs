//! 匹配策略
//!
//! 纯函数：给定候选文本和查询，返回 [0, 1] 之间的原始匹配分数。
//! 所有比较均忽略大小写，位置与长度按字符计。

use crate::completion::error::{CompletionError, CompletionResult};
use crate::config::MatchConfig;
use regex::{Regex, RegexBuilder};

/// 前缀匹配
pub fn prefix_score(candidate: &str, query: &str) -> f64 {
    if candidate.to_lowercase().starts_with(&query.to_lowercase()) {
        1.0
    } else {
        0.0
    }
}

/// 子串首次出现的位置（字符偏移）
pub fn substring_position(candidate: &str, query: &str) -> Option<usize> {
    let haystack = candidate.to_lowercase();
    let needle = query.to_lowercase();
    let byte_index = haystack.find(&needle)?;
    Some(haystack[..byte_index].chars().count())
}

/// 子串匹配
pub fn substring_score(candidate: &str, query: &str) -> f64 {
    if substring_position(candidate, query).is_some() {
        1.0
    } else {
        0.0
    }
}

/// 贪心子序列匹配：按顺序命中的查询字符数 / 查询长度
pub fn fuzzy_ratio(candidate: &str, query: &str) -> f64 {
    let query: Vec<char> = query.to_lowercase().chars().collect();
    if query.is_empty() {
        return 0.0;
    }

    let mut matched = 0;
    for ch in candidate.to_lowercase().chars() {
        if matched < query.len() && ch == query[matched] {
            matched += 1;
        }
    }

    matched as f64 / query.len() as f64
}

/// 编译忽略大小写的正则，超长模式和超限程序都会被拒绝
pub fn compile_pattern(pattern: &str, config: &MatchConfig) -> CompletionResult<Regex> {
    let length = pattern.chars().count();
    if length > config.max_pattern_length {
        return Err(CompletionError::PatternTooLong {
            length,
            limit: config.max_pattern_length,
        });
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(config.regex_size_limit)
        .build()
        .map_err(|e| CompletionError::invalid_pattern(pattern, e))
}

/// 正则匹配，二值
pub fn pattern_score(candidate: &str, pattern: &Regex) -> f64 {
    if pattern.is_match(candidate) {
        1.0
    } else {
        0.0
    }
}

/// 单个候选的最佳匹配方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Prefix,
    Substring { position: usize },
    Fuzzy { ratio: f64 },
}

impl MatchKind {
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, MatchKind::Fuzzy { .. })
    }
}

/// 按 前缀 → 子串 → 模糊 的顺序选出第一种命中的策略
///
/// `fuzzy_threshold` 为 `None` 时不做模糊匹配。
pub fn best_match(candidate: &str, query: &str, fuzzy_threshold: Option<f64>) -> Option<MatchKind> {
    if prefix_score(candidate, query) > 0.0 {
        return Some(MatchKind::Prefix);
    }
    if let Some(position) = substring_position(candidate, query) {
        return Some(MatchKind::Substring { position });
    }

    let threshold = fuzzy_threshold?;
    let ratio = fuzzy_ratio(candidate, query);
    (ratio > 0.0 && ratio >= threshold).then_some(MatchKind::Fuzzy { ratio })
}

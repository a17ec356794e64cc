//! 历史搜索
//!
//! 匹配 → 过滤（时间范围、命令前缀、成功标记） → 排序 → 截断

use super::index::SearchIndex;
use super::types::{HistoryEntry, SearchMode, SearchOptions, SortKey};
use crate::completion::matching::{compile_pattern, fuzzy_ratio};
use crate::config::MatchConfig;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// 相关度加分
const EXACT_BONUS: f64 = 100.0;
const PREFIX_BONUS: f64 = 50.0;
const CONTAINS_BONUS: f64 = 25.0;
const FUZZY_WEIGHT: f64 = 20.0;
const FREQUENCY_WEIGHT: f64 = 2.0;
const FREQUENCY_CAP: f64 = 20.0;
const RECENCY_MAX: f64 = 10.0;
const SUCCESS_BONUS: f64 = 5.0;

pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
    pub options: &'a SearchOptions,
    pub limit: usize,
    pub fuzzy_threshold: f64,
    pub matching: &'a MatchConfig,
}

pub(crate) fn run(
    entries: &[HistoryEntry],
    index: &SearchIndex,
    request: &SearchRequest<'_>,
) -> Vec<HistoryEntry> {
    let query = request.query.trim();
    let options = request.options;

    let Some(matcher) = Matcher::build(query, request) else {
        return Vec::new();
    };
    let narrowed = narrow(index, query, options.mode);

    let mut matched: Vec<(usize, &HistoryEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| narrowed.as_ref().map_or(true, |ids| ids.contains(&entry.id)))
        .filter(|(_, entry)| passes_filters(entry, options))
        .filter(|(_, entry)| matcher.matches(&entry.command))
        .collect();

    // 空查询没有相关度可言，按时间排序
    let sort_key = match options.sort_by {
        SortKey::Relevance if query.is_empty() => SortKey::Timestamp,
        key => key,
    };

    match sort_key {
        SortKey::Timestamp => matched.sort_by(|a, b| newest_first(a.1, b.1)),
        SortKey::Frequency => {
            let counts = command_counts(entries);
            matched.sort_by(|a, b| {
                counts[b.1.command.as_str()]
                    .cmp(&counts[a.1.command.as_str()])
                    .then_with(|| newest_first(a.1, b.1))
            });
        }
        SortKey::Relevance => {
            let counts = command_counts(entries);
            let total = entries.len();
            let mut scored: Vec<(f64, &HistoryEntry)> = matched
                .iter()
                .map(|(position, entry)| {
                    let count = counts[entry.command.as_str()];
                    (relevance(entry, query, count, *position, total), *entry)
                })
                .collect();
            scored.sort_by(|a, b| {
                b.0.partial_cmp(&a.0)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| newest_first(a.1, b.1))
            });
            return scored
                .into_iter()
                .take(request.limit)
                .map(|(_, entry)| entry.clone())
                .collect();
        }
    }

    matched
        .into_iter()
        .take(request.limit)
        .map(|(_, entry)| entry.clone())
        .collect()
}

/// 历史记录相关度
///
/// `position` 为记录在时间序列中的下标，越新加分越多。
pub fn relevance(entry: &HistoryEntry, query: &str, count: usize, position: usize, total: usize) -> f64 {
    let command = entry.command.to_lowercase();
    let needle = query.to_lowercase();
    let mut score = 0.0;

    if command == needle {
        score += EXACT_BONUS;
    }
    if command.starts_with(&needle) {
        score += PREFIX_BONUS;
    }
    if command.contains(&needle) {
        score += CONTAINS_BONUS;
    }
    score += fuzzy_ratio(&entry.command, query) * FUZZY_WEIGHT;
    score += (count as f64 * FREQUENCY_WEIGHT).min(FREQUENCY_CAP);
    if total > 0 {
        score += RECENCY_MAX * (position + 1) as f64 / total as f64;
    }
    if entry.success {
        score += SUCCESS_BONUS;
    }
    score
}

enum Matcher {
    All,
    Exact(String),
    Contains(String),
    Fuzzy { query: String, threshold: f64 },
    Pattern(regex::Regex),
}

impl Matcher {
    fn build(query: &str, request: &SearchRequest<'_>) -> Option<Self> {
        if query.is_empty() {
            return Some(Matcher::All);
        }

        let matcher = match request.options.mode {
            SearchMode::Exact => Matcher::Exact(query.to_string()),
            SearchMode::Contains => Matcher::Contains(query.to_lowercase()),
            SearchMode::Fuzzy => Matcher::Fuzzy {
                query: query.to_string(),
                threshold: request.fuzzy_threshold,
            },
            SearchMode::Pattern => match compile_pattern(query, request.matching) {
                Ok(regex) => Matcher::Pattern(regex),
                Err(err) => {
                    warn!(pattern = %query, error = %err, "history.search.invalid_pattern");
                    return None;
                }
            },
        };
        Some(matcher)
    }

    fn matches(&self, command: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Exact(query) => command == query,
            Matcher::Contains(needle) => command.to_lowercase().contains(needle.as_str()),
            Matcher::Fuzzy { query, threshold } => {
                command.to_lowercase().contains(&query.to_lowercase())
                    || fuzzy_ratio(command, query) >= *threshold
            }
            Matcher::Pattern(regex) => regex.is_match(command),
        }
    }
}

/// 通过倒排索引缩小候选范围；无法使用索引时返回 `None`
fn narrow(index: &SearchIndex, query: &str, mode: SearchMode) -> Option<HashSet<u64>> {
    if query.is_empty() {
        return None;
    }
    match mode {
        SearchMode::Exact => index.exact_candidates(query),
        SearchMode::Contains => index.contains_candidates(query),
        SearchMode::Fuzzy | SearchMode::Pattern => None,
    }
}

fn passes_filters(entry: &HistoryEntry, options: &SearchOptions) -> bool {
    if let Some(range) = options.time_range {
        if !range.contains(entry.timestamp) {
            return false;
        }
    }
    if let Some(prefix) = options.command_prefix.as_deref() {
        if !entry
            .command
            .to_lowercase()
            .starts_with(&prefix.to_lowercase())
        {
            return false;
        }
    }
    if let Some(success) = options.success {
        if entry.success != success {
            return false;
        }
    }
    true
}

fn command_counts(entries: &[HistoryEntry]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for entry in entries {
        *counts.entry(entry.command.as_str()).or_insert(0) += 1;
    }
    counts
}

fn newest_first(a: &HistoryEntry, b: &HistoryEntry) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
}

//! 命令历史存储
//!
//! 追加写入、容量受限、带倒排索引的命令历史：
//! - `add`：去抖重复命令，超出容量时从头部裁剪并重建索引
//! - `search`：四种匹配模式 + 过滤 + 排序，结果按 (查询, 选项) 缓存
//! - `export` / `import`：JSON、CSV、文本三种格式

pub mod error;
pub mod export;
pub mod index;
pub mod navigation;
pub mod search;
pub mod stats;
pub mod types;

pub use error::{HistoryError, HistoryResult};
pub use index::SearchIndex;
pub use navigation::HistoryCursor;
pub use stats::AggregateStats;
pub use types::*;

use crate::config::{HistoryConfig, MatchConfig};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use tracing::{debug, info};

pub const SNAPSHOT_VERSION: u32 = 1;

/// 历史记录的持久化快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySnapshot {
    pub version: u32,
    pub entries: Vec<HistoryEntry>,
    pub statistics: AggregateStats,
    pub next_id: u64,
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries: Vec::new(),
            statistics: AggregateStats::default(),
            next_id: 1,
        }
    }
}

type SearchKey = (String, SearchOptions);

/// 命令历史存储
pub struct HistoryStore {
    /// 时间顺序，最旧在前
    entries: Vec<HistoryEntry>,
    index: SearchIndex,
    stats: AggregateStats,
    cursor: HistoryCursor,
    /// 只用 `peek` 读取，淘汰顺序即插入顺序
    cache: LruCache<SearchKey, Vec<HistoryEntry>>,
    next_id: u64,
    config: HistoryConfig,
    matching: MatchConfig,
    session_id: String,
}

impl HistoryStore {
    pub fn new(config: HistoryConfig, matching: MatchConfig, session_id: impl Into<String>) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Vec::new(),
            index: SearchIndex::new(),
            stats: AggregateStats::default(),
            cursor: HistoryCursor::new(),
            cache: LruCache::new(capacity),
            next_id: 1,
            config,
            matching,
            session_id: session_id.into(),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// 当前缓存的搜索结果数
    pub fn cached_searches(&self) -> usize {
        self.cache.len()
    }

    /// 追加一条命令
    ///
    /// 空命令、以及窗口期内与上一条完全相同的命令返回 `None`。
    pub fn add(
        &mut self,
        command: &str,
        metadata: ExecutionMetadata,
        now_ms: i64,
    ) -> Option<HistoryEntry> {
        let command = single_line_command(command);
        if command.is_empty() {
            return None;
        }

        if let Some(last) = self.entries.last() {
            if last.command == command
                && now_ms.saturating_sub(last.timestamp) < self.config.duplicate_window_ms
            {
                debug!(command = %command, "history.add.duplicate_skipped");
                return None;
            }
        }

        let entry = HistoryEntry::new(self.next_id, command, now_ms, self.session_id.clone())
            .with_metadata(metadata);
        self.next_id += 1;

        self.index.insert(&entry);
        self.stats.record(&entry);
        self.entries.push(entry.clone());
        self.trim_to_capacity();
        self.mutated();

        Some(entry)
    }

    /// 历史导航，返回游标处的记录；越过末尾返回 `None`
    pub fn navigate(
        &mut self,
        direction: NavigateDirection,
        filter: Option<&str>,
    ) -> Option<&HistoryEntry> {
        self.cursor.navigate(&self.entries, direction, filter)
    }

    /// 搜索历史
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> Vec<HistoryEntry> {
        let key = (query.to_string(), options.clone());
        if let Some(cached) = self.cache.peek(&key) {
            debug!(query = %query, "history.search.cache_hit");
            return cached.clone();
        }

        let request = search::SearchRequest {
            query,
            options,
            limit: options.limit.unwrap_or(self.config.default_search_limit),
            fuzzy_threshold: self.config.fuzzy_threshold,
            matching: &self.matching,
        };
        let results = search::run(&self.entries, &self.index, &request);
        debug!(
            query = %query,
            mode = ?options.mode,
            results = results.len(),
            "history.search.done"
        );

        self.cache.put(key, results.clone());
        results
    }

    pub fn statistics(&self) -> HistoryStatistics {
        stats::summarize(&self.stats, &self.entries, &self.session_id)
    }

    pub fn aggregate(&self) -> &AggregateStats {
        &self.stats
    }

    /// 导出历史
    pub fn export(
        &self,
        format: ExportFormat,
        options: &ExportOptions,
        now_ms: i64,
    ) -> HistoryResult<String> {
        let mut selected: Vec<&HistoryEntry> = self
            .entries
            .iter()
            .filter(|entry| {
                options
                    .time_range
                    .map_or(true, |range| range.contains(entry.timestamp))
            })
            .collect();

        if let Some(limit) = options.limit {
            let skip = selected.len().saturating_sub(limit);
            selected.drain(..skip);
        }

        let output = export::export_entries(&selected, format, options.include_metadata, now_ms)?;
        info!(format = %format, entries = selected.len(), "history.export.completed");
        Ok(output)
    }

    /// 导入历史
    ///
    /// 合并模式只追加 id 不存在的记录；替换模式清空现有记录。
    pub fn import(
        &mut self,
        data: &str,
        format: ExportFormat,
        options: ImportOptions,
    ) -> HistoryResult<ImportReport> {
        let parsed = export::parse_import(data, format)?;
        let mut report = ImportReport {
            skipped_count: parsed.skipped,
            total_count: parsed.total,
            ..ImportReport::default()
        };

        if !options.merge {
            self.entries.clear();
            self.stats = AggregateStats::default();
        }

        let mut known_ids: HashSet<u64> = self.entries.iter().map(|entry| entry.id).collect();
        for record in parsed.records {
            let id = match record.id {
                Some(id) if known_ids.contains(&id) => {
                    if options.merge {
                        report.duplicate_count += 1;
                        continue;
                    }
                    self.allocate_id()
                }
                Some(id) => {
                    self.next_id = self.next_id.max(id.saturating_add(1));
                    id
                }
                None => self.allocate_id(),
            };
            known_ids.insert(id);

            let entry = record.into_entry(id);
            self.stats.record(&entry);
            self.entries.push(entry);
            report.imported_count += 1;
        }

        self.entries
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        self.trim_to_capacity();
        self.index.rebuild(&self.entries);
        self.mutated();

        info!(
            format = %format,
            merge = options.merge,
            imported = report.imported_count,
            skipped = report.skipped_count,
            duplicates = report.duplicate_count,
            "history.import.completed"
        );
        Ok(report)
    }

    /// 清空历史和统计
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.stats = AggregateStats::default();
        self.mutated();
        info!("history.cleared");
    }

    /// 丢弃最旧的一半记录，返回丢弃条数
    pub fn evict_oldest_half(&mut self) -> usize {
        let count = self.entries.len().div_ceil(2);
        if count == 0 {
            return 0;
        }
        self.entries.drain(..count);
        self.index.rebuild(&self.entries);
        self.mutated();
        count
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            version: SNAPSHOT_VERSION,
            entries: self.entries.clone(),
            statistics: self.stats.clone(),
            next_id: self.next_id,
        }
    }

    /// 用快照替换当前状态
    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        let mut seen = HashSet::new();
        self.entries = snapshot
            .entries
            .into_iter()
            .filter(|entry| !entry.command.trim().is_empty() && seen.insert(entry.id))
            .collect();
        self.entries
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        let max_id = self.entries.iter().map(|entry| entry.id).max().unwrap_or(0);
        self.next_id = snapshot.next_id.max(max_id + 1);

        self.stats = if snapshot.statistics.total_commands < self.entries.len() as u64 {
            AggregateStats::from_entries(&self.entries)
        } else {
            snapshot.statistics
        };

        self.trim_to_capacity();
        self.index.rebuild(&self.entries);
        self.mutated();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 超出容量时从头部裁剪，并重建索引
    fn trim_to_capacity(&mut self) {
        let excess = self
            .entries
            .len()
            .saturating_sub(self.config.max_history_size);
        if excess > 0 {
            self.entries.drain(..excess);
            self.index.rebuild(&self.entries);
            debug!(removed = excess, "history.trimmed");
        }
    }

    /// 任何修改都会清空搜索缓存并把导航游标放回末尾
    fn mutated(&mut self) {
        self.cache.clear();
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HistoryStore {
        HistoryStore::new(HistoryConfig::default(), MatchConfig::default(), "session")
    }

    fn ok() -> ExecutionMetadata {
        ExecutionMetadata::success(1.0)
    }

    #[test]
    fn add_rejects_blank_and_trims() {
        let mut history = store();
        assert!(history.add("   ", ok(), 1000).is_none());

        let entry = history.add("  help  ", ok(), 1000).unwrap();
        assert_eq!(entry.command, "help");
        assert_eq!(entry.id, 1);
        assert_eq!(entry.session_id, "session");
    }

    #[test]
    fn add_joins_multiline_commands() {
        let mut history = store();
        assert!(history.add("\n \r\n", ok(), 1000).is_none());

        let entry = history.add(" echo a\r\n  b \n", ok(), 1000).unwrap();
        assert_eq!(entry.command, "echo a b");
        assert!(history.add("echo a b", ok(), 1200).is_none());
    }

    #[test]
    fn duplicate_window() {
        let mut history = store();
        history.add("help", ok(), 1000).unwrap();
        assert!(history.add("help", ok(), 1500).is_none());
        assert_eq!(history.len(), 1);

        assert!(history.add("help", ok(), 2000).is_some());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn trimming_rebuilds_index() {
        let config = HistoryConfig {
            max_history_size: 3,
            ..HistoryConfig::default()
        };
        let mut history = HistoryStore::new(config, MatchConfig::default(), "s");
        for i in 0..4 {
            history.add(&format!("cmd{i}"), ok(), 1000 * (i + 1)).unwrap();
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.entries()[0].command, "cmd1");
        assert!(!history.index().references(1));
        assert!(history.index().lookup("cmd0").is_none());
        assert_eq!(history.aggregate().total_commands, 4);
    }

    #[test]
    fn search_cache_invalidated_on_add() {
        let mut history = store();
        history.add("help", ok(), 1000);
        let options = SearchOptions::new(SearchMode::Contains);

        assert_eq!(history.search("he", &options).len(), 1);
        assert_eq!(history.cached_searches(), 1);
        assert_eq!(history.search("he", &options).len(), 1);
        assert_eq!(history.cached_searches(), 1);

        history.add("health", ok(), 3000);
        assert_eq!(history.cached_searches(), 0);
        assert_eq!(history.search("he", &options).len(), 2);
    }

    #[test]
    fn cache_evicts_oldest_inserted() {
        let config = HistoryConfig {
            cache_capacity: 2,
            ..HistoryConfig::default()
        };
        let mut history = HistoryStore::new(config, MatchConfig::default(), "s");
        history.add("help", ok(), 1000);
        let options = SearchOptions::default();

        history.search("a", &options);
        history.search("b", &options);
        // 读取不改变淘汰顺序
        history.search("a", &options);
        history.search("c", &options);

        assert_eq!(history.cached_searches(), 2);
        assert!(history.cache.peek(&("a".to_string(), options.clone())).is_none());
        assert!(history.cache.peek(&("b".to_string(), options.clone())).is_some());
    }

    #[test]
    fn options_are_part_of_cache_key() {
        let mut history = store();
        history.add("echo a", ok(), 1000);
        history.add("echo b", ExecutionMetadata::failure("x", 1.0), 3000);

        let all = SearchOptions::new(SearchMode::Contains);
        let failed = all.clone().with_success(false);
        assert_eq!(history.search("echo", &all).len(), 2);
        assert_eq!(history.search("echo", &failed).len(), 1);
    }

    #[test]
    fn navigation_resets_after_add() {
        let mut history = store();
        history.add("a", ok(), 1000);
        history.add("b", ok(), 3000);

        assert_eq!(
            history.navigate(NavigateDirection::Up, None).map(|e| e.command.clone()),
            Some("b".to_string())
        );
        assert_eq!(
            history.navigate(NavigateDirection::Up, None).map(|e| e.command.clone()),
            Some("a".to_string())
        );

        history.add("c", ok(), 5000);
        assert_eq!(
            history.navigate(NavigateDirection::Up, None).map(|e| e.command.clone()),
            Some("c".to_string())
        );
    }

    #[test]
    fn merge_import_appends_new_ids_only() {
        let mut history = store();
        history.add("help", ok(), 1000);

        let data = r#"[
            {"id": 1, "command": "help", "timestamp": 1000},
            {"id": 7, "command": "echo hi", "timestamp": 500},
            {"command": "clear", "timestamp": 2000}
        ]"#;
        let report = history
            .import(data, ExportFormat::Json, ImportOptions { merge: true })
            .unwrap();

        assert_eq!(report.imported_count, 2);
        assert_eq!(report.duplicate_count, 1);
        assert_eq!(report.total_count, 3);

        let commands: Vec<_> = history.entries().iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, vec!["echo hi", "help", "clear"]);
        assert_eq!(history.entries()[2].id, 8);
    }

    #[test]
    fn replace_import_resets_statistics() {
        let mut history = store();
        history.add("help", ok(), 1000);
        history.add("help me", ok(), 3000);

        let data = r#"{"entries": [{"command": "echo", "timestamp": 10, "success": false}]}"#;
        let report = history
            .import(data, ExportFormat::Json, ImportOptions { merge: false })
            .unwrap();

        assert_eq!(report.imported_count, 1);
        assert_eq!(history.len(), 1);
        let stats = history.statistics();
        assert_eq!(stats.total_commands, 1);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[test]
    fn failed_import_leaves_history_untouched() {
        let mut history = store();
        history.add("help", ok(), 1000);
        assert!(history
            .import("{broken", ExportFormat::Json, ImportOptions { merge: false })
            .is_err());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn export_respects_limit_and_range() {
        let mut history = store();
        for (i, command) in ["a", "b", "c"].iter().enumerate() {
            history.add(command, ok(), 1_700_000_000_000 + i as i64 * 2000);
        }

        let options = ExportOptions {
            limit: Some(2),
            ..ExportOptions::default()
        };
        let text = history.export(ExportFormat::Text, &options, 0).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("] c"));

        let options = ExportOptions {
            time_range: Some(TimeRange::new(1_700_000_000_000, 1_700_000_000_000)),
            ..ExportOptions::default()
        };
        let text = history.export(ExportFormat::Text, &options, 0).unwrap();
        assert!(text.ends_with("] a"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut history = store();
        history.add("help", ok(), 1000);
        history.add("echo x", ExecutionMetadata::failure("bad", 2.0), 3000);

        let json = serde_json::to_string(&history.snapshot()).unwrap();
        assert!(json.contains("nextId"));

        let mut restored = store();
        restored.restore(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.aggregate().total_commands, 2);
        assert!(restored.index().references(2));
        assert_eq!(restored.add("new", ok(), 9000).unwrap().id, 3);
    }

    #[test]
    fn evict_oldest_half() {
        let mut history = store();
        for i in 0..5 {
            history.add(&format!("c{i}"), ok(), 1000 * (i + 1) * 2);
        }
        assert_eq!(history.evict_oldest_half(), 3);
        assert_eq!(history.entries()[0].command, "c3");
        assert!(!history.index().references(1));
    }
}

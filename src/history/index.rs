//! 历史记录倒排索引
//!
//! 小写空白分词 → 包含该词的记录 id 集合

use super::types::HistoryEntry;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    tokens: HashMap<String, HashSet<u64>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据全部记录重建
    pub fn rebuild<'a>(&mut self, entries: impl IntoIterator<Item = &'a HistoryEntry>) {
        self.tokens.clear();
        for entry in entries {
            self.insert(entry);
        }
    }

    /// 增量加入一条记录
    pub fn insert(&mut self, entry: &HistoryEntry) {
        for token in tokenize(&entry.command) {
            self.tokens.entry(token).or_default().insert(entry.id);
        }
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// 包含某个完整 token 的记录
    pub fn lookup(&self, token: &str) -> Option<&HashSet<u64>> {
        self.tokens.get(&token.to_lowercase())
    }

    /// 查询中每个 token 都完整出现的记录；查询无 token 时返回 `None`
    pub fn exact_candidates(&self, query: &str) -> Option<HashSet<u64>> {
        let mut result: Option<HashSet<u64>> = None;
        for token in tokenize(query) {
            let ids = self.tokens.get(&token).cloned().unwrap_or_default();
            result = Some(match result {
                Some(current) => current.intersection(&ids).copied().collect(),
                None => ids,
            });
        }
        result
    }

    /// 至少有一个 token 包含查询子串的记录
    ///
    /// 只适用于不含空白的查询；含空白的查询可能跨 token 命中，返回 `None`。
    pub fn contains_candidates(&self, query: &str) -> Option<HashSet<u64>> {
        let needle = query.to_lowercase();
        if needle.is_empty() || needle.chars().any(char::is_whitespace) {
            return None;
        }

        Some(
            self.tokens
                .iter()
                .filter(|(token, _)| token.contains(&needle))
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect(),
        )
    }

    /// 是否还有任何 token 指向该 id
    pub fn references(&self, id: u64) -> bool {
        self.tokens.values().any(|ids| ids.contains(&id))
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, command: &str) -> HistoryEntry {
        HistoryEntry::new(id, command, id as i64, "s")
    }

    #[test]
    fn insert_and_lookup() {
        let mut index = SearchIndex::new();
        index.insert(&entry(1, "Config.Get player"));
        index.insert(&entry(2, "config.get level"));

        assert_eq!(index.lookup("config.get").map(HashSet::len), Some(2));
        assert_eq!(index.lookup("PLAYER").map(HashSet::len), Some(1));
        assert!(index.lookup("missing").is_none());
    }

    #[test]
    fn exact_candidates_intersect_tokens() {
        let mut index = SearchIndex::new();
        index.insert(&entry(1, "set speed 10"));
        index.insert(&entry(2, "set volume 10"));

        let ids = index.exact_candidates("set 10").unwrap();
        assert_eq!(ids.len(), 2);
        let ids = index.exact_candidates("speed 10").unwrap();
        assert_eq!(ids, HashSet::from([1]));
        assert!(index.exact_candidates("  ").is_none());
    }

    #[test]
    fn contains_candidates_scan_tokens() {
        let mut index = SearchIndex::new();
        index.insert(&entry(1, "history.search config"));
        index.insert(&entry(2, "help"));

        assert_eq!(index.contains_candidates("CONF"), Some(HashSet::from([1])));
        assert_eq!(index.contains_candidates("h config"), None);
    }

    #[test]
    fn rebuild_drops_stale_ids() {
        let mut index = SearchIndex::new();
        let first = entry(1, "echo a");
        let second = entry(2, "echo b");
        index.insert(&first);
        index.insert(&second);

        index.rebuild([&second]);
        assert!(!index.references(1));
        assert!(index.references(2));
        assert_eq!(index.token_count(), 2);
    }
}

//! 历史导航游标
//!
//! 单个游标遍历（可按前缀过滤的）历史序列。游标等于序列长度时表示空白行。

use super::types::{HistoryEntry, NavigateDirection};

#[derive(Debug, Clone, Default)]
pub struct HistoryCursor {
    /// None 表示停在末尾（空白行）
    position: Option<usize>,
    filter: Option<String>,
}

impl HistoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 回到末尾
    pub fn reset(&mut self) {
        self.position = None;
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn navigate<'a>(
        &mut self,
        entries: &'a [HistoryEntry],
        direction: NavigateDirection,
        filter: Option<&str>,
    ) -> Option<&'a HistoryEntry> {
        let filter = filter.filter(|f| !f.is_empty());
        if self.filter.as_deref() != filter {
            self.filter = filter.map(str::to_string);
            self.position = None;
        }

        let needle = self.filter.as_ref().map(|f| f.to_lowercase());
        let visible: Vec<&HistoryEntry> = entries
            .iter()
            .filter(|entry| {
                needle
                    .as_deref()
                    .map_or(true, |n| entry.command.to_lowercase().starts_with(n))
            })
            .collect();

        let len = visible.len();
        let current = self.position.unwrap_or(len).min(len);
        let next = match direction {
            NavigateDirection::Up => current.saturating_sub(1),
            NavigateDirection::Down => (current + 1).min(len),
            NavigateDirection::First => 0,
            NavigateDirection::Last => len.saturating_sub(1),
        };

        if next >= len {
            self.position = None;
            return None;
        }
        self.position = Some(next);
        visible.get(next).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(commands: &[&str]) -> Vec<HistoryEntry> {
        commands
            .iter()
            .enumerate()
            .map(|(i, c)| HistoryEntry::new(i as u64 + 1, *c, i as i64, "s"))
            .collect()
    }

    fn command(entry: Option<&HistoryEntry>) -> Option<&str> {
        entry.map(|e| e.command.as_str())
    }

    #[test]
    fn up_stops_at_oldest() {
        let list = entries(&["a", "b", "c"]);
        let mut cursor = HistoryCursor::new();

        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Up, None)), Some("c"));
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Up, None)), Some("b"));
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Up, None)), Some("a"));
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Up, None)), Some("a"));
    }

    #[test]
    fn down_past_end_is_blank() {
        let list = entries(&["a", "b"]);
        let mut cursor = HistoryCursor::new();

        cursor.navigate(&list, NavigateDirection::First, None);
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Down, None)), Some("b"));
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Down, None)), None);
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Down, None)), None);
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Up, None)), Some("b"));
    }

    #[test]
    fn first_and_last() {
        let list = entries(&["a", "b", "c"]);
        let mut cursor = HistoryCursor::new();
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::First, None)), Some("a"));
        assert_eq!(command(cursor.navigate(&list, NavigateDirection::Last, None)), Some("c"));
    }

    #[test]
    fn filter_change_resets_cursor() {
        let list = entries(&["echo 1", "help", "echo 2"]);
        let mut cursor = HistoryCursor::new();

        cursor.navigate(&list, NavigateDirection::First, None);
        assert_eq!(
            command(cursor.navigate(&list, NavigateDirection::Up, Some("ECHO"))),
            Some("echo 2")
        );
        assert_eq!(
            command(cursor.navigate(&list, NavigateDirection::Up, Some("echo"))),
            Some("echo 2")
        );
        assert_eq!(cursor.filter(), Some("echo"));
    }

    #[test]
    fn empty_history() {
        let mut cursor = HistoryCursor::new();
        assert!(cursor.navigate(&[], NavigateDirection::Up, None).is_none());
        assert!(cursor.navigate(&[], NavigateDirection::Last, None).is_none());
    }
}

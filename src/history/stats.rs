//! 历史统计
//!
//! 累计计数随每次追加增量更新并持久化；裁剪不会减少累计值。

use super::types::{CommandCount, HistoryEntry, HistoryStatistics, SessionInfo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const TOP_COMMANDS: usize = 10;

/// 累计统计，随快照持久化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateStats {
    pub total_commands: u64,
    pub successful_commands: u64,
    pub total_execution_time_ms: f64,
    /// 命令名 → 次数
    pub command_counts: HashMap<String, u64>,
}

impl AggregateStats {
    pub fn record(&mut self, entry: &HistoryEntry) {
        self.total_commands += 1;
        if entry.success {
            self.successful_commands += 1;
        }
        self.total_execution_time_ms += entry.execution_time_ms;
        *self
            .command_counts
            .entry(entry.command_name().to_string())
            .or_default() += 1;
    }

    /// 从记录重新计算
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            stats.record(entry);
        }
        stats
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_commands == 0 {
            0.0
        } else {
            self.successful_commands as f64 / self.total_commands as f64
        }
    }

    pub fn average_execution_time(&self) -> f64 {
        if self.total_commands == 0 {
            0.0
        } else {
            self.total_execution_time_ms / self.total_commands as f64
        }
    }

    pub fn top_commands(&self, limit: usize) -> Vec<CommandCount> {
        let mut commands: Vec<CommandCount> = self
            .command_counts
            .iter()
            .map(|(command, count)| CommandCount {
                command: command.clone(),
                count: *count,
            })
            .collect();
        commands.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.command.cmp(&b.command)));
        commands.truncate(limit);
        commands
    }
}

/// 汇总累计统计和当前保存的记录
pub fn summarize(
    aggregate: &AggregateStats,
    entries: &[HistoryEntry],
    session_id: &str,
) -> HistoryStatistics {
    let session_entries: Vec<&HistoryEntry> = entries
        .iter()
        .filter(|entry| entry.session_id == session_id)
        .collect();

    let average_command_length = if entries.is_empty() {
        0.0
    } else {
        entries
            .iter()
            .map(|entry| entry.command.chars().count())
            .sum::<usize>() as f64
            / entries.len() as f64
    };

    let error_commands: BTreeSet<String> = entries
        .iter()
        .filter(|entry| !entry.success)
        .map(|entry| entry.command_name().to_string())
        .collect();

    HistoryStatistics {
        total_commands: aggregate.total_commands,
        success_rate: aggregate.success_rate(),
        top_commands: aggregate.top_commands(TOP_COMMANDS),
        average_execution_time: aggregate.average_execution_time(),
        session_commands: session_entries.len(),
        average_command_length,
        history_size: entries.len(),
        error_commands: error_commands.into_iter().collect(),
        current_session: SessionInfo {
            session_id: session_id.to_string(),
            command_count: session_entries.len(),
            total_execution_time_ms: session_entries
                .iter()
                .map(|entry| entry.execution_time_ms)
                .sum(),
        },
    }
}

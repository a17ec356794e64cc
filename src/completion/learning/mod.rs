//! Completion learning: usage frequency model.
//!
//! 设计目标：
//! - 每次命令执行都更新使用次数、参数模式和最近命令
//! - 状态可以整体导出为快照，由持久化层保存和恢复
//! - 学习步骤不向调用方暴露任何失败

use crate::completion::command_line::pattern_key;
use crate::config::DEFAULT_RECENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// 学习模型的持久化快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningSnapshot {
    pub usage_counts: HashMap<String, u64>,
    /// 键为 `name` 或 `name arg1 arg2 ...`：无参数时只有命令名，
    /// 否则命令名与参数以单个空格连接
    pub pattern_counts: HashMap<String, u64>,
    /// 最新在前
    pub recent_commands: Vec<String>,
    pub failure_counts: HashMap<String, u64>,
}

/// 使用频率模型
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    usage_counts: HashMap<String, u64>,
    pattern_counts: HashMap<String, u64>,
    recent_commands: VecDeque<String>,
    failure_counts: HashMap<String, u64>,
    recent_capacity: usize,
}

impl Default for FrequencyModel {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl FrequencyModel {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            usage_counts: HashMap::new(),
            pattern_counts: HashMap::new(),
            recent_commands: VecDeque::new(),
            failure_counts: HashMap::new(),
            recent_capacity: recent_capacity.max(1),
        }
    }

    /// 记录一次命令执行
    pub fn learn(&mut self, command: &str, args: &[String], success: bool) {
        if command.is_empty() {
            return;
        }

        *self.usage_counts.entry(command.to_string()).or_default() += 1;

        if let Some(position) = self.recent_commands.iter().position(|c| c == command) {
            self.recent_commands.remove(position);
        }
        self.recent_commands.push_front(command.to_string());
        self.recent_commands.truncate(self.recent_capacity);

        *self
            .pattern_counts
            .entry(pattern_key(command, args))
            .or_default() += 1;

        if !success {
            *self.failure_counts.entry(command.to_string()).or_default() += 1;
        }
    }

    pub fn usage_count(&self, command: &str) -> u64 {
        self.usage_counts.get(command).copied().unwrap_or(0)
    }

    pub fn pattern_count(&self, pattern: &str) -> u64 {
        self.pattern_counts.get(pattern).copied().unwrap_or(0)
    }

    pub fn failure_count(&self, command: &str) -> u64 {
        self.failure_counts.get(command).copied().unwrap_or(0)
    }

    pub fn is_recent(&self, command: &str) -> bool {
        self.recent_commands.iter().any(|c| c == command)
    }

    /// 最近命令，最新在前
    pub fn recent_commands(&self) -> impl Iterator<Item = &str> {
        self.recent_commands.iter().map(String::as_str)
    }

    /// 使用次数最多的命令，次数相同时按名称排序
    pub fn popular_commands(&self, limit: usize) -> Vec<(String, u64)> {
        let mut commands: Vec<(String, u64)> = self
            .usage_counts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        commands.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        commands.truncate(limit);
        commands
    }

    /// 执行失败过的命令名
    pub fn failed_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .failure_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// 从参数模式中推导某个命令第 `arg_index` 个参数用过的值，按次数降序
    pub fn argument_values(&self, command: &str, arg_index: usize) -> Vec<(String, u64)> {
        let mut values: HashMap<&str, u64> = HashMap::new();

        for (pattern, count) in &self.pattern_counts {
            let mut tokens = pattern.split(' ');
            if tokens.next() != Some(command) {
                continue;
            }
            if let Some(value) = tokens.nth(arg_index).filter(|v| !v.is_empty()) {
                *values.entry(value).or_default() += count;
            }
        }

        let mut values: Vec<(String, u64)> = values
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        values
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        LearningSnapshot {
            usage_counts: self.usage_counts.clone(),
            pattern_counts: self.pattern_counts.clone(),
            recent_commands: self.recent_commands.iter().cloned().collect(),
            failure_counts: self.failure_counts.clone(),
        }
    }

    /// 用快照替换当前状态
    pub fn restore(&mut self, snapshot: LearningSnapshot) {
        self.usage_counts = snapshot.usage_counts;
        self.pattern_counts = snapshot.pattern_counts;
        self.failure_counts = snapshot.failure_counts;

        self.recent_commands.clear();
        for command in snapshot.recent_commands {
            if !command.is_empty() && !self.recent_commands.contains(&command) {
                self.recent_commands.push_back(command);
            }
        }
        self.recent_commands.truncate(self.recent_capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.usage_counts.is_empty()
    }
}

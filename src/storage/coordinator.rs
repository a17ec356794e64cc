//! 持久化协调器
//!
//! 负责历史快照和学习快照的读写：
//! - 读取容错：缺失返回 `None`，损坏记录警告后返回 `None`
//! - 写入去抖：`tick` 在间隔到期且有脏数据时刷新
//! - 配额超限时淘汰一半最旧的历史后重试一次，仍失败则本会话只保留内存状态

use super::error::StorageResult;
use super::store::PersistenceStore;
use crate::completion::learning::{FrequencyModel, LearningSnapshot};
use crate::config::PersistenceConfig;
use crate::history::{HistorySnapshot, HistoryStore};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PersistenceCoordinator {
    store: Arc<dyn PersistenceStore>,
    history_key: String,
    learning_key: String,
    flush_interval_ms: i64,
    last_flush_ms: i64,
    history_dirty: bool,
    learning_dirty: bool,
    disabled: bool,
}

impl PersistenceCoordinator {
    pub fn new(store: Arc<dyn PersistenceStore>, config: &PersistenceConfig, now_ms: i64) -> Self {
        Self {
            store,
            history_key: config.history_key.clone(),
            learning_key: config.learning_key.clone(),
            flush_interval_ms: config.flush_interval_ms,
            last_flush_ms: now_ms,
            history_dirty: false,
            learning_dirty: false,
            disabled: !config.enabled,
        }
    }

    /// 是否仍在写入存储
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn is_dirty(&self) -> bool {
        self.history_dirty || self.learning_dirty
    }

    pub fn mark_history_dirty(&mut self) {
        self.history_dirty = true;
    }

    pub fn mark_learning_dirty(&mut self) {
        self.learning_dirty = true;
    }

    pub fn load_history(&self) -> Option<HistorySnapshot> {
        self.load_json(&self.history_key)
    }

    pub fn load_learning(&self) -> Option<LearningSnapshot> {
        self.load_json(&self.learning_key)
    }

    /// 间隔到期时刷新，返回是否执行了写入
    pub fn tick(&mut self, now_ms: i64, history: &mut HistoryStore, model: &FrequencyModel) -> bool {
        if self.disabled || !self.is_dirty() {
            return false;
        }
        if now_ms.saturating_sub(self.last_flush_ms) < self.flush_interval_ms {
            return false;
        }
        self.flush(now_ms, history, model)
    }

    /// 立即写入脏快照
    ///
    /// 返回 `false` 表示持久化已停用或本次写入失败。
    pub fn flush(&mut self, now_ms: i64, history: &mut HistoryStore, model: &FrequencyModel) -> bool {
        if self.disabled {
            return false;
        }
        if !self.is_dirty() {
            self.last_flush_ms = now_ms;
            return true;
        }

        match self.write_dirty(history, model) {
            Ok(()) => {
                self.history_dirty = false;
                self.learning_dirty = false;
                self.last_flush_ms = now_ms;
                info!(entries = history.len(), "storage.flush.completed");
                true
            }
            Err(err) => {
                warn!(error = %err, "storage.flush.failed_memory_only");
                self.disabled = true;
                false
            }
        }
    }

    fn write_dirty(&self, history: &mut HistoryStore, model: &FrequencyModel) -> StorageResult<()> {
        if self.history_dirty {
            self.write_history(history)?;
        }
        if self.learning_dirty {
            self.write_learning(history, model)?;
        }
        Ok(())
    }

    fn write_history(&self, history: &mut HistoryStore) -> StorageResult<()> {
        let payload = serde_json::to_string(&history.snapshot())?;
        match self.store.save(&self.history_key, &payload) {
            Err(err) if err.is_quota_exceeded() => {
                self.evict(history, &err.to_string());
                let payload = serde_json::to_string(&history.snapshot())?;
                self.store.save(&self.history_key, &payload)
            }
            other => other,
        }
    }

    fn write_learning(&self, history: &mut HistoryStore, model: &FrequencyModel) -> StorageResult<()> {
        let payload = serde_json::to_string(&model.snapshot())?;
        match self.store.save(&self.learning_key, &payload) {
            Err(err) if err.is_quota_exceeded() => {
                // 学习快照很小，腾出空间只能靠历史
                self.evict(history, &err.to_string());
                let snapshot = serde_json::to_string(&history.snapshot())?;
                self.store.save(&self.history_key, &snapshot)?;
                self.store.save(&self.learning_key, &payload)
            }
            other => other,
        }
    }

    fn evict(&self, history: &mut HistoryStore, reason: &str) {
        let evicted = history.evict_oldest_half();
        warn!(evicted, remaining = history.len(), reason = %reason, "storage.quota.evicted");
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "storage.load.missing");
                return None;
            }
            Err(err) => {
                warn!(key = %key, error = %err, "storage.load.failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                info!(key = %key, bytes = raw.len(), "storage.load.completed");
                Some(value)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "storage.load.corrupt");
                None
            }
        }
    }
}

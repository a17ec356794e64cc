//! 控制台引擎
//!
//! 对 UI 层暴露的唯一入口，组合补全引擎、历史存储、学习模型和持久化：
//! - 查询路径（建议、搜索、统计）同步且不写存储
//! - 变更路径（记录命令、导入、清空）标记脏数据，由 `tick` 去抖刷新

use crate::completion::command_line::{normalize_command_line, parse_command_line};
use crate::completion::providers::CandidateSources;
use crate::completion::{CommandCatalog, CompletionEngine, FrequencyModel, Suggestion};
use crate::config::{CompletionConfig, ConfigResult, EngineConfig};
use crate::history::{
    ExecutionMetadata, ExportFormat, ExportOptions, HistoryEntry, HistoryResult,
    HistoryStatistics, HistoryStore, ImportOptions, ImportReport, NavigateDirection,
    SearchOptions,
};
use crate::storage::{PersistenceCoordinator, PersistenceStore};
use crate::utils::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ConsoleEngine {
    config: EngineConfig,
    catalog: Arc<dyn CommandCatalog>,
    completion: CompletionEngine,
    history: HistoryStore,
    model: FrequencyModel,
    variables: BTreeMap<String, String>,
    persistence: PersistenceCoordinator,
    clock: Arc<dyn Clock>,
}

impl ConsoleEngine {
    /// 创建引擎并从存储恢复历史和学习状态
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn CommandCatalog>,
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn Clock>,
    ) -> ConfigResult<Self> {
        Self::with_session(config, catalog, store, clock, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_session(
        config: EngineConfig,
        catalog: Arc<dyn CommandCatalog>,
        store: Arc<dyn PersistenceStore>,
        clock: Arc<dyn Clock>,
        session_id: impl Into<String>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let now = clock.now_ms();
        let persistence = PersistenceCoordinator::new(store, &config.persistence, now);

        let mut history =
            HistoryStore::new(config.history.clone(), config.matching.clone(), session_id);
        if let Some(snapshot) = persistence.load_history() {
            history.restore(snapshot);
        }

        let mut model = FrequencyModel::new(config.learning.recent_capacity);
        if let Some(snapshot) = persistence.load_learning() {
            model.restore(snapshot);
        }

        info!(
            session = %history.session_id(),
            history_entries = history.len(),
            commands = catalog.list_commands().len(),
            "console.engine.initialized"
        );

        Ok(Self {
            completion: CompletionEngine::new(config.completion.clone()),
            config,
            catalog,
            history,
            model,
            variables: BTreeMap::new(),
            persistence,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        self.history.session_id()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn model(&self) -> &FrequencyModel {
        &self.model
    }

    pub fn catalog(&self) -> &dyn CommandCatalog {
        self.catalog.as_ref()
    }

    pub fn is_persistence_enabled(&self) -> bool {
        self.persistence.is_enabled()
    }

    /// 获取补全建议，`cursor_position` 按字符计
    pub fn get_suggestions(&self, partial_input: &str, cursor_position: usize) -> Vec<Suggestion> {
        let sources = CandidateSources {
            catalog: self.catalog.as_ref(),
            history: self.history.entries(),
            model: &self.model,
            variables: &self.variables,
            config: self.completion.config(),
        };
        self.completion
            .suggest(partial_input, cursor_position, &sources)
    }

    /// 记录一条已执行的命令
    ///
    /// 写入历史并更新学习模型；空输入或去抖窗口内的重复命令返回 `None`。
    pub fn record_command(
        &mut self,
        raw_input: &str,
        metadata: ExecutionMetadata,
    ) -> Option<HistoryEntry> {
        let line = normalize_command_line(raw_input)?;
        let success = metadata.success;
        let entry = self.history.add(&line, metadata, self.clock.now_ms())?;

        if let Some(parsed) = parse_command_line(&line) {
            let name = self
                .catalog
                .resolve_alias(&parsed.name)
                .unwrap_or(parsed.name);
            self.model.learn(&name, &parsed.args, success);
            self.persistence.mark_learning_dirty();
            debug!(command = %name, success, "console.command.recorded");
        }

        self.persistence.mark_history_dirty();
        self.tick();
        Some(entry)
    }

    pub fn navigate_history(
        &mut self,
        direction: NavigateDirection,
        filter: Option<&str>,
    ) -> Option<String> {
        self.history
            .navigate(direction, filter)
            .map(|entry| entry.command.clone())
    }

    pub fn search_history(&mut self, query: &str, options: &SearchOptions) -> Vec<HistoryEntry> {
        self.history.search(query, options)
    }

    pub fn get_statistics(&self) -> HistoryStatistics {
        self.history.statistics()
    }

    pub fn export_history(
        &self,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> HistoryResult<String> {
        self.history.export(format, options, self.clock.now_ms())
    }

    pub fn import_history(
        &mut self,
        data: &str,
        format: ExportFormat,
        options: ImportOptions,
    ) -> HistoryResult<ImportReport> {
        let report = self.history.import(data, format, options)?;
        self.persistence.mark_history_dirty();
        self.tick();
        Ok(report)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persistence.mark_history_dirty();
        self.tick();
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// 运行时更新补全设置
    pub fn update_completion_settings(&mut self, settings: CompletionConfig) -> ConfigResult<()> {
        self.completion.update_config(settings.clone())?;
        self.config.completion = settings;
        Ok(())
    }

    /// 去抖刷新，返回是否写入了存储
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.persistence.tick(now, &mut self.history, &self.model)
    }

    /// 立即写入所有脏数据
    pub fn flush(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.persistence.flush(now, &mut self.history, &self.model)
    }

    /// 结束会话：最后一次刷新
    pub fn shutdown(mut self) -> bool {
        let flushed = self.flush();
        info!(session = %self.session_id(), flushed, "console.engine.shutdown");
        flushed
    }
}

impl Drop for ConsoleEngine {
    fn drop(&mut self) {
        if self.persistence.is_dirty() {
            self.flush();
        }
    }
}

//! Console Recall
//!
//! 开发者控制台的命令搜索、排序与学习引擎。
//! 主要功能包括：
//! - 基于上下文的命令补全与评分排序
//! - 带倒排索引的命令历史（搜索、导航、统计、导入导出）
//! - 使用频率学习与持久化

// 模块声明
pub mod completion; // 补全引擎与学习模型
pub mod config; // 引擎配置
pub mod console; // 对 UI 层暴露的控制台引擎
pub mod history; // 命令历史存储
pub mod storage; // 持久化存储
pub mod utils; // 工具和错误处理模块

pub use completion::{CommandCatalog, CommandDescriptor, CommandRegistry, Suggestion, SuggestionType};
pub use config::EngineConfig;
pub use console::ConsoleEngine;
pub use history::{
    ExecutionMetadata, ExportFormat, ExportOptions, HistoryEntry, ImportOptions,
    NavigateDirection, SearchMode, SearchOptions,
};
pub use storage::{FileStore, MemoryStore, PersistenceStore, QueuedStore};
pub use utils::{Clock, ManualClock, SystemClock};

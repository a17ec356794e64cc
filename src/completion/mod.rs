//! 补全功能模块
//!
//! 输入行 → 上下文分析 → 候选生成（命令目录、历史、学习模型） → 评分排序 → 建议列表

pub mod command_line;
pub mod context_analyzer;
pub mod engine;
pub mod error;
pub mod learning;
pub mod matching;
pub mod metadata;
pub mod providers;
pub mod scoring;
pub mod types;

pub use context_analyzer::ContextAnalyzer;
pub use engine::CompletionEngine;
pub use error::{CompletionError, CompletionResult};
pub use learning::{FrequencyModel, LearningSnapshot};
pub use metadata::{CommandCatalog, CommandDescriptor, CommandRegistry, ParameterKind, ParameterSpec};
pub use types::{ContextType, InputContext, Suggestion, SuggestionType};

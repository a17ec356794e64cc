/*!
 * 配置数据类型定义
 *
 * 结构与 TOML 配置文件保持一致：
 *
 * ```toml
 * [completion]
 * max_suggestions = 20
 *
 * [history]
 * max_history_size = 500
 * ```
 */

use super::defaults::*;
use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 引擎主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 补全配置 (对应 TOML 中的 [completion])
    pub completion: CompletionConfig,

    /// 历史配置 (对应 TOML 中的 [history])
    pub history: HistoryConfig,

    /// 学习模型配置 (对应 TOML 中的 [learning])
    pub learning: LearningConfig,

    /// 持久化配置 (对应 TOML 中的 [persistence])
    pub persistence: PersistenceConfig,

    /// 匹配策略配置 (对应 TOML 中的 [matching])
    pub matching: MatchConfig,
}

/// 补全配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    pub max_suggestions: usize,
    pub fuzzy_threshold: f64,
    pub fuzzy_min_query_length: usize,
    /// 是否建议隐藏命令
    pub include_hidden: bool,
    pub history_candidates: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            fuzzy_threshold: DEFAULT_COMPLETION_FUZZY_THRESHOLD,
            fuzzy_min_query_length: DEFAULT_FUZZY_MIN_QUERY_LENGTH,
            include_hidden: false,
            history_candidates: DEFAULT_HISTORY_CANDIDATES,
        }
    }
}

/// 历史配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_history_size: usize,
    pub duplicate_window_ms: i64,
    pub fuzzy_threshold: f64,
    pub cache_capacity: usize,
    pub default_search_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            duplicate_window_ms: DEFAULT_DUPLICATE_WINDOW_MS,
            fuzzy_threshold: DEFAULT_HISTORY_FUZZY_THRESHOLD,
            cache_capacity: DEFAULT_SEARCH_CACHE_CAPACITY,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// 学习模型配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LearningConfig {
    pub recent_capacity: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            recent_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}

/// 持久化配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub flush_interval_ms: i64,
    pub history_key: String,
    pub learning_key: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            learning_key: DEFAULT_LEARNING_KEY.to_string(),
        }
    }
}

/// 匹配策略配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    pub max_pattern_length: usize,
    pub regex_size_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_pattern_length: DEFAULT_MAX_PATTERN_LENGTH,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl EngineConfig {
    /// 从 TOML 文本解析配置并校验
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load(path: &Path) -> ConfigResult<Self> {
        debug!("加载引擎配置: {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read(path.to_path_buf(), e))?;
        Self::from_toml_str(&content)
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> ConfigResult<()> {
        self.completion.validate()?;
        self.history.validate()?;

        if self.learning.recent_capacity == 0 {
            return Err(ConfigError::validation(
                "learning.recent_capacity",
                "must be greater than 0",
            ));
        }
        if self.persistence.flush_interval_ms < 0 {
            return Err(ConfigError::validation(
                "persistence.flush_interval_ms",
                "must not be negative",
            ));
        }
        if self.persistence.history_key.is_empty() || self.persistence.learning_key.is_empty() {
            return Err(ConfigError::validation(
                "persistence.keys",
                "storage keys must not be empty",
            ));
        }
        if self.persistence.history_key == self.persistence.learning_key {
            return Err(ConfigError::validation(
                "persistence.keys",
                "history and learning keys must differ",
            ));
        }
        if self.matching.max_pattern_length == 0 {
            return Err(ConfigError::validation(
                "matching.max_pattern_length",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl CompletionConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=100).contains(&self.max_suggestions) {
            return Err(ConfigError::validation(
                "completion.max_suggestions",
                format!("expected 1..=100, got {}", self.max_suggestions),
            ));
        }
        validate_threshold("completion.fuzzy_threshold", self.fuzzy_threshold)
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_history_size == 0 {
            return Err(ConfigError::validation(
                "history.max_history_size",
                "must be greater than 0",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::validation(
                "history.cache_capacity",
                "must be greater than 0",
            ));
        }
        if self.duplicate_window_ms < 0 {
            return Err(ConfigError::validation(
                "history.duplicate_window_ms",
                "must not be negative",
            ));
        }
        validate_threshold("history.fuzzy_threshold", self.fuzzy_threshold)
    }
}

fn validate_threshold(field: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::validation(
            field,
            format!("expected 0.0..=1.0, got {value}"),
        ))
    }
}

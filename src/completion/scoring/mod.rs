//! 补全评分系统
//!
//! 提供统一的补全项评分机制，使评分逻辑可组合、可测试。
//!
//! # 架构
//!
//! ```text
//! ScoringContext (数据)
//!     ↓
//! ScoreCalculator (抽象)
//!     ↓
//! BaseMatchScorer / FrequencyScorer / CategoryScorer / RecencyScorer
//!     ↓
//! CompositeScorer (组合)
//! ```

pub mod calculator;
pub mod context;
pub mod scorers;

pub use calculator::ScoreCalculator;
pub use context::ScoringContext;
pub use scorers::{
    BaseMatchScorer, CategoryScorer, CompositeScorer, FrequencyScorer, RecencyScorer,
};

/// 前缀匹配基础分
pub const PREFIX_BASE: f64 = 100.0;

/// 子串匹配基础分，按命中位置递减
pub const SUBSTRING_BASE: f64 = 50.0;

/// 模糊匹配比例系数
pub const FUZZY_WEIGHT: f64 = 30.0;

/// 每次使用的频率加分
pub const FREQUENCY_WEIGHT: f64 = 2.0;

/// 频率加分上限
pub const FREQUENCY_CAP: f64 = 20.0;

/// 最近使用过的命令加分
pub const RECENCY_BONUS: f64 = 15.0;

/// 单项分数不为负
#[inline]
pub fn clamp_score(score: f64) -> f64 {
    score.max(0.0)
}

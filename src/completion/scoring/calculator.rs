//! 评分计算器接口
//!
//! 定义统一的评分接口，支持不同的评分策略

use super::context::ScoringContext;

/// 评分计算器
///
/// 所有评分器都实现此 trait，保持一致的接口
pub trait ScoreCalculator: Send + Sync {
    /// 计算给定上下文的分数
    fn calculate(&self, context: &ScoringContext) -> f64;

    /// 评分器名称（用于调试和日志）
    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// 允许使用闭包作为评分器
impl<F> ScoreCalculator for F
where
    F: Fn(&ScoringContext) -> f64 + Send + Sync,
{
    fn calculate(&self, context: &ScoringContext) -> f64 {
        self(context)
    }
}

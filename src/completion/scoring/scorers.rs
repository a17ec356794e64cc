//! 具体评分器实现
//!
//! 评分按 基础匹配 → 频率 → 类型 → 时近性 的顺序累加

use super::calculator::ScoreCalculator;
use super::context::ScoringContext;
use super::*;
use crate::completion::matching::MatchKind;
use crate::completion::types::SuggestionType;
use std::collections::HashMap;

/// 基础匹配评分器
///
/// - 前缀：`100 - (候选长度 - 查询长度)`
/// - 子串：`50 - 命中位置`
/// - 模糊：`比例 * 30`
pub struct BaseMatchScorer;

impl ScoreCalculator for BaseMatchScorer {
    fn calculate(&self, context: &ScoringContext) -> f64 {
        let score = match context.match_kind {
            Some(MatchKind::Prefix) => PREFIX_BASE - context.length_gap() as f64,
            Some(MatchKind::Substring { position }) => SUBSTRING_BASE - position as f64,
            Some(MatchKind::Fuzzy { ratio }) => ratio * FUZZY_WEIGHT,
            None => 0.0,
        };

        clamp_score(score)
    }

    fn name(&self) -> &'static str {
        "base"
    }
}

/// 频率评分器：每次使用 +2，封顶 20
pub struct FrequencyScorer;

impl ScoreCalculator for FrequencyScorer {
    fn calculate(&self, context: &ScoringContext) -> f64 {
        (context.usage_count as f64 * FREQUENCY_WEIGHT).min(FREQUENCY_CAP)
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}

/// 类型评分器
///
/// 加分表在构造时生成，查询时只做查表
pub struct CategoryScorer {
    bonuses: HashMap<SuggestionType, f64>,
}

impl CategoryScorer {
    pub fn new() -> Self {
        let bonuses = SuggestionType::ALL
            .into_iter()
            .map(|kind| (kind, category_bonus(kind)))
            .collect();
        Self { bonuses }
    }

    pub fn bonus(&self, kind: SuggestionType) -> f64 {
        self.bonuses.get(&kind).copied().unwrap_or(0.0)
    }
}

impl Default for CategoryScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn category_bonus(kind: SuggestionType) -> f64 {
    match kind {
        SuggestionType::Command => 10.0,
        SuggestionType::ParameterValue => 8.0,
        SuggestionType::HistoryValue => 5.0,
        SuggestionType::Variable => 3.0,
        SuggestionType::Alias => 2.0,
        SuggestionType::FuzzyMatch => 0.0,
    }
}

impl ScoreCalculator for CategoryScorer {
    fn calculate(&self, context: &ScoringContext) -> f64 {
        self.bonus(context.kind)
    }

    fn name(&self) -> &'static str {
        "category"
    }
}

/// 时近性评分器：出现在最近命令中 +15
pub struct RecencyScorer;

impl ScoreCalculator for RecencyScorer {
    fn calculate(&self, context: &ScoringContext) -> f64 {
        if context.is_recent {
            RECENCY_BONUS
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "recency"
    }
}

/// 组合评分器
///
/// 组合多个评分器的结果，支持可组合的评分策略
pub struct CompositeScorer {
    scorers: Vec<Box<dyn ScoreCalculator>>,
}

impl CompositeScorer {
    /// 创建新的组合评分器
    pub fn new(scorers: Vec<Box<dyn ScoreCalculator>>) -> Self {
        Self { scorers }
    }

    /// 默认的补全评分组合
    pub fn default_composite() -> Self {
        Self::new(vec![
            Box::new(BaseMatchScorer),
            Box::new(FrequencyScorer),
            Box::new(CategoryScorer::new()),
            Box::new(RecencyScorer),
        ])
    }
}

impl ScoreCalculator for CompositeScorer {
    fn calculate(&self, context: &ScoringContext) -> f64 {
        self.scorers
            .iter()
            .map(|scorer| scorer.calculate(context))
            .sum()
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}

//! 补全引擎核心模块
//!
//! 协调各个候选生成器，对候选统一评分、排序、去重和截断

use crate::completion::context_analyzer::ContextAnalyzer;
use crate::completion::learning::FrequencyModel;
use crate::completion::providers::{
    default_generators, Candidate, CandidateGenerator, CandidateSource, CandidateSources,
};
use crate::completion::scoring::{CompositeScorer, ScoreCalculator, ScoringContext};
use crate::completion::types::{InputContext, Suggestion, SuggestionType};
use crate::config::{CompletionConfig, ConfigResult};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// 补全引擎
pub struct CompletionEngine {
    /// 候选生成器表，构造时确定
    generators: Vec<Box<dyn CandidateGenerator>>,
    scorer: CompositeScorer,
    config: CompletionConfig,
}

impl CompletionEngine {
    /// 创建新的补全引擎
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            generators: default_generators(),
            scorer: CompositeScorer::default_composite(),
            config,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// 校验并替换补全配置
    pub fn update_config(&mut self, config: CompletionConfig) -> ConfigResult<()> {
        config.validate()?;
        debug!(
            max_suggestions = config.max_suggestions,
            fuzzy_threshold = config.fuzzy_threshold,
            "completion.config.updated"
        );
        self.config = config;
        Ok(())
    }

    pub fn generator(&self, source: CandidateSource) -> Option<&dyn CandidateGenerator> {
        self.generators
            .iter()
            .find(|generator| generator.source() == source)
            .map(|generator| generator.as_ref())
    }

    /// 获取补全建议
    ///
    /// 结果按分数降序，文本唯一，最多 `max_suggestions` 条。
    pub fn suggest(
        &self,
        input: &str,
        cursor: usize,
        sources: &CandidateSources<'_>,
    ) -> Vec<Suggestion> {
        let start_time = Instant::now();
        let context = ContextAnalyzer::new(sources.catalog).analyze(input, cursor);

        let candidates = if needs_fallback(&context) {
            self.fallback_candidates(sources)
        } else {
            self.collect_candidates(&context, sources)
        };
        let candidate_count = candidates.len();

        let suggestions = self.rank(candidates, sources.model);

        debug!(
            input = %context.input,
            context = context.context_type.as_str(),
            candidates = candidate_count,
            results = suggestions.len(),
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "completion.suggest"
        );

        suggestions
    }

    fn collect_candidates(
        &self,
        context: &InputContext,
        sources: &CandidateSources<'_>,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for generator in &self.generators {
            if !generator.should_provide(context) {
                continue;
            }
            let items = generator.generate(context, sources);
            debug!(
                generator = generator.name(),
                count = items.len(),
                "completion.generator.done"
            );
            candidates.extend(items);
        }
        candidates
    }

    /// 空输入的回退列表：最近命令、常用命令、目录中的命令
    fn fallback_candidates(&self, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let catalog_commands: Vec<_> = sources
            .catalog
            .list_commands()
            .into_iter()
            .filter(|descriptor| sources.config.include_hidden || !descriptor.hidden)
            .collect();

        let describe = |name: &str| -> Candidate {
            match catalog_commands.iter().find(|d| d.name == name) {
                Some(descriptor) => Candidate::new(name, SuggestionType::Command)
                    .with_description(descriptor.description.clone())
                    .with_category(descriptor.category.clone()),
                None => Candidate::new(name, SuggestionType::HistoryValue)
                    .with_category("history"),
            }
        };

        let mut candidates: Vec<Candidate> =
            sources.model.recent_commands().map(describe).collect();
        candidates.extend(
            sources
                .model
                .popular_commands(self.config.max_suggestions)
                .iter()
                .map(|(name, _)| describe(name.as_str())),
        );
        candidates.extend(catalog_commands.iter().map(|d| describe(d.name.as_str())));
        candidates
    }

    /// 评分、稳定排序、去重（保留首个即最高分）、截断
    pub fn rank(&self, candidates: Vec<Candidate>, model: &FrequencyModel) -> Vec<Suggestion> {
        let mut scored: Vec<Suggestion> = candidates
            .into_iter()
            .map(|candidate| {
                let mut context =
                    ScoringContext::new(candidate.query, candidate.text.as_str(), candidate.kind)
                        .with_usage_count(model.usage_count(&candidate.text))
                        .with_recent(model.is_recent(&candidate.text));
                if let Some(match_kind) = candidate.match_kind {
                    context = context.with_match(match_kind);
                }
                let score = self.scorer.calculate(&context);

                Suggestion::new(candidate.text, candidate.kind)
                    .with_description(candidate.description)
                    .with_category(candidate.category)
                    .with_score(score)
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let mut seen = HashSet::new();
        scored.retain(|suggestion| seen.insert(suggestion.text.clone()));
        scored.truncate(self.config.max_suggestions);
        scored
    }
}

/// 空白或含控制字符的输入走回退列表
fn needs_fallback(context: &InputContext) -> bool {
    context.input.trim().is_empty()
        || context
            .input
            .chars()
            .any(|ch| ch.is_control() && !ch.is_whitespace())
}

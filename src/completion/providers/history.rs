//! 历史命令补全
//!
//! 用整行输入匹配历史命令行，最新的记录优先

use super::{Candidate, CandidateGenerator, CandidateSource, CandidateSources};
use crate::completion::matching::best_match;
use crate::completion::types::{InputContext, SuggestionType};
use std::collections::HashSet;

pub struct HistoryGenerator;

impl CandidateGenerator for HistoryGenerator {
    fn source(&self) -> CandidateSource {
        CandidateSource::HistoryLines
    }

    fn should_provide(&self, context: &InputContext) -> bool {
        !context.input.trim().is_empty()
    }

    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let query = context.input.trim_start();
        let mut seen = HashSet::new();

        sources
            .history
            .iter()
            .rev()
            .filter(|entry| seen.insert(entry.command.as_str()))
            .take(sources.config.history_candidates)
            .filter_map(|entry| {
                let match_kind = best_match(&entry.command, query, None)?;
                let description = if entry.success {
                    "From history".to_string()
                } else {
                    "From history (failed)".to_string()
                };
                Some(
                    Candidate::new(entry.command.clone(), SuggestionType::HistoryValue)
                        .with_description(description)
                        .with_category("history")
                        .with_match(query, match_kind),
                )
            })
            .collect()
    }
}

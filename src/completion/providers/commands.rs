//! 命令与别名候选

use super::{Candidate, CandidateGenerator, CandidateSource, CandidateSources};
use crate::completion::matching::{best_match, MatchKind};
use crate::completion::types::{ContextType, InputContext, SuggestionType};

/// 已注册命令
pub struct CommandGenerator;

impl CandidateGenerator for CommandGenerator {
    fn source(&self) -> CandidateSource {
        CandidateSource::Commands
    }

    fn should_provide(&self, context: &InputContext) -> bool {
        context.context_type == ContextType::Command
    }

    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let query = context.current_token.as_str();
        let fuzzy = sources.fuzzy_threshold(query);

        sources
            .catalog
            .list_commands()
            .into_iter()
            .filter(|descriptor| sources.config.include_hidden || !descriptor.hidden)
            .filter_map(|descriptor| {
                let match_kind = best_match(&descriptor.name, query, fuzzy)?;
                let kind = if match_kind.is_fuzzy() {
                    SuggestionType::FuzzyMatch
                } else {
                    SuggestionType::Command
                };
                Some(
                    Candidate::new(descriptor.name, kind)
                        .with_description(descriptor.description)
                        .with_category(descriptor.category)
                        .with_match(query, match_kind),
                )
            })
            .collect()
    }
}

/// 命令别名，只做前缀和子串匹配
pub struct AliasGenerator;

impl CandidateGenerator for AliasGenerator {
    fn source(&self) -> CandidateSource {
        CandidateSource::Aliases
    }

    fn should_provide(&self, context: &InputContext) -> bool {
        context.context_type == ContextType::Command
    }

    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let query = context.current_token.as_str();

        sources
            .catalog
            .aliases()
            .into_iter()
            .filter_map(|(alias, canonical)| {
                let match_kind: MatchKind = best_match(&alias, query, None)?;
                let category = sources
                    .catalog
                    .lookup(&canonical)
                    .map(|descriptor| descriptor.category)
                    .unwrap_or_default();
                Some(
                    Candidate::new(alias, SuggestionType::Alias)
                        .with_description(format!("Alias for {canonical}"))
                        .with_category(category)
                        .with_match(query, match_kind),
                )
            })
            .collect()
    }
}

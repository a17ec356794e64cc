//! 参数取值补全
//!
//! 候选值来自参数规范（枚举值、布尔值、数字边界）和学习模型记录的历史参数。

use super::{Candidate, CandidateGenerator, CandidateSource, CandidateSources};
use crate::completion::matching::best_match;
use crate::completion::types::{InputContext, SuggestionType};
use std::collections::HashSet;

pub struct ParameterValueGenerator;

impl CandidateGenerator for ParameterValueGenerator {
    fn source(&self) -> CandidateSource {
        CandidateSource::ParameterValues
    }

    fn should_provide(&self, context: &InputContext) -> bool {
        !context.is_completing_command() && !context.current_token.starts_with('$')
    }

    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let query = context.current_token.as_str();
        let fuzzy = sources.fuzzy_threshold(query);
        let command = context.command();

        let descriptor = sources.catalog.lookup(command);
        let parameter = descriptor
            .as_ref()
            .and_then(|d| d.parameter(context.arg_index));
        let category = descriptor
            .as_ref()
            .map(|d| d.category.clone())
            .unwrap_or_default();

        let mut values: Vec<(String, String)> = Vec::new();
        if let Some(parameter) = parameter {
            let description = if parameter.description.is_empty() {
                parameter.name.clone()
            } else {
                format!("{}: {}", parameter.name, parameter.description)
            };
            values.extend(
                parameter
                    .candidate_values()
                    .into_iter()
                    .map(|value| (value, description.clone())),
            );
        }
        values.extend(
            sources
                .model
                .argument_values(command, context.arg_index)
                .into_iter()
                .map(|(value, count)| (value, format!("Used {count} times"))),
        );

        let mut seen = HashSet::new();
        values
            .into_iter()
            .filter(|(value, _)| seen.insert(value.clone()))
            .filter_map(|(value, description)| {
                let match_kind = best_match(&value, query, fuzzy)?;
                Some(
                    Candidate::new(value, SuggestionType::ParameterValue)
                        .with_description(description)
                        .with_category(category.clone())
                        .with_match(query, match_kind),
                )
            })
            .collect()
    }
}

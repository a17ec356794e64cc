//! 控制台变量补全（`$name`）

use super::{Candidate, CandidateGenerator, CandidateSource, CandidateSources};
use crate::completion::matching::best_match;
use crate::completion::types::{InputContext, SuggestionType};

const PREVIEW_CHARS: usize = 40;

pub struct VariableGenerator;

impl CandidateGenerator for VariableGenerator {
    fn source(&self) -> CandidateSource {
        CandidateSource::Variables
    }

    fn should_provide(&self, context: &InputContext) -> bool {
        context.current_token.starts_with('$')
    }

    fn generate(&self, context: &InputContext, sources: &CandidateSources<'_>) -> Vec<Candidate> {
        let query = context.current_token.as_str();

        sources
            .variables
            .iter()
            .filter_map(|(name, value)| {
                let text = format!("${name}");
                let match_kind = best_match(&text, query, None)?;
                Some(
                    Candidate::new(text, SuggestionType::Variable)
                        .with_description(preview(value))
                        .with_category("variable")
                        .with_match(query, match_kind),
                )
            })
            .collect()
    }
}

fn preview(value: &str) -> String {
    if value.chars().count() > PREVIEW_CHARS {
        let head: String = value.chars().take(PREVIEW_CHARS).collect();
        format!("{head}…")
    } else {
        value.to_string()
    }
}

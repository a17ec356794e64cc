//! 补全排序集成测试

use recall_lib::completion::{CommandDescriptor, CommandRegistry, SuggestionType};
use recall_lib::config::EngineConfig;
use recall_lib::history::ExecutionMetadata;
use recall_lib::storage::MemoryStore;
use recall_lib::utils::ManualClock;
use recall_lib::ConsoleEngine;
use std::collections::HashSet;
use std::sync::Arc;

fn engine_with(names: &[&str]) -> (ConsoleEngine, Arc<ManualClock>) {
    let mut registry = CommandRegistry::new();
    for name in names {
        registry.register(CommandDescriptor::new(*name).with_description(format!("{name} command")));
    }
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let engine = ConsoleEngine::with_session(
        EngineConfig::default(),
        Arc::new(registry),
        Arc::new(MemoryStore::new()),
        clock.clone(),
        "ranking",
    )
    .unwrap();
    (engine, clock)
}

fn ranked(engine: &ConsoleEngine, input: &str) -> Vec<(String, f64)> {
    engine
        .get_suggestions(input, input.chars().count())
        .into_iter()
        .map(|s| (s.text, s.score))
        .collect()
}

#[test]
fn test_prefix_fixture() {
    let (engine, _) = engine_with(&["help", "health", "heal"]);

    assert_eq!(
        ranked(&engine, "he"),
        vec![
            ("help".to_string(), 108.0),
            ("heal".to_string(), 108.0),
            ("health".to_string(), 106.0),
        ]
    );
}

#[test]
fn test_fuzzy_fixture_keeps_registration_order() {
    let (engine, _) = engine_with(&["help", "health", "heal"]);

    let suggestions = engine.get_suggestions("hl", 2);
    let texts: Vec<_> = suggestions.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["help", "health", "heal"]);
    for suggestion in &suggestions {
        assert_eq!(suggestion.score, 30.0);
        assert_eq!(suggestion.suggestion_type, SuggestionType::FuzzyMatch);
    }
}

#[test]
fn test_prefix_outranks_fuzzy() {
    let (engine, _) = engine_with(&["status", "stash", "sort.table", "system"]);

    let suggestions = engine.get_suggestions("st", 2);
    let first_fuzzy = suggestions
        .iter()
        .position(|s| s.suggestion_type == SuggestionType::FuzzyMatch)
        .unwrap_or(suggestions.len());
    let last_prefix = suggestions
        .iter()
        .rposition(|s| s.text.starts_with("st"))
        .unwrap();
    assert!(last_prefix < first_fuzzy);
}

#[test]
fn test_results_are_bounded_unique_and_sorted() {
    let names: Vec<String> = (0..40).map(|i| format!("cmd{i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (mut engine, clock) = engine_with(&refs);

    // 历史中的同名命令不会产生重复建议
    for name in names.iter().take(5) {
        engine.record_command(name, ExecutionMetadata::default());
        clock.advance(5_000);
    }

    for input in ["", "c", "cmd", "cmd0", "md1"] {
        let suggestions = engine.get_suggestions(input, input.len());
        assert!(suggestions.len() <= 15, "input {input:?}");

        let unique: HashSet<_> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(unique.len(), suggestions.len(), "input {input:?}");

        assert!(
            suggestions.windows(2).all(|w| w[0].score >= w[1].score),
            "input {input:?}"
        );
    }
}

#[test]
fn test_learning_boosts_frequent_commands() {
    let (mut engine, clock) = engine_with(&["help", "health", "heal"]);

    for _ in 0..3 {
        engine.record_command("health", ExecutionMetadata::default());
        clock.advance(5_000);
    }

    let suggestions = engine.get_suggestions("he", 2);
    assert_eq!(suggestions[0].text, "health");
    // 96 前缀 + 10 类别 + 6 频率 + 15 最近
    assert_eq!(suggestions[0].score, 127.0);
}

#[test]
fn test_empty_input_falls_back_to_recent_commands() {
    let (mut engine, clock) = engine_with(&["help", "health", "heal"]);
    engine.record_command("heal", ExecutionMetadata::default());
    clock.advance(5_000);

    let suggestions = engine.get_suggestions("", 0);
    assert_eq!(suggestions[0].text, "heal");
    assert_eq!(suggestions.len(), 3);
}

#[test]
fn test_parameter_values_from_builtin_catalog() {
    let clock = Arc::new(ManualClock::new(0));
    let engine = ConsoleEngine::with_session(
        EngineConfig::default(),
        Arc::new(CommandRegistry::with_builtin()),
        Arc::new(MemoryStore::new()),
        clock,
        "params",
    )
    .unwrap();

    let input = "history.export c";
    let suggestions = engine.get_suggestions(input, input.len());
    assert_eq!(suggestions[0].text, "csv");
    assert_eq!(suggestions[0].suggestion_type, SuggestionType::ParameterValue);
}

#[test]
fn test_cursor_in_middle_only_uses_prefix() {
    let (engine, _) = engine_with(&["help", "health", "heal"]);
    let texts: Vec<_> = engine
        .get_suggestions("heal", 2)
        .into_iter()
        .map(|s| s.text)
        .collect();
    assert_eq!(texts, vec!["help", "heal", "health"]);
}

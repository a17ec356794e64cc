//! 历史存储集成测试

use recall_lib::config::{HistoryConfig, MatchConfig};
use recall_lib::history::{
    ExecutionMetadata, ExportFormat, ExportOptions, HistoryStore, ImportOptions,
    NavigateDirection, SearchMode, SearchOptions, SortKey,
};
use std::collections::BTreeSet;

const BASE_TS: i64 = 1_700_000_000_000;

fn store() -> HistoryStore {
    HistoryStore::new(HistoryConfig::default(), MatchConfig::default(), "session-a")
}

fn populated(commands: &[&str]) -> HistoryStore {
    let mut history = store();
    for (i, command) in commands.iter().enumerate() {
        history
            .add(command, ExecutionMetadata::success(i as f64), BASE_TS + i as i64 * 2_000)
            .unwrap();
    }
    history
}

#[test]
fn test_capacity_trims_exactly_the_oldest() {
    let mut history = store();
    for i in 0..1000 {
        history
            .add(&format!("cmd {i}"), ExecutionMetadata::default(), BASE_TS + i * 2_000)
            .unwrap();
    }
    assert_eq!(history.len(), 1000);
    let oldest_id = history.entries()[0].id;

    history
        .add("one more", ExecutionMetadata::default(), BASE_TS + 10_000_000)
        .unwrap();

    assert_eq!(history.len(), 1000);
    assert_eq!(history.entries()[0].command, "cmd 1");
    assert!(!history.index().references(oldest_id));
    assert!(history.index().references(history.entries()[0].id));
}

#[test]
fn test_navigation_floor_and_blank_line() {
    let mut history = populated(&["a", "b", "c"]);

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(history.navigate(NavigateDirection::Up, None).unwrap().command.clone());
    }
    assert_eq!(seen, vec!["c", "b", "a"]);

    assert_eq!(
        history.navigate(NavigateDirection::Up, None).map(|e| e.command.as_str()),
        Some("a")
    );
    assert_eq!(
        history.navigate(NavigateDirection::Last, None).map(|e| e.command.as_str()),
        Some("c")
    );
    assert!(history.navigate(NavigateDirection::Down, None).is_none());
}

#[test]
fn test_filtered_navigation() {
    let mut history = populated(&["git status", "help", "git log", "echo git"]);

    assert_eq!(
        history
            .navigate(NavigateDirection::Up, Some("git"))
            .map(|e| e.command.as_str()),
        Some("git log")
    );
    assert_eq!(
        history
            .navigate(NavigateDirection::Up, Some("git"))
            .map(|e| e.command.as_str()),
        Some("git status")
    );
}

#[test]
fn test_search_modes() {
    let mut history = populated(&[
        "history.search foo",
        "history.stats",
        "echo history",
        "set name value",
    ]);

    let exact = history.search("history.stats", &SearchOptions::new(SearchMode::Exact));
    assert_eq!(exact.len(), 1);

    let contains = history.search("history", &SearchOptions::new(SearchMode::Contains));
    assert_eq!(contains.len(), 3);
    assert_eq!(contains[0].command, "history.stats");

    let pattern = history.search(
        r"^history\.s(tats|earch)",
        &SearchOptions::new(SearchMode::Pattern).sort_by(SortKey::Timestamp),
    );
    let commands: Vec<_> = pattern.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["history.stats", "history.search foo"]);

    let fuzzy = history.search("stnmv", &SearchOptions::new(SearchMode::Fuzzy));
    assert_eq!(fuzzy[0].command, "set name value");
}

#[test]
fn test_empty_query_honours_sort_key() {
    let mut history = populated(&["b", "b x", "a", "b", "c"]);
    let commands = |results: Vec<recall_lib::history::HistoryEntry>| {
        results.into_iter().map(|e| e.command).collect::<Vec<_>>()
    };

    let by_frequency = history.search("", &SearchOptions::default().sort_by(SortKey::Frequency));
    assert_eq!(commands(by_frequency), vec!["b", "b", "c", "a", "b x"]);

    let by_relevance = history.search("", &SearchOptions::default());
    assert_eq!(commands(by_relevance), vec!["c", "b", "a", "b x", "b"]);
}

#[test]
fn test_invalid_pattern_is_no_match() {
    let mut history = populated(&["echo (", "help"]);
    assert!(history
        .search("(", &SearchOptions::new(SearchMode::Pattern))
        .is_empty());
    assert!(history
        .search(&"a".repeat(300), &SearchOptions::new(SearchMode::Pattern))
        .is_empty());
}

#[test]
fn test_statistics_track_failures_and_session() {
    let mut history = store();
    history.add("echo hi", ExecutionMetadata::success(10.0), BASE_TS);
    history.add("get missing", ExecutionMetadata::failure("undefined", 30.0), BASE_TS + 2_000);
    history.add("echo again", ExecutionMetadata::success(20.0), BASE_TS + 4_000);

    let stats = history.statistics();
    assert_eq!(stats.total_commands, 3);
    assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.average_execution_time, 20.0);
    assert_eq!(stats.top_commands[0].command, "echo");
    assert_eq!(stats.top_commands[0].count, 2);
    assert_eq!(stats.error_commands, vec!["get"]);
    assert_eq!(stats.current_session.session_id, "session-a");
    assert_eq!(stats.session_commands, 3);
}

#[test]
fn test_export_then_import_reproduces_entries() {
    let source = populated(&["help", "echo \"quoted, text\"", "set a 1", "history.stats"]);
    let expected: BTreeSet<(String, i64)> = source
        .entries()
        .iter()
        .map(|e| (e.command.clone(), e.timestamp))
        .collect();

    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Text] {
        for options in [ExportOptions::default(), ExportOptions::with_metadata()] {
            let data = source.export(format, &options, BASE_TS).unwrap();

            let mut target = store();
            let report = target
                .import(&data, format, ImportOptions { merge: false })
                .unwrap();
            assert_eq!(report.imported_count, 4, "{format} {options:?}");

            let actual: BTreeSet<(String, i64)> = target
                .entries()
                .iter()
                .map(|e| (e.command.clone(), e.timestamp))
                .collect();
            assert_eq!(actual, expected, "{format} {options:?}");
        }
    }
}

#[test]
fn test_text_round_trip_with_multiline_and_odd_durations() {
    let mut source = store();
    source.add("echo a\nb", ExecutionMetadata::success(-1.0), BASE_TS).unwrap();
    source
        .add("help", ExecutionMetadata::failure("boom", f64::NAN), BASE_TS + 2_000)
        .unwrap();
    source
        .add("clear", ExecutionMetadata::success(f64::INFINITY), BASE_TS + 4_000)
        .unwrap();
    assert_eq!(source.entries()[0].command, "echo a b");

    let data = source
        .export(ExportFormat::Text, &ExportOptions::with_metadata(), BASE_TS)
        .unwrap();
    let mut target = store();
    let report = target
        .import(&data, ExportFormat::Text, ImportOptions { merge: false })
        .unwrap();
    assert_eq!(report.imported_count, 3);
    assert_eq!(report.skipped_count, 0);

    let pairs: Vec<_> = target
        .entries()
        .iter()
        .map(|e| (e.command.as_str(), e.timestamp, e.success))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("echo a b", BASE_TS, true),
            ("help", BASE_TS + 2_000, false),
            ("clear", BASE_TS + 4_000, true),
        ]
    );
}

#[test]
fn test_import_counts_rejected_records() {
    let mut history = store();
    let data = r#"[
        {"command": "help", "timestamp": 1},
        {"command": "   ", "timestamp": 2},
        {"command": "echo", "timestamp": -5},
        {"timestamp": 3}
    ]"#;
    let report = history
        .import(data, ExportFormat::Json, ImportOptions { merge: true })
        .unwrap();

    assert_eq!(report.imported_count, 1);
    assert_eq!(report.skipped_count, 3);
    assert_eq!(report.total_count, 4);
}

#[test]
fn test_unsupported_format_name() {
    assert!("xml".parse::<ExportFormat>().is_err());
    assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
}

#[test]
fn test_clear_resets_everything() {
    let mut history = populated(&["a", "b"]);
    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.statistics().total_commands, 0);
    assert!(history.search("", &SearchOptions::default()).is_empty());
}

//! Console Recall 演示控制台
//!
//! 从标准输入逐行读取命令：
//! - `?<输入>` 打印补全建议
//! - 其他输入按内置命令执行并记入历史
//!
//! 用法：`console-recall [--config <path>] [--print-config]`

use anyhow::Context;
use recall_lib::completion::command_line::parse_command_line;
use recall_lib::completion::CommandRegistry;
use recall_lib::config::EngineConfig;
use recall_lib::history::{
    ExecutionMetadata, ExportFormat, ExportOptions, SearchMode, SearchOptions,
};
use recall_lib::storage::{FileStore, PersistenceStore, QueuedStore};
use recall_lib::utils::{init_logging, AppResult, SystemClock};
use recall_lib::{app_bail, ConsoleEngine};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HISTORY_PREVIEW: usize = 20;
const SHUTDOWN_POLLS: usize = 200;

#[tokio::main]
async fn main() -> AppResult<()> {
    let options = CliOptions::parse(std::env::args().skip(1))?;

    if options.print_config {
        let toml_content = toml::to_string_pretty(&EngineConfig::default())
            .context("serializing default config")?;
        println!("{toml_content}");
        return Ok(());
    }

    if let Err(e) = init_logging() {
        eprintln!("{e}");
    }

    let config = load_config(options.config_path)?;
    let file_store = FileStore::default_location().context("opening history store")?;
    info!(dir = %file_store.dir().display(), "console.store.opened");
    let queued = Arc::new(QueuedStore::new(Arc::new(file_store)));
    let store: Arc<dyn PersistenceStore> = queued.clone();

    let mut engine = ConsoleEngine::new(
        config,
        Arc::new(CommandRegistry::with_builtin()),
        store,
        Arc::new(SystemClock),
    )
    .context("starting console engine")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        if let Some(partial) = line.strip_prefix('?') {
            for suggestion in engine.get_suggestions(partial, partial.chars().count()) {
                println!(
                    "{:>6}  {:<16} {}  {}",
                    suggestion.score,
                    suggestion.suggestion_type,
                    suggestion.text,
                    suggestion.description
                );
            }
            continue;
        }

        let started = Instant::now();
        let outcome = execute(&mut engine, line);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let metadata = match outcome {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
                ExecutionMetadata::success(elapsed_ms)
            }
            Err(message) => {
                println!("error: {message}");
                ExecutionMetadata::failure(message, elapsed_ms)
            }
        };
        engine.record_command(line, metadata);
    }

    if !engine.shutdown() {
        warn!("console.shutdown.flush_skipped");
    }
    // 等待后台写入任务处理完队列
    for _ in 0..SHUTDOWN_POLLS {
        if queued.pending_writes() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    if queued.failed_writes() > 0 {
        warn!(failed = queued.failed_writes(), "console.shutdown.writes_failed");
    }
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    print_config: bool,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> AppResult<Self> {
        let mut options = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => match args.next() {
                    Some(path) => options.config_path = Some(PathBuf::from(path)),
                    None => app_bail!("--config requires a path"),
                },
                "--print-config" => options.print_config = true,
                other => app_bail!("unknown argument: {}", other),
            }
        }
        Ok(options)
    }
}

/// 显式指定的配置必须能加载；默认位置的配置缺失时使用默认值
fn load_config(path: Option<PathBuf>) -> AppResult<EngineConfig> {
    if let Some(path) = path {
        return EngineConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let default_path = dirs::config_dir().map(|dir| dir.join("console-recall").join("config.toml"));
    match default_path {
        Some(path) if path.exists() => EngineConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display())),
        _ => Ok(EngineConfig::default()),
    }
}

/// 执行内置命令，返回输出文本或错误信息
fn execute(engine: &mut ConsoleEngine, line: &str) -> Result<String, String> {
    let parsed = parse_command_line(line).ok_or_else(|| "empty command".to_string())?;
    let name = engine
        .catalog()
        .resolve_alias(&parsed.name)
        .unwrap_or(parsed.name);
    let args = parsed.args;

    match name.as_str() {
        "help" => help(engine, args.first().map(String::as_str)),
        "clear" => Ok("\x1b[2J\x1b[H".to_string()),
        "echo" => Ok(args.join(" ")),
        "commands" => Ok(engine
            .catalog()
            .list_commands()
            .into_iter()
            .filter(|descriptor| !descriptor.hidden)
            .map(|descriptor| descriptor.name)
            .collect::<Vec<_>>()
            .join("  ")),
        "history" => {
            let entries = engine.history().entries();
            let skip = entries.len().saturating_sub(HISTORY_PREVIEW);
            Ok(entries[skip..]
                .iter()
                .map(|entry| format!("{:>5}  {}", entry.id, entry.command))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "history.search" => {
            let query = args.first().ok_or_else(|| "missing query".to_string())?;
            let mut options = SearchOptions::default();
            if let Some(mode) = args.get(1) {
                options.mode = mode.parse::<SearchMode>().map_err(|e| e.to_string())?;
            }
            if let Some(limit) = args.get(2) {
                let limit = limit
                    .parse::<usize>()
                    .map_err(|e| format!("invalid limit: {e}"))?;
                options = options.with_limit(limit);
            }
            Ok(engine
                .search_history(query, &options)
                .iter()
                .map(|entry| format!("{:>5}  {}", entry.id, entry.command))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "history.stats" => serde_json::to_string_pretty(&engine.get_statistics())
            .map_err(|e| e.to_string()),
        "history.export" => {
            let format = match args.first() {
                Some(format) => format.parse::<ExportFormat>().map_err(|e| e.to_string())?,
                None => ExportFormat::Json,
            };
            engine
                .export_history(format, &ExportOptions::with_metadata())
                .map_err(|e| e.to_string())
        }
        "set" => match (args.first(), args.get(1)) {
            (Some(key), Some(_)) => {
                let value = args[1..].join(" ");
                engine.set_variable(key.clone(), value.clone());
                Ok(format!("{key} = {value}"))
            }
            _ => Err("usage: set <name> <value>".to_string()),
        },
        "get" => {
            let key = args.first().ok_or_else(|| "usage: get <name>".to_string())?;
            engine
                .variable(key)
                .map(str::to_string)
                .ok_or_else(|| format!("variable '{key}' is not defined"))
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn help(engine: &ConsoleEngine, command: Option<&str>) -> Result<String, String> {
    let Some(command) = command else {
        return Ok(engine
            .catalog()
            .list_commands()
            .into_iter()
            .filter(|descriptor| !descriptor.hidden)
            .map(|descriptor| format!("{:<16} {}", descriptor.name, descriptor.description))
            .collect::<Vec<_>>()
            .join("\n"));
    };

    let descriptor = engine
        .catalog()
        .lookup(command)
        .ok_or_else(|| format!("unknown command: {command}"))?;
    let mut lines = vec![
        format!("{} - {}", descriptor.name, descriptor.description),
        format!("usage: {}", descriptor.usage),
    ];
    if !descriptor.aliases.is_empty() {
        lines.push(format!("aliases: {}", descriptor.aliases.join(", ")));
    }
    for parameter in &descriptor.parameters {
        lines.push(format!(
            "  {:<10} {:<8} {}",
            parameter.name,
            parameter.kind.as_str(),
            parameter.description
        ));
    }
    Ok(lines.join("\n"))
}

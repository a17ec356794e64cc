//! 内置命令定义
//!
//! 控制台自带的系统命令，宿主可在此基础上注册更多命令

use super::command_spec::{CommandDescriptor, ParameterSpec};

const SYSTEM: &str = "system";

/// 加载所有内置命令（按注册顺序）
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    let mut commands = Vec::new();

    commands.extend(console_commands());
    commands.extend(history_commands());
    commands.extend(variable_commands());

    commands
}

/// 控制台基础命令
fn console_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("help")
            .with_description("Show available commands or detailed help for a specific command")
            .with_usage("help [command]")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("command")
                    .with_description("Specific command to get help for"),
            ),
        CommandDescriptor::new("clear")
            .with_description("Clear the console output")
            .with_usage("clear")
            .with_category(SYSTEM)
            .with_alias("cls"),
        CommandDescriptor::new("echo")
            .with_description("Print text to console")
            .with_usage("echo <text>")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("text")
                    .with_description("Text to print")
                    .required(),
            ),
        CommandDescriptor::new("commands")
            .with_description("List all available commands")
            .with_usage("commands [group]")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("group").with_description("Filter by command group"),
            ),
    ]
}

/// 历史相关命令
fn history_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("history")
            .with_description("Show command history")
            .with_usage("history [count]")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::number("count")
                    .with_description("Number of recent commands to show")
                    .with_range(Some(1.0), None),
            ),
        CommandDescriptor::new("history.search")
            .with_description("Search command history")
            .with_usage("history.search <query> [type] [limit]")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("query")
                    .with_description("Search query")
                    .required(),
            )
            .with_parameter(
                ParameterSpec::enumerated("type", ["exact", "contains", "fuzzy", "regex"])
                    .with_description("Search type"),
            )
            .with_parameter(
                ParameterSpec::number("limit")
                    .with_description("Maximum results to show")
                    .with_range(Some(1.0), None),
            ),
        CommandDescriptor::new("history.stats")
            .with_description("Show command history statistics")
            .with_usage("history.stats")
            .with_category(SYSTEM),
        CommandDescriptor::new("history.export")
            .with_description("Export command history")
            .with_usage("history.export [format]")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::enumerated("format", ["json", "csv", "text"])
                    .with_description("Export format"),
            ),
    ]
}

/// 变量命令
fn variable_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("set")
            .with_description("Set a variable in the console context")
            .with_usage("set <name> <value>")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("name")
                    .with_description("Variable name")
                    .required(),
            )
            .with_parameter(
                ParameterSpec::string("value")
                    .with_description("Variable value")
                    .required(),
            ),
        CommandDescriptor::new("get")
            .with_description("Get a variable from the console context")
            .with_usage("get <name>")
            .with_category(SYSTEM)
            .with_parameter(
                ParameterSpec::string("name")
                    .with_description("Variable name")
                    .required(),
            ),
    ]
}

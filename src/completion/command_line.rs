//! Command line normalization and parsing for learning.
//!
//! 目标：
//! - 把原始输入拆成命令名和参数，支持引号包裹的参数
//! - 引号不配对时退回按空白切分，不让学习步骤失败

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// 模式 key：命令名加空格连接的参数
    pub fn pattern_key(&self) -> String {
        pattern_key(&self.name, &self.args)
    }
}

pub fn pattern_key(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{name} {}", args.join(" "))
    }
}

/// 取最后一行并去掉首尾空白，空输入返回 `None`
pub fn normalize_command_line(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).rfind(|line| !line.is_empty())?;
    Some(line.to_string())
}

pub fn parse_command_line(raw: &str) -> Option<ParsedCommand> {
    let line = normalize_command_line(raw)?;
    let tokens = tokenize(&line);

    let mut iter = tokens.into_iter();
    let name = iter.next()?;
    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name,
        args: iter.collect(),
    })
}

fn tokenize(line: &str) -> Vec<String> {
    match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            debug!(error = %err, "completion.command_line.unbalanced_quotes");
            line.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        let parsed = parse_command_line("history.search config exact").unwrap();
        assert_eq!(parsed.name, "history.search");
        assert_eq!(parsed.args, vec!["config", "exact"]);
        assert_eq!(parsed.pattern_key(), "history.search config exact");
    }

    #[test]
    fn honours_quotes() {
        let parsed = parse_command_line(r#"echo "Hello World""#).unwrap();
        assert_eq!(parsed.args, vec!["Hello World"]);
    }

    #[test]
    fn falls_back_on_unbalanced_quotes() {
        let parsed = parse_command_line(r#"echo "broken"#).unwrap();
        assert_eq!(parsed.name, "echo");
        assert_eq!(parsed.args, vec!["\"broken"]);
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(parse_command_line("   "), None);
        assert_eq!(parse_command_line("\n\t"), None);
        assert_eq!(normalize_command_line("first\n  second  \n"), Some("second".to_string()));
    }

    #[test]
    fn pattern_key_without_args_is_name() {
        assert_eq!(pattern_key("help", &[]), "help");
    }
}

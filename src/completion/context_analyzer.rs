//! 命令行上下文分析器
//!
//! 把光标前的输入拆成命令名、参数和当前 token，
//! 并结合命令目录判断当前位置需要哪类补全。

use crate::completion::metadata::CommandCatalog;
use crate::completion::types::{ContextType, InputContext};

/// 上下文分析器
pub struct ContextAnalyzer<'a> {
    catalog: &'a dyn CommandCatalog,
}

impl<'a> ContextAnalyzer<'a> {
    pub fn new(catalog: &'a dyn CommandCatalog) -> Self {
        Self { catalog }
    }

    /// 分析输入行
    ///
    /// `cursor` 以字符计，超出输入长度时截断到末尾。
    pub fn analyze(&self, input: &str, cursor: usize) -> InputContext {
        let before_cursor: String = input.chars().take(cursor).collect();
        let ends_with_space = before_cursor
            .chars()
            .last()
            .is_some_and(char::is_whitespace);

        let mut tokens = before_cursor.split_whitespace().map(str::to_string);
        let command_name = tokens.next().unwrap_or_default();
        let mut args: Vec<String> = tokens.collect();

        let completing_command = command_name.is_empty() || (args.is_empty() && !ends_with_space);

        if !completing_command && ends_with_space {
            args.push(String::new());
        }

        let current_token = if completing_command {
            command_name.clone()
        } else {
            args.last().cloned().unwrap_or_default()
        };
        let arg_index = args.len().saturating_sub(1);

        let resolved_command = if command_name.is_empty() {
            None
        } else {
            self.catalog.resolve_alias(&command_name)
        };

        let context_type = if completing_command {
            ContextType::Command
        } else {
            self.catalog
                .lookup(&command_name)
                .and_then(|descriptor| descriptor.parameter(arg_index).map(|p| p.kind))
                .map(ContextType::Parameter)
                .unwrap_or(ContextType::GenericArg)
        };

        InputContext {
            input: before_cursor,
            command_name,
            resolved_command,
            args,
            current_token,
            arg_index,
            context_type,
        }
    }
}

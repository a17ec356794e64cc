//! 命令注册表
//!
//! 管理所有已知命令的元数据

use super::command_spec::CommandDescriptor;
use std::collections::HashMap;

/// 命令目录接口
///
/// 由命令分发器实现，补全引擎只通过该接口读取命令元数据。
pub trait CommandCatalog: Send + Sync {
    /// 按注册顺序列出所有命令
    fn list_commands(&self) -> Vec<CommandDescriptor>;

    /// 把别名解析为规范命令名
    fn resolve_alias(&self, name: &str) -> Option<String>;

    /// 查找命令（支持别名）
    fn lookup(&self, name: &str) -> Option<CommandDescriptor> {
        let canonical = self.resolve_alias(name);
        let target = canonical.as_deref().unwrap_or(name);
        self.list_commands()
            .into_iter()
            .find(|descriptor| descriptor.name == target)
    }

    /// 所有别名，(别名, 规范命令名)
    fn aliases(&self) -> Vec<(String, String)> {
        self.list_commands()
            .into_iter()
            .flat_map(|descriptor| {
                let name = descriptor.name;
                descriptor
                    .aliases
                    .into_iter()
                    .map(move |alias| (alias, name.clone()))
            })
            .collect()
    }
}

/// 内存命令注册表
///
/// 保持注册顺序，排序打平时依赖该顺序。
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含内置命令的注册表
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_all(super::builtin::builtin_commands());
        registry
    }

    /// 注册命令；同名命令原位替换
    pub fn register(&mut self, descriptor: CommandDescriptor) {
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), descriptor.name.clone());
        }

        match self.index.get(&descriptor.name) {
            Some(&position) => self.commands[position] = descriptor,
            None => {
                self.index
                    .insert(descriptor.name.clone(), self.commands.len());
                self.commands.push(descriptor);
            }
        }
    }

    /// 批量注册命令
    pub fn register_all(&mut self, descriptors: impl IntoIterator<Item = CommandDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// 获取命令描述（不解析别名）
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.index.get(name).map(|&position| &self.commands[position])
    }

    /// 获取所有已注册的命令数量
    pub fn count(&self) -> usize {
        self.commands.len()
    }
}

impl CommandCatalog for CommandRegistry {
    fn list_commands(&self) -> Vec<CommandDescriptor> {
        self.commands.clone()
    }

    fn resolve_alias(&self, name: &str) -> Option<String> {
        self.aliases.get(name).cloned()
    }

    fn lookup(&self, name: &str) -> Option<CommandDescriptor> {
        let target = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.get(target).cloned()
    }
}

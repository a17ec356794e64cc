//! 命令元数据模块
//!
//! 命令目录接口、内存注册表与内置命令集
//!

pub mod builtin;
pub mod command_spec;
pub mod registry;

pub use command_spec::{CommandDescriptor, ParameterKind, ParameterSpec};
pub use registry::{CommandCatalog, CommandRegistry};

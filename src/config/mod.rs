/*!
 * 引擎配置模块
 *
 * 基于 TOML 的引擎配置：补全、历史、学习、持久化与匹配策略。
 * 所有字段都有默认值，配置文件只需要写出想覆盖的部分。
 */

pub mod defaults;
pub mod error;
pub mod types;

pub use defaults::*;
pub use error::{ConfigError, ConfigResult};
pub use types::*;

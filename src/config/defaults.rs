/*!
 * 默认配置值
 */

/// 单次补全返回的最大建议数
pub const DEFAULT_MAX_SUGGESTIONS: usize = 15;

/// 补全路径的模糊匹配阈值
pub const DEFAULT_COMPLETION_FUZZY_THRESHOLD: f64 = 0.6;

/// 启用模糊匹配的最短查询长度
pub const DEFAULT_FUZZY_MIN_QUERY_LENGTH: usize = 2;

/// 参与补全的历史记录条数上限（从最新往前）
pub const DEFAULT_HISTORY_CANDIDATES: usize = 200;

/// 历史记录最大条数
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;

/// 重复命令的去抖窗口（毫秒）
pub const DEFAULT_DUPLICATE_WINDOW_MS: i64 = 1000;

/// 历史搜索的模糊匹配阈值（召回优先，低于补全阈值）
pub const DEFAULT_HISTORY_FUZZY_THRESHOLD: f64 = 0.3;

/// 搜索结果缓存容量
pub const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 100;

/// 默认搜索结果条数
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// 最近命令列表容量
pub const DEFAULT_RECENT_CAPACITY: usize = 50;

/// 持久化去抖间隔（毫秒）
pub const DEFAULT_FLUSH_INTERVAL_MS: i64 = 30_000;

pub const DEFAULT_HISTORY_KEY: &str = "console.history";
pub const DEFAULT_LEARNING_KEY: &str = "console.learning";

/// 正则表达式最大长度
pub const DEFAULT_MAX_PATTERN_LENGTH: usize = 256;

/// 正则编译产物大小上限（字节）
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/*!
 * 持久化模块
 *
 * - `PersistenceStore`：键值存储端口（内存 / 文件实现）
 * - `QueuedStore`：后台写入，保存操作不阻塞交互路径
 * - `PersistenceCoordinator`：快照序列化、去抖刷新与降级处理
 */

pub mod coordinator;
pub mod error;
pub mod store;
pub mod writer;

pub use coordinator::PersistenceCoordinator;
pub use error::{StorageError, StorageResult};
pub use store::{FileStore, MemoryStore, PersistenceStore};
pub use writer::QueuedStore;

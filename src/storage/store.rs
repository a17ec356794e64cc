//! 键值存储端口与实现

use super::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 持久化存储接口
///
/// 值统一为 JSON 文本，调用方负责序列化。
pub trait PersistenceStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 `None`
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入键值
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// 内存存储
///
/// 可设置字节配额，用于模拟浏览器存储的 quota 行为。
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带配额的内存存储（所有值的字节总和）
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// 当前占用的字节数
    pub fn total_bytes(&self) -> usize {
        self.data.lock().values().map(String::len).sum()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock();

        if let Some(limit) = self.quota_bytes {
            let others: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let size = others + value.len();
            if size > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 文件存储：每个键一个 JSON 文件
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// 在指定目录创建文件存储（目录不存在时自动创建）
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::io(format!("creating {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    /// 默认位置：用户数据目录下的 console-recall
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::internal("no data or home directory available"))?;
        Self::new(base.join("console-recall"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl PersistenceStore for FileStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(format!("reading {}", path.display()), e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        // 先写临时文件再重命名，避免写到一半时留下损坏的快照
        std::fs::write(&tmp_path, value)
            .map_err(|e| StorageError::io(format!("writing {}", tmp_path.display()), e))?;
        std::fs::rename(&tmp_path, &path)
            .map_err(|e| StorageError::io(format!("renaming to {}", path.display()), e))?;

        debug!(key = key, bytes = value.len(), "storage.file.saved");
        Ok(())
    }
}

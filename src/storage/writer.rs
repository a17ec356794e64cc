//! 后台写入存储
//!
//! 保存请求通过无界通道交给后台任务串行执行，调用方立即返回。
//! 后台任务惰性启动：首次保存时才 spawn，此时必须已经处于 tokio 运行时中；
//! 没有运行时则退化为同步写入。

use super::error::{StorageError, StorageResult};
use super::store::PersistenceStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug)]
struct WriteRequest {
    key: String,
    value: String,
}

/// 带后台写队列的存储包装器
pub struct QueuedStore {
    inner: Arc<dyn PersistenceStore>,
    sender: OnceLock<mpsc::UnboundedSender<WriteRequest>>,
    pending: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

impl QueuedStore {
    pub fn new(inner: Arc<dyn PersistenceStore>) -> Self {
        Self {
            inner,
            sender: OnceLock::new(),
            pending: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 尚未落盘的写请求数
    pub fn pending_writes(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// 后台写入失败次数
    pub fn failed_writes(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn ensure_started(&self) -> Option<&mpsc::UnboundedSender<WriteRequest>> {
        if let Some(sender) = self.sender.get() {
            return Some(sender);
        }

        let handle = Handle::try_current().ok()?;

        Some(self.sender.get_or_init(|| {
            let (sender, mut receiver) = mpsc::unbounded_channel::<WriteRequest>();
            let inner = Arc::clone(&self.inner);
            let pending = Arc::clone(&self.pending);
            let failures = Arc::clone(&self.failures);

            handle.spawn(async move {
                while let Some(request) = receiver.recv().await {
                    let store = Arc::clone(&inner);
                    let key = request.key.clone();
                    let result =
                        tokio::task::spawn_blocking(move || store.save(&request.key, &request.value))
                            .await;

                    match result {
                        Ok(Ok(())) => debug!(key = %key, "storage.queue.saved"),
                        Ok(Err(err)) => {
                            failures.fetch_add(1, Ordering::SeqCst);
                            warn!(key = %key, error = %err, "storage.queue.save_failed");
                        }
                        Err(err) => {
                            failures.fetch_add(1, Ordering::SeqCst);
                            warn!(key = %key, error = %err, "storage.queue.task_failed");
                        }
                    }
                    pending.fetch_sub(1, Ordering::SeqCst);
                }
            });

            sender
        }))
    }
}

impl PersistenceStore for QueuedStore {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        match self.ensure_started() {
            Some(sender) => {
                self.pending.fetch_add(1, Ordering::SeqCst);
                sender
                    .send(WriteRequest {
                        key: key.to_string(),
                        value: value.to_string(),
                    })
                    .map_err(|_| {
                        self.pending.fetch_sub(1, Ordering::SeqCst);
                        StorageError::WriterClosed
                    })
            }
            None => self.inner.save(key, value),
        }
    }
}

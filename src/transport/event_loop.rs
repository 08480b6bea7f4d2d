/// 事件循环组
///
/// 专用事件循环以规格形式交给传输层，由传输层按需创建并负责关闭；
/// 共享事件循环是调用方已在运行的 tokio 运行时，传输层只借用其句柄。

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

static POOL_NUMBER: AtomicUsize = AtomicUsize::new(0);

/// 线程命名策略
///
/// 生成的线程名形如 `<prefix>-<pool>-thread-<n>`。
#[derive(Debug, Clone)]
pub struct ThreadNamePolicy {
    prefix: String,
    pool: usize,
    next_thread: Arc<AtomicUsize>,
}

impl ThreadNamePolicy {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pool: POOL_NUMBER.fetch_add(1, Ordering::Relaxed),
            next_thread: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 下一个线程名
    pub fn next_name(&self) -> String {
        let thread = self.next_thread.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-thread-{}", self.prefix, self.pool, thread)
    }
}

/// 专用事件循环规格
///
/// 只描述事件循环，不持有任何线程。
#[derive(Debug, Clone, Default)]
pub struct EventLoopGroupSpec {
    number_of_threads: Option<NonZeroUsize>,
    thread_naming: Option<ThreadNamePolicy>,
}

impl EventLoopGroupSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置线程数
    pub fn with_number_of_threads(mut self, threads: NonZeroUsize) -> Self {
        self.number_of_threads = Some(threads);
        self
    }

    /// 设置线程命名策略
    pub fn with_thread_naming(mut self, naming: ThreadNamePolicy) -> Self {
        self.thread_naming = Some(naming);
        self
    }

    pub fn number_of_threads(&self) -> Option<NonZeroUsize> {
        self.number_of_threads
    }

    pub fn thread_naming(&self) -> Option<&ThreadNamePolicy> {
        self.thread_naming.as_ref()
    }

    /// 按规格创建多线程运行时，返回的运行时归调用方（传输层）所有
    pub fn build_runtime(&self) -> std::io::Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all();
        if let Some(threads) = self.number_of_threads {
            builder.worker_threads(threads.get());
        }
        if let Some(naming) = self.thread_naming.clone() {
            builder.thread_name_fn(move || naming.next_name());
        }
        builder.build()
    }
}

/// 共享事件循环
///
/// 只包装调用方的运行时句柄，不提供关闭操作。
#[derive(Debug, Clone)]
pub struct SharedEventLoopGroup {
    handle: Handle,
}

impl SharedEventLoopGroup {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_names_are_sequential() {
        let naming = ThreadNamePolicy::new("s3-io");
        let first = naming.next_name();
        let second = naming.next_name();
        assert!(first.starts_with("s3-io-"));
        assert!(first.ends_with("-thread-0"));
        assert!(second.ends_with("-thread-1"));
    }

    #[test]
    fn test_distinct_pools() {
        let a = ThreadNamePolicy::new("io");
        let b = ThreadNamePolicy::new("io");
        assert_ne!(a.next_name(), b.next_name());
    }

    #[test]
    fn test_build_runtime_from_spec() {
        let spec = EventLoopGroupSpec::new()
            .with_number_of_threads(NonZeroUsize::new(2).unwrap())
            .with_thread_naming(ThreadNamePolicy::new("dedicated"));
        let runtime = spec.build_runtime().unwrap();

        let name = runtime.block_on(async {
            tokio::spawn(async { std::thread::current().name().map(str::to_string) })
                .await
                .unwrap()
        });
        assert!(name.unwrap().starts_with("dedicated-"));
        runtime.shutdown_background();
    }

    #[tokio::test]
    async fn test_shared_group_borrows_handle() {
        let group = SharedEventLoopGroup::new(Handle::current());
        let value = group.handle().spawn(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::SceneError;

/// Asynchronous text fetcher that entities load their files through.
pub trait AssetSource {
    fn fetch_text(&self, name: &str) -> impl Future<Output = Result<String, SceneError>>;
}

/// Reads assets relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirectorySource {
    async fn fetch_text(&self, name: &str) -> Result<String, SceneError> {
        let path = self.root.join(name);
        info!("loading {}", path.display());
        std::fs::read_to_string(&path)
            .map_err(|error| SceneError::load_failure(path.display().to_string(), error))
    }
}

/// Assets held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl AssetSource for MemorySource {
    async fn fetch_text(&self, name: &str) -> Result<String, SceneError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::load_failure(name, "no such asset"))
    }
}

/// Sources that suspend mid-fetch, for exercising interleaved setups.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::{AssetSource, MemorySource};
    use crate::error::SceneError;

    /// Pending on the first poll, ready on the second.
    pub struct YieldOnce(bool);

    impl YieldOnce {
        pub fn new() -> Self {
            YieldOnce(false)
        }
    }

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Wraps a [`MemorySource`], suspending once per fetch and recording the
    /// order fetches started in.
    pub struct YieldingSource {
        inner: MemorySource,
        pub fetches: RefCell<Vec<String>>,
    }

    impl YieldingSource {
        pub fn new(inner: MemorySource) -> Self {
            Self {
                inner,
                fetches: RefCell::new(Vec::new()),
            }
        }
    }

    impl AssetSource for YieldingSource {
        async fn fetch_text(&self, name: &str) -> Result<String, SceneError> {
            self.fetches.borrow_mut().push(name.to_string());
            YieldOnce::new().await;
            self.inner.fetch_text(name).await
        }
    }
}

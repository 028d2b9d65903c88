use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

type InitFn<T> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<T>>> + Send + Sync>;

/// Process-wide handle to an external client, constructed on first use.
///
/// Concurrent first callers wait on a single initialization. A failed
/// initialization leaves the cell empty so the next call tries again.
pub struct LazyClient<T: ?Sized + Send + Sync> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
    init: InitFn<T>,
}

impl<T: ?Sized + Send + Sync + 'static> LazyClient<T> {
    pub fn new<F>(name: &'static str, init: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, anyhow::Result<Arc<T>>> + Send + Sync + 'static,
    {
        Self {
            name,
            cell: OnceCell::new(),
            init: Box::new(init),
        }
    }

    /// Get the client, initializing it if this is the first use.
    pub async fn get(&self) -> anyhow::Result<Arc<T>> {
        let client = self
            .cell
            .get_or_try_init(|| async {
                let result = (self.init)().await;
                match &result {
                    Ok(_) => info!("{} client initialized", self.name),
                    Err(e) => warn!("{} client initialization failed: {e}", self.name),
                }
                result
            })
            .await?;
        Ok(client.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

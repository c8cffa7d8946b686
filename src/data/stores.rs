//! Per-client store registry
//!
//! Each client gets its own SQLite file under the configured data
//! directory. Stores are opened lazily on first request. Stores left idle
//! past the configured TTL, or the least recently used ones once the registry
//! is over capacity, are closed; their files stay on disk and reopen on the
//! next request.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, RwLock};

use super::Database;
use crate::error::AppError;
use crate::metrics::CLIENT_STORES_OPEN;

/// Identity a store is keyed by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Filesystem-safe key, e.g. `127.0.0.1` or `--1` for `::1`.
    pub fn from_ip(ip: IpAddr) -> Self {
        let key = ip
            .to_string()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '-' })
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds on the number of stores held open
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    /// Open stores kept before the least recently used are closed
    pub max_open: usize,
    /// Stores unused for this long are closed by [`ClientStores::prune_idle`]
    pub idle_ttl: Duration,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_open: 256,
            idle_ttl: Duration::from_secs(600),
        }
    }
}

/// Registry slot for one client
struct OpenStore {
    /// Filled once the store is connected
    cell: Arc<OnceCell<Arc<Database>>>,
    last_used: Instant,
}

impl OpenStore {
    fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            last_used: Instant::now(),
        }
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.last_used.elapsed() >= ttl
    }

    /// Nobody outside the registry is opening or using the store.
    fn is_evictable(&self) -> bool {
        Arc::strong_count(&self.cell) == 1
            && self.cell.get().is_none_or(|db| Arc::strong_count(db) == 1)
    }
}

/// Lazily opened client stores
pub struct ClientStores {
    data_dir: PathBuf,
    limits: StoreLimits,
    stores: RwLock<HashMap<ClientId, OpenStore>>,
}

impl ClientStores {
    pub fn new(data_dir: impl Into<PathBuf>, limits: StoreLimits) -> Self {
        Self {
            data_dir: data_dir.into(),
            limits,
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File backing `client`'s store
    pub fn path_for(&self, client: &ClientId) -> PathBuf {
        self.data_dir.join(format!("{}.db", client.as_str()))
    }

    /// Number of stores currently held open
    pub async fn open_count(&self) -> usize {
        self.stores
            .read()
            .await
            .values()
            .filter(|slot| slot.cell.initialized())
            .count()
    }

    /// Store for `client`, created and seeded if this is its first visit.
    ///
    /// The registry lock only guards the slot lookup; connecting happens
    /// outside it, serialized per client by the slot's cell.
    pub async fn open(&self, client: &ClientId) -> Result<Arc<Database>, AppError> {
        let cell = {
            let mut stores = self.stores.write().await;
            let slot = stores.entry(client.clone()).or_insert_with(OpenStore::new);
            slot.last_used = Instant::now();
            Arc::clone(&slot.cell)
        };

        let was_open = cell.initialized();
        let path = self.path_for(client);
        let db = cell
            .get_or_try_init(|| async move {
                let db = Database::connect(&path).await?;
                tracing::info!(path = %path.display(), "Client store opened");
                Ok::<_, AppError>(Arc::new(db))
            })
            .await
            .map(Arc::clone)?;
        drop(cell);

        if !was_open {
            self.enforce_capacity().await;
        }

        Ok(db)
    }

    /// Close stores unused for longer than the idle TTL.
    ///
    /// # Returns
    /// Number of stores closed
    pub async fn prune_idle(&self) -> usize {
        let ttl = self.limits.idle_ttl;
        let evicted = {
            let mut stores = self.stores.write().await;
            let idle: Vec<ClientId> = stores
                .iter()
                .filter(|(_, slot)| slot.is_idle(ttl) && slot.is_evictable())
                .map(|(client, _)| client.clone())
                .collect();
            let evicted = remove_slots(&mut stores, &idle);
            update_gauge(&stores);
            evicted
        };

        let closed = close_evicted(evicted).await;
        if closed > 0 {
            tracing::info!(closed, "Pruned idle client stores");
        }
        closed
    }

    /// Close the least recently used stores while over capacity.
    async fn enforce_capacity(&self) {
        let evicted = {
            let mut stores = self.stores.write().await;
            let excess = stores.len().saturating_sub(self.limits.max_open);
            let mut candidates: Vec<(&ClientId, Instant)> = stores
                .iter()
                .filter(|(_, slot)| slot.is_evictable())
                .map(|(client, slot)| (client, slot.last_used))
                .collect();
            candidates.sort_by_key(|(_, last_used)| *last_used);
            let oldest: Vec<ClientId> = candidates
                .into_iter()
                .take(excess)
                .map(|(client, _)| client.clone())
                .collect();

            if oldest.len() < excess {
                tracing::warn!(
                    open = stores.len(),
                    max_open = self.limits.max_open,
                    "Client store capacity exceeded by stores in use"
                );
            }
            let evicted = remove_slots(&mut stores, &oldest);
            update_gauge(&stores);
            evicted
        };

        let closed = close_evicted(evicted).await;
        if closed > 0 {
            tracing::debug!(closed, "Closed least recently used client stores");
        }
    }

    /// Close every open store.
    pub async fn close_all(&self) {
        let evicted: Vec<Arc<Database>> = {
            let mut stores = self.stores.write().await;
            let drained = stores
                .drain()
                .filter_map(|(_, slot)| slot.cell.get().cloned())
                .collect();
            update_gauge(&stores);
            drained
        };
        close_evicted(evicted).await;
    }
}

fn remove_slots(stores: &mut HashMap<ClientId, OpenStore>, clients: &[ClientId]) -> Vec<Arc<Database>> {
    clients
        .iter()
        .filter_map(|client| stores.remove(client))
        .filter_map(|slot| slot.cell.get().cloned())
        .collect()
}

fn update_gauge(stores: &HashMap<ClientId, OpenStore>) {
    let open = stores.values().filter(|slot| slot.cell.initialized()).count();
    CLIENT_STORES_OPEN.set(open as i64);
}

async fn close_evicted(evicted: Vec<Arc<Database>>) -> usize {
    let closed = evicted.len();
    for db in evicted {
        db.close().await;
    }
    closed
}

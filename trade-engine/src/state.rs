//! Persisted engine state and its access handle

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use common::error::Result;
use common::model::order::{Order, OrderId};
use common::model::trade::{TradeRecord, TradeSummary};

/// Everything the engine persists between runs: the local account's own
/// orders, its active trades and the archive of finished ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// The local account name (without the "p/" prefix)
    pub account: String,
    /// Next id to assign to a newly created own order
    pub next_free_id: OrderId,
    /// Our own orders, keyed by id
    #[serde(default)]
    pub own_orders: BTreeMap<OrderId, Order>,
    /// Active (non-archived) trades
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    /// Finished trades, reduced to their public summaries
    #[serde(default)]
    pub archive: Vec<TradeSummary>,
}

/// Shared handle to the engine state.
///
/// Guards are plain `std::sync` guards and must not be held across await
/// points; all RPC happens between lock scopes.
pub struct StateHandle {
    inner: RwLock<State>,
    path: Option<PathBuf>,
}

impl StateHandle {
    /// A fresh in-memory state for the given account, not backed by disk.
    pub fn in_memory(account: impl Into<String>) -> Self {
        StateHandle {
            inner: RwLock::new(State {
                account: account.into(),
                ..Default::default()
            }),
            path: None,
        }
    }

    /// Opens the state file at `path`, creating a fresh state for
    /// `account` if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, account: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let account = account.into();

        let state = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let state: State = serde_json::from_str(&data)?;
            info!(
                path = %path.display(),
                trades = state.trades.len(),
                orders = state.own_orders.len(),
                "loaded engine state"
            );
            state
        } else {
            debug!(path = %path.display(), "no state file, starting fresh");
            State {
                account,
                ..Default::default()
            }
        };

        Ok(StateHandle {
            inner: RwLock::new(state),
            path: Some(path),
        })
    }

    /// Read access to the state.
    pub fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read().unwrap()
    }

    /// Write access to the state.
    pub fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write().unwrap()
    }

    /// Writes the current state to disk (if a path is configured).  The
    /// file is replaced atomically via a sibling temp file.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = {
            let state = self.read();
            serde_json::to_string_pretty(&*state)?
        };

        let tmp = tmp_path(path);
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "persisted engine state");

        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

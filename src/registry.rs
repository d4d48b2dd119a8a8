use crate::error::Result;
use crate::factors::FactorTable;
use log::info;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Shared handle to the current emission factor table.
///
/// Hands out `Arc` snapshots; `reload` swaps the whole table reference, so
/// readers holding a snapshot keep resolving against the table they started
/// with and never observe a partially loaded one. Reload is an explicit
/// administrative action, never automatic.
pub struct FactorRegistry {
    current: RwLock<Arc<FactorTable>>,
}

impl FactorRegistry {
    pub fn new(table: FactorTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FactorTable::load_from_path(path)?))
    }

    /// The current table. Cheap; safe to call per request.
    pub fn snapshot(&self) -> Arc<FactorTable> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn reload(&self, table: FactorTable) {
        info!(
            "Reloading emission factor table: v{} ({} entries)",
            table.version(),
            table.len()
        );
        let next = Arc::new(table);
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.reload(FactorTable::load_from_path(path)?);
        Ok(())
    }
}

use crate::config::BacklogConfig;
use crate::error::{IndexerError, Result};
use crate::index::ItemIndex;
use crate::registry::AgentRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which caches are currently built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    pub agents: bool,
    pub items: bool,
    /// Builds performed over the session's lifetime
    pub builds: usize,
}

/// Immutable view handed to one validation or analytics run
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub agents: Arc<AgentRegistry>,
    pub items: Arc<ItemIndex>,
}

/// Session-owned agent registry and item index.
///
/// Both start absent, are built on first use and stay valid until
/// [`IndexCache::invalidate`]. Runs take a [`CacheSnapshot`] up front, so a
/// rebuild never happens halfway through one.
#[derive(Debug)]
pub struct IndexCache {
    root: PathBuf,
    config: BacklogConfig,
    agents: Option<Arc<AgentRegistry>>,
    items: Option<Arc<ItemIndex>>,
    builds: usize,
}

impl IndexCache {
    pub fn open(root: &Path, config: BacklogConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(IndexerError::MissingRoot(root.to_path_buf()));
        }
        config.validate().map_err(IndexerError::InvalidConfig)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            agents: None,
            items: None,
            builds: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BacklogConfig {
        &self.config
    }

    /// Rebuild both caches unconditionally
    pub fn build(&mut self) -> Result<CacheSnapshot> {
        let agents = Arc::new(AgentRegistry::build(&self.root, &self.config)?);
        let items = Arc::new(ItemIndex::build(&self.root, &self.config)?);
        self.agents = Some(Arc::clone(&agents));
        self.items = Some(Arc::clone(&items));
        self.builds += 1;
        Ok(CacheSnapshot { agents, items })
    }

    /// Current snapshot, building whichever cache is absent
    pub fn get_or_build(&mut self) -> Result<CacheSnapshot> {
        Ok(CacheSnapshot {
            agents: self.agents()?,
            items: self.items()?,
        })
    }

    pub fn agents(&mut self) -> Result<Arc<AgentRegistry>> {
        if let Some(agents) = &self.agents {
            return Ok(Arc::clone(agents));
        }
        let agents = Arc::new(AgentRegistry::build(&self.root, &self.config)?);
        self.agents = Some(Arc::clone(&agents));
        self.builds += 1;
        Ok(agents)
    }

    pub fn items(&mut self) -> Result<Arc<ItemIndex>> {
        if let Some(items) = &self.items {
            return Ok(Arc::clone(items));
        }
        let items = Arc::new(ItemIndex::build(&self.root, &self.config)?);
        self.items = Some(Arc::clone(&items));
        self.builds += 1;
        Ok(items)
    }

    /// Drop both caches; returns what was built before clearing
    pub fn invalidate(&mut self) -> CacheState {
        let before = self.state();
        self.agents = None;
        self.items = None;
        log::debug!(
            "Cleared caches (agents: {}, items: {})",
            before.agents,
            before.items
        );
        before
    }

    pub fn state(&self) -> CacheState {
        CacheState {
            agents: self.agents.is_some(),
            items: self.items.is_some(),
            builds: self.builds,
        }
    }
}

pub mod domain;
mod services;

pub use domain::{CommandAction, CommandRequest, CommandResponse};

use anyhow::Result;
use backlog_indexer::{BacklogConfig, CacheSnapshot, IndexCache, IndexerError};
use chrono::NaiveDateTime;
use domain::{error_response, CommandError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One CLI invocation: requests executed through a session share its caches
/// until a `clear_caches` request drops them.
pub struct Session {
    root: PathBuf,
    config_path: Option<PathBuf>,
    now: NaiveDateTime,
    cache: Option<IndexCache>,
}

/// Everything an action reads, taken once per request
pub(crate) struct RunContext {
    pub snapshot: CacheSnapshot,
    pub config: BacklogConfig,
    pub now: NaiveDateTime,
}

impl Session {
    pub fn new(root: PathBuf, config_path: Option<PathBuf>, now: NaiveDateTime) -> Self {
        Self {
            root,
            config_path,
            now,
            cache: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn execute(&mut self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest { action, payload } = request;

        let response = match services::route(self, action, payload) {
            Ok(outcome) => CommandResponse::ok(outcome.data),
            Err(err) => {
                log::debug!("{} failed: {err:#}", action.as_str());
                error_response(err, Some(action))
            }
        };
        log::debug!(
            "{} finished in {} ms",
            action.as_str(),
            started.elapsed().as_millis()
        );
        response
    }

    /// Execute a request that has not been deserialized yet
    pub fn execute_value(&mut self, raw: Value) -> CommandResponse {
        match serde_json::from_value::<CommandRequest>(raw) {
            Ok(request) => self.execute(request),
            Err(err) => error_response(CommandError::InvalidRequest(err.to_string()).into(), None),
        }
    }

    /// Open the cache on first use; config errors surface here
    fn open(&mut self) -> Result<&mut IndexCache> {
        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => {
                if !self.root.is_dir() {
                    return Err(IndexerError::MissingRoot(self.root.clone()).into());
                }
                let config = match &self.config_path {
                    Some(path) => BacklogConfig::load_from(path).map_err(|err| match err {
                        IndexerError::IoError(io) => {
                            IndexerError::InvalidConfig(format!("{}: {io}", path.display()))
                        }
                        other => other,
                    })?,
                    None => BacklogConfig::load(&self.root)?,
                };
                IndexCache::open(&self.root, config)?
            }
        };
        Ok(self.cache.insert(cache))
    }

    pub(crate) fn config(&mut self) -> Result<BacklogConfig> {
        Ok(self.open()?.config().clone())
    }

    pub(crate) fn context(&mut self) -> Result<RunContext> {
        let now = self.now;
        let cache = self.open()?;
        Ok(RunContext {
            snapshot: cache.get_or_build()?,
            config: cache.config().clone(),
            now,
        })
    }

    /// Drop built caches; a session that never opened reports nothing dropped
    pub(crate) fn invalidate(&mut self) -> (bool, bool) {
        match self.cache.as_mut() {
            Some(cache) => {
                let before = cache.invalidate();
                (before.agents, before.items)
            }
            None => (false, false),
        }
    }
}

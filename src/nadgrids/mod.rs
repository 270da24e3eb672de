//!
//! Grid-shift provider: loading and caching NTv2 correction grids
//!
//! Grid loading is an external collaborator, not a process-global singleton:
//! callers inject a [`GridProvider`] implementation rather than the core
//! reaching into a static catalog. [`MemoryGridProvider`] is the default
//! implementation, reading grids from the filesystem or from bytes supplied
//! directly, caching decoded grids behind a read/write lock so concurrent
//! first-access converges on a single decoded instance.
pub(crate) mod grid;
mod ntv2;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::errors::{Error, Result};
use crate::transform::Direction;

pub use grid::{GridFile, Lp, Subgrid};
pub use ntv2::decode_ntv2;

/// A source of named grid-shift tables.
///
/// Implementations may load from disk, from an embedded byte blob, or
/// fetch from a remote service; the core never assumes any particular
/// transport.
pub trait GridProvider: Send + Sync {
    /// Return the decoded grid named `name`, or `None` if unavailable.
    fn get(&self, name: &str) -> Result<Option<Arc<GridFile>>>;
}

/// A [`GridProvider`] that loads NTv2 files from a directory on disk (or
/// from bytes registered directly with [`MemoryGridProvider::register`]),
/// caching decoded grids in memory for the life of the process.
#[derive(Default)]
pub struct MemoryGridProvider {
    dir: Option<PathBuf>,
    cache: RwLock<HashMap<String, Arc<GridFile>>>,
}

impl MemoryGridProvider {
    /// Create a provider that resolves grid names against files below `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty provider; grids must be registered with
    /// [`Self::register`] before use.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode `bytes` as an NTv2 grid and register it under `name`,
    /// overwriting any previous entry.
    pub fn register(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let grid = decode_ntv2(bytes)?;
        self.cache
            .write()
            .unwrap()
            .insert(name.to_string(), Arc::new(grid));
        Ok(())
    }
}

impl GridProvider for MemoryGridProvider {
    fn get(&self, name: &str) -> Result<Option<Arc<GridFile>>> {
        if let Some(grid) = self.cache.read().unwrap().get(name) {
            return Ok(Some(Arc::clone(grid)));
        }

        let Some(dir) = &self.dir else { return Ok(None) };
        let path = dir.join(name);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)?;
        let grid = Arc::new(decode_ntv2(&bytes)?);

        let mut cache = self.cache.write().unwrap();
        // Another thread may have loaded it while we read from disk.
        let grid = cache.entry(name.to_string()).or_insert(grid);
        Ok(Some(Arc::clone(grid)))
    }
}

/// The list of named grids configured by a `+nadgrids=` parameter,
/// resolved against a [`GridProvider`].
///
/// Mirrors the `@name,@name,...` syntax: a `@`-prefixed name is optional
/// (missing grids are silently skipped), a bare name is mandatory (its
/// absence is an error), and the list may be terminated early by `@null`.
pub struct NadGrids(Vec<Arc<GridFile>>);

impl std::fmt::Debug for NadGrids {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NadGrids({} grid(s))", self.0.len())
    }
}

impl PartialEq for NadGrids {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_empty() && other.0.is_empty()
    }
}

impl NadGrids {
    pub fn new_grid_transform(names: &str, provider: &dyn GridProvider) -> Result<Self> {
        let mut grids = Vec::new();

        for tok in names.split(',') {
            let tok = tok.trim();
            if tok == "@null" || tok == "null" {
                break;
            } else if let Some(name) = tok.strip_prefix('@') {
                if let Some(g) = provider.get(name)? {
                    grids.push(g);
                }
            } else if let Some(g) = provider.get(tok)? {
                grids.push(g);
            } else {
                return Err(Error::NadGridNotAvailable);
            }
        }

        Ok(Self(grids))
    }

    pub fn apply_shift(&self, dir: Direction, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        self.0
            .iter()
            .find_map(|g| g.find_subgrid(lam, phi).map(|_| g))
            .ok_or(Error::PointOutsideNadShiftArea)?
            .apply_shift(dir, lam, phi, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_provider_register_and_get() {
        let provider = MemoryGridProvider::empty();
        assert!(provider.get("missing.gsb").unwrap().is_none());
    }

    #[test]
    fn nadgrids_null_terminates() {
        let provider = MemoryGridProvider::empty();
        let g = NadGrids::new_grid_transform("@missing,@null", &provider).unwrap();
        assert!(g.0.is_empty());
    }

    #[test]
    fn nadgrids_mandatory_missing_errors() {
        let provider = MemoryGridProvider::empty();
        assert!(NadGrids::new_grid_transform("missing.gsb", &provider).is_err());
    }
}

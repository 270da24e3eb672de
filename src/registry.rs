//!
//! Named-CRS registry: `AUTHORITY:CODE` (or bare alias) to a canonical
//! PROJ-string definition.
//!
//! Unlike the teacher's nadgrids catalogue (a process-wide `lazy_static`
//! behind a `multi-thread` feature split), this is an instance struct: an
//! embedding application may hold several independent registries. It
//! still mirrors the teacher's primitive choice for the feature split —
//! `RwLock` when `multi-thread` is on (the default), `RefCell` otherwise
//! — since a registry is read-mostly with occasional writes from
//! `register`/remote resolution.
//!
//! Entries store PROJ-string *text*, not a parsed [`crate::proj::Proj`]:
//! `ParamList` borrows from the string it was parsed from, so caching a
//! parsed `Proj` and its backing text together would require a
//! self-referential struct. Re-parsing on every [`Registry::get`] call is
//! cheap relative to a full reprojection and keeps the registry simple.
//!
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::proj::Proj;
use crate::{projjson, wkt};

#[cfg(feature = "multi-thread")]
use std::collections::HashMap;
#[cfg(feature = "multi-thread")]
use std::sync::RwLock;

#[cfg(not(feature = "multi-thread"))]
use std::cell::RefCell;
#[cfg(not(feature = "multi-thread"))]
use std::collections::HashMap;

/// Outcome of a remote authority-code lookup, supplied by the caller to
/// [`Registry::get_with`].
pub enum RemoteLookup {
    Found(String),
    NotFound,
    NetworkError(String),
}

#[cfg(feature = "multi-thread")]
#[derive(Debug, Default)]
struct Table(RwLock<HashMap<String, Arc<str>>>);

#[cfg(not(feature = "multi-thread"))]
#[derive(Debug, Default)]
struct Table(RefCell<HashMap<String, Arc<str>>>);

impl Table {
    fn get(&self, key: &str) -> Option<Arc<str>> {
        #[cfg(feature = "multi-thread")]
        {
            self.0.read().unwrap().get(key).cloned()
        }
        #[cfg(not(feature = "multi-thread"))]
        {
            self.0.borrow().get(key).cloned()
        }
    }

    fn contains(&self, key: &str) -> bool {
        #[cfg(feature = "multi-thread")]
        {
            self.0.read().unwrap().contains_key(key)
        }
        #[cfg(not(feature = "multi-thread"))]
        {
            self.0.borrow().contains_key(key)
        }
    }

    fn insert(&self, key: String, value: Arc<str>) {
        #[cfg(feature = "multi-thread")]
        {
            self.0.write().unwrap().insert(key, value);
        }
        #[cfg(not(feature = "multi-thread"))]
        {
            self.0.borrow_mut().insert(key, value);
        }
    }
}

/// A named-CRS registry: `code -> canonical PROJ-string` map, with
/// built-in EPSG entries seeded on construction.
#[derive(Debug, Default)]
pub struct Registry {
    table: Table,
}

/// Normalise `"epsg:4326"`, `"EPSG :4326"`, `" epsg:4326 "` etc to
/// `"EPSG:4326"`; a bare alias like `"WGS84"` is upper-cased and returned
/// unchanged (no `:`).
fn normalize_code(code: &str) -> String {
    let code = code.trim();
    match code.split_once(':') {
        Some((authority, id)) => format!("{}:{}", authority.trim().to_ascii_uppercase(), id.trim()),
        None => code.to_ascii_uppercase(),
    }
}

fn is_authority_pattern(code: &str) -> bool {
    code.contains(':')
}

impl Registry {
    /// A registry with the spec-mandated built-in EPSG entries.
    pub fn new() -> Self {
        let reg = Self {
            table: Table::default(),
        };
        reg.seed_builtin();
        reg
    }

    /// An empty registry with no built-in entries.
    pub fn empty() -> Self {
        Self {
            table: Table::default(),
        }
    }

    /// Register a CRS definition under `name` (a bare alias or an
    /// `AUTHORITY:CODE` string). `definition` may be a PROJ string
    /// (`+proj=...`), WKT1/WKT2 (`GEOGCS[...`/`PROJCS[...`), or PROJJSON
    /// (`{"type": ...}`), detected from its first non-whitespace byte.
    pub fn register(&self, name: &str, definition: &str) -> Result<()> {
        let key = normalize_code(name);
        if self.table.contains(&key) {
            return Err(Error::DuplicateRegistryEntry(key));
        }
        let proj_string = to_proj_string(definition)?;
        self.table.insert(key, Arc::from(proj_string));
        Ok(())
    }

    /// Look up `code`, without any remote-fetch fallback.
    pub fn get(&self, code: &str) -> Result<Proj> {
        self.get_with(code, |_| RemoteLookup::NotFound)
    }

    /// Look up `code`; on a local miss for an `AUTHORITY:CODE`-shaped
    /// code, consult `remote` before giving up.
    pub fn get_with<F>(&self, code: &str, remote: F) -> Result<Proj>
    where
        F: FnOnce(&str) -> RemoteLookup,
    {
        let key = normalize_code(code);

        if let Some(text) = self.table.get(&key) {
            return Proj::from_proj_string(&text);
        }

        if !is_authority_pattern(&key) {
            return Err(Error::UnknownCrsName(key));
        }

        match remote(&key) {
            RemoteLookup::Found(definition) => {
                let proj_string = to_proj_string(&definition)?;
                self.table.insert(key, Arc::from(proj_string.as_str()));
                Proj::from_proj_string(&proj_string)
            }
            RemoteLookup::NotFound => Err(Error::UnknownCrsName(key)),
            RemoteLookup::NetworkError(msg) => Err(Error::RemoteResolutionError(msg)),
        }
    }

    fn seed(&self, name: &str, proj_string: &str) {
        self.table
            .insert(normalize_code(name), Arc::from(proj_string));
    }

    fn seed_builtin(&self) {
        self.seed("EPSG:4326", "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs");
        self.seed("WGS84", "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs");
        self.seed(
            "EPSG:4269",
            "+proj=longlat +ellps=GRS80 +datum=NAD83 +no_defs",
        );

        const WEBMERC: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 \
             +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs";
        for alias in [
            "EPSG:3857",
            "GOOGLE",
            "EPSG:3785",
            "EPSG:900913",
            "EPSG:102113",
        ] {
            self.seed(alias, WEBMERC);
        }

        for zone in 1..=60u32 {
            self.seed(
                &format!("EPSG:{}", 32600 + zone),
                &format!("+proj=utm +zone={zone} +ellps=WGS84 +datum=WGS84 +units=m +no_defs"),
            );
            self.seed(
                &format!("EPSG:{}", 32700 + zone),
                &format!("+proj=utm +zone={zone} +south +ellps=WGS84 +datum=WGS84 +units=m +no_defs"),
            );
        }

        self.seed("EPSG:5041", "+proj=ups +ellps=WGS84 +units=m +no_defs");
        self.seed(
            "EPSG:5042",
            "+proj=ups +south +ellps=WGS84 +units=m +no_defs",
        );
    }
}

/// Detect a CRS definition's textual format from its first non-whitespace
/// character and render it as an equivalent PROJ string.
pub fn to_proj_string(text: &str) -> Result<String> {
    match text.trim_start().as_bytes().first() {
        Some(b'+') => Ok(text.trim().to_string()),
        Some(b'{') => projjson::to_proj_string(text),
        Some(_) => wkt::to_proj_string(text),
        None => Err(Error::UnrecognizedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builtin_wgs84() {
        let reg = Registry::new();
        let p = reg.get("EPSG:4326").unwrap();
        assert!(p.is_latlong());
        let p2 = reg.get("epsg:4326").unwrap();
        assert!(p2.is_latlong());
    }

    #[test]
    fn registry_builtin_utm() {
        let reg = Registry::new();
        let p = reg.get("EPSG:32631").unwrap();
        let (x, y, _) = p.forward(3.0_f64.to_radians(), 50.0_f64.to_radians(), 0.).unwrap();
        assert!(x > 0. && y > 0.);
    }

    #[test]
    fn registry_unknown_bare_alias_fails_without_network() {
        let reg = Registry::new();
        let err = reg.get("NOT_A_REAL_ALIAS").unwrap_err();
        assert!(matches!(err, Error::UnknownCrsName(_)));
    }

    #[test]
    fn registry_duplicate_register_fails() {
        let reg = Registry::empty();
        reg.register("MY:1", "+proj=longlat +ellps=WGS84").unwrap();
        let err = reg.register("MY:1", "+proj=longlat +ellps=WGS84").unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistryEntry(_)));
    }

    #[test]
    fn registry_remote_fetch_fallback() {
        let reg = Registry::empty();
        let p = reg
            .get_with("EPSG:99999", |_| {
                RemoteLookup::Found("+proj=longlat +ellps=WGS84".to_string())
            })
            .unwrap();
        assert!(p.is_latlong());
        // Cached after first resolution: a `NotFound` remote this time
        // must not be consulted.
        let p2 = reg.get_with("EPSG:99999", |_| RemoteLookup::NotFound).unwrap();
        assert!(p2.is_latlong());
    }

    #[test]
    fn registry_remote_network_error_propagates() {
        let reg = Registry::empty();
        let err = reg
            .get_with("EPSG:88888", |_| RemoteLookup::NetworkError("timeout".into()))
            .unwrap_err();
        assert!(matches!(err, Error::RemoteResolutionError(_)));
    }

    #[test]
    fn registry_register_wkt() {
        let reg = Registry::empty();
        reg.register(
            "MY:2",
            r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],UNIT["degree",0.0174532925199433]]"#,
        )
        .unwrap();
        let p = reg.get("MY:2").unwrap();
        assert!(p.is_latlong());
    }
}

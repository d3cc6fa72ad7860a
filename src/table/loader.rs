//! Lazy, single-flight loading of the reference table.
//!
//! Sources are tried in order; an I/O error, a non-success HTTP status or a
//! payload that fails to parse moves on to the next one. The first table that
//! loads is cached until [`TableLoader::reset`] is called.

use crate::table::ReferenceTable;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{IconScanError, IconScanResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// File name of the serialized reference table.
pub const DEFAULT_TABLE_FILE: &str = "icon-hashes.json";

/// One location the reference table may be read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableSource {
    /// JSON file on the local filesystem.
    File(PathBuf),
    /// JSON payload held in memory (e.g. embedded with `include_str!`).
    Inline(String),
    /// JSON document fetched over HTTP(S).
    #[cfg(feature = "http")]
    Url(String),
}

impl TableSource {
    fn fetch(&self) -> Result<String, String> {
        match self {
            TableSource::File(path) => fs::read_to_string(path).map_err(|err| err.to_string()),
            TableSource::Inline(text) => Ok(text.clone()),
            #[cfg(feature = "http")]
            TableSource::Url(url) => fetch_url(url),
        }
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::File(path) => write!(f, "{}", path.display()),
            TableSource::Inline(_) => write!(f, "<inline>"),
            #[cfg(feature = "http")]
            TableSource::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(feature = "http")]
fn fetch_url(url: &str) -> Result<String, String> {
    let response = reqwest::blocking::get(url).map_err(|err| err.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }
    response.text().map_err(|err| err.to_string())
}

/// Process-lifetime cache around an ordered list of table sources.
///
/// Construct one loader and share it between scans; concurrent first calls
/// to [`TableLoader::ensure_loaded`] block on the same fetch.
pub struct TableLoader {
    sources: Vec<TableSource>,
    cached: Mutex<Option<Arc<ReferenceTable>>>,
}

impl TableLoader {
    /// Creates a loader that tries `sources` in order.
    pub fn new(sources: Vec<TableSource>) -> Self {
        Self {
            sources,
            cached: Mutex::new(None),
        }
    }

    /// Creates a loader over the conventional locations under `root`:
    /// `root/icon-hashes.json`, `/icon-hashes.json`, then
    /// `root/public/icon-hashes.json`.
    pub fn with_default_sources<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self::new(vec![
            TableSource::File(root.join(DEFAULT_TABLE_FILE)),
            TableSource::File(Path::new("/").join(DEFAULT_TABLE_FILE)),
            TableSource::File(root.join("public").join(DEFAULT_TABLE_FILE)),
        ])
    }

    /// Creates a loader pre-seeded with an already built table.
    pub fn from_table(table: ReferenceTable) -> Self {
        Self {
            sources: Vec::new(),
            cached: Mutex::new(Some(Arc::new(table))),
        }
    }

    /// Returns the configured sources in try order.
    pub fn sources(&self) -> &[TableSource] {
        &self.sources
    }

    /// Returns true once a table has been loaded and cached.
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Drops the cached table so the next call reloads from the sources.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    /// Returns the cached table, loading it on first use.
    pub fn ensure_loaded(&self) -> IconScanResult<Arc<ReferenceTable>> {
        let mut cached = self.lock();
        if let Some(table) = cached.as_ref() {
            return Ok(Arc::clone(table));
        }

        let _span = trace_span!("load_table", sources = self.sources.len()).entered();
        let mut attempts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let label = source.to_string();
            let parsed = source.fetch().and_then(|text| {
                ReferenceTable::from_json_str(&text).map_err(|err| err.to_string())
            });
            match parsed {
                Ok(table) => {
                    trace_event!("table_loaded", entries = table.len(), source = label.as_str());
                    let table = Arc::new(table);
                    *cached = Some(Arc::clone(&table));
                    return Ok(table);
                }
                Err(reason) => {
                    trace_warn!(
                        "table_source_failed",
                        source = label.as_str(),
                        reason = reason.as_str()
                    );
                    attempts.push(format!("{label}: {reason}"));
                }
            }
        }

        if attempts.is_empty() {
            attempts.push("no sources configured".to_string());
        }
        Err(IconScanError::TableUnavailable { attempts })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<ReferenceTable>>> {
        self.cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for TableLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLoader")
            .field("sources", &self.sources)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

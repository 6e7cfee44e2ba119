use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::Pattern;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::StorageError;
use crate::core::session::{ConsoleSession, SessionError};

pub const CACHE_VERSION: u32 = 1;

/// Lists every variable and command with `name : value : flags : description` rows.
pub const INTROSPECTION_COMMAND: &str = "cvarlist";

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    #[serde(default)]
    complete: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How `load` obtained the names.
#[derive(Debug)]
pub enum CacheLoad {
    /// Read from the persisted cache file.
    Loaded(usize),
    /// No cache file yet; built from the server.
    Built(usize),
    /// The cache file was unusable; rebuilt from the server.
    Regenerated { names: usize, cause: StorageError },
}

impl CacheLoad {
    pub fn len(&self) -> usize {
        match self {
            CacheLoad::Loaded(n) | CacheLoad::Built(n) => *n,
            CacheLoad::Regenerated { names, .. } => *names,
        }
    }
}

/// Remote command names used for completion and `search`, persisted per host.
#[derive(Debug, Clone)]
pub struct AutocompleteCache {
    dir: PathBuf,
    host: Option<String>,
    names: Vec<String>,
}

impl AutocompleteCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            host: None,
            names: Vec::new(),
        }
    }

    /// `complete_raw_<host>.json`, with anything unsafe in a file name replaced.
    pub fn path_for(&self, host: &str) -> PathBuf {
        let safe: String = host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("complete_raw_{safe}.json"))
    }

    /// Names in the order the server listed them.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Host the in-memory names belong to.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Forgets the names of any previous host. Until a load succeeds the
    /// cache is empty for `host`.
    pub fn reset(&mut self, host: &str) {
        if self.host.as_deref() != Some(host) {
            debug!("Dropping cached names for {:?}", self.host);
        }
        self.host = Some(host.to_string());
        self.names.clear();
    }

    pub fn read(&self, host: &str) -> Result<Vec<String>, StorageError> {
        read_document(&self.path_for(host))
    }

    fn write(&self, host: &str) -> Result<(), StorageError> {
        let path = self.path_for(host);
        let document = CacheDocument {
            version: CACHE_VERSION,
            complete: self.names.clone(),
        };
        let json = serde_json::to_string(&document).map_err(|source| StorageError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| StorageError::io(&path, e))
    }

    /// Populates the names for the session's host from disk, rebuilding from
    /// the server when the file is missing or unusable.
    pub async fn load(&mut self, session: &mut ConsoleSession) -> Result<CacheLoad, CacheError> {
        let host = session
            .host()
            .ok_or(SessionError::NotConnected)?
            .to_string();
        self.reset(&host);
        match self.read(&host) {
            Ok(names) => {
                debug!("Loaded {} cached names for {host}", names.len());
                self.host = Some(host);
                self.names = names;
                Ok(CacheLoad::Loaded(self.names.len()))
            }
            Err(e) if e.is_missing() => {
                info!("No autocomplete cache for {host}, building one");
                Ok(CacheLoad::Built(self.rebuild(session).await?))
            }
            Err(cause) => {
                warn!("Autocomplete cache for {host} unusable ({cause}), regenerating");
                let names = self.rebuild(session).await?;
                Ok(CacheLoad::Regenerated { names, cause })
            }
        }
    }

    /// Replaces the names for the session's host with a fresh introspection
    /// listing, in memory and on disk.
    pub async fn rebuild(&mut self, session: &mut ConsoleSession) -> Result<usize, CacheError> {
        let host = session
            .host()
            .ok_or(SessionError::NotConnected)?
            .to_string();
        info!("Caching autocomplete for {host}");
        let raw = session.dispatch(INTROSPECTION_COMMAND).await?;
        self.names = parse_introspection(&raw);
        self.host = Some(host.clone());
        self.write(&host)?;
        Ok(self.names.len())
    }

    /// Glob match (`*`, `?`, `[...]`) over the names, keeping their order.
    /// Like `fnmatch`, a `[` that never closes matches itself.
    pub fn search(&self, pattern: &str) -> Result<Vec<&str>, glob::PatternError> {
        let pattern = Pattern::new(pattern)
            .or_else(|_| Pattern::new(&lenient(pattern)))
            .or_else(|_| Pattern::new(&Pattern::escape(pattern)))?;
        Ok(self
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| pattern.matches(name))
            .collect())
    }
}

/// Rewrites what `fnmatch` accepts and `glob` rejects: runs of `*` and an
/// unclosed `[`.
fn lenient(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '*' => {
                out.push('*');
                while chars.next_if(|(_, next)| *next == '*').is_some() {}
            }
            '[' if !pattern[i + 1..].contains(']') => out.push_str("[[]"),
            _ => out.push(c),
        }
    }
    out
}

fn read_document(path: &Path) -> Result<Vec<String>, StorageError> {
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let document: CacheDocument =
        serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    if document.version != CACHE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: document.version,
        });
    }
    Ok(document.complete)
}

/// Extracts completable names from `cvarlist` output.
///
/// The first two lines (title and rule) and the last three (rule, totals and
/// the trailing empty line) are not rows. A row is kept when its flags
/// mention `sv` or `rep`, or its value column reads `cmd`.
pub fn parse_introspection(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() <= 5 {
        return Vec::new();
    }
    lines[2..lines.len() - 3]
        .iter()
        .filter_map(|row| completable_name(row))
        .collect()
}

fn completable_name(row: &str) -> Option<String> {
    let fields: Vec<&str> = row.splitn(4, ':').map(str::trim).collect();
    let [name, kind, flags, ..] = fields.as_slice() else {
        return None;
    };
    if name.is_empty() {
        return None;
    }
    let keep = flags.contains("sv") || flags.contains("rep") || *kind == "cmd";
    keep.then(|| name.to_string())
}

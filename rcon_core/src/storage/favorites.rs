use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::errors::StorageError;
use super::profile::{parse_port, ConnectionProfile, DEFAULT_PORT};
use crate::core::prompt::Prompter;

pub const SETTINGS_VERSION: u32 = 1;

#[derive(Serialize)]
struct SettingsOut<'a> {
    version: u32,
    favorites: &'a BTreeMap<String, ConnectionProfile>,
}

#[derive(Deserialize)]
struct SettingsIn {
    version: u32,
    #[serde(default)]
    favorites: BTreeMap<String, ConnectionProfile>,
}

/// What happened when the settings file was read at startup.
#[derive(Debug)]
pub enum LoadStatus {
    Loaded(usize),
    /// No settings file yet; it is created on the first save.
    Missing,
    /// The file could not be used; the store starts empty and the file is
    /// rewritten on the next save.
    Regenerate(StorageError),
}

/// Answer to the `OVERWRITE yes/[n]o/abort` question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteChoice {
    Yes,
    No,
    Abort,
}

impl OverwriteChoice {
    /// Only the first letter counts; anything unrecognised (including blank) is `No`.
    pub fn parse(answer: &str) -> Self {
        match answer.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('y') => OverwriteChoice::Yes,
            Some('a') => OverwriteChoice::Abort,
            _ => OverwriteChoice::No,
        }
    }
}

/// Result of proposing an alias during `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOutcome {
    /// Free, or the operator confirmed the overwrite.
    Accepted,
    /// Taken and not (yet) confirmed; ask again or ask for another alias.
    Collision,
    /// The operator gave up on the whole `add`.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// A favorite as shown by `favorite list`. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteListing<'a> {
    pub alias: &'a str,
    pub address: &'a str,
    pub port: u16,
}

/// Named connection profiles persisted in `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: BTreeMap<String, ConnectionProfile>,
}

impl FavoritesStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            favorites: BTreeMap::new(),
        }
    }

    /// Loads the store, never failing: unreadable files yield an empty store
    /// plus a [`LoadStatus::Regenerate`] the caller can report.
    pub fn load(path: impl Into<PathBuf>) -> (Self, LoadStatus) {
        let mut store = Self::empty(path);
        let status = match Self::read(&store.path) {
            Ok(favorites) => {
                debug!("Loaded {} favorites from {:?}", favorites.len(), store.path);
                let count = favorites.len();
                store.favorites = favorites;
                LoadStatus::Loaded(count)
            }
            Err(e) if e.is_missing() => LoadStatus::Missing,
            Err(e) => {
                warn!("Ignoring unreadable favorites file: {e}");
                LoadStatus::Regenerate(e)
            }
        };
        (store, status)
    }

    /// Reads and validates a settings document.
    pub fn read(path: &Path) -> Result<BTreeMap<String, ConnectionProfile>, StorageError> {
        let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let document: SettingsIn =
            serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if document.version != SETTINGS_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: document.version,
            });
        }
        Ok(document.favorites)
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let document = SettingsOut {
            version: SETTINGS_VERSION,
            favorites: &self.favorites,
        };
        let json = serde_json::to_string(&document).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| StorageError::io(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, alias: &str) -> Option<&ConnectionProfile> {
        self.favorites.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.favorites.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.favorites.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> &BTreeMap<String, ConnectionProfile> {
        &self.favorites
    }

    /// Entries sorted by alias, without passwords.
    pub fn list(&self) -> Vec<FavoriteListing<'_>> {
        self.favorites
            .iter()
            .map(|(alias, profile)| FavoriteListing {
                alias,
                address: &profile.address,
                port: profile.port,
            })
            .collect()
    }

    /// Stores `profile` under `alias` and persists. On a failed write the
    /// in-memory store is rolled back.
    pub fn insert(
        &mut self,
        alias: impl Into<String>,
        profile: ConnectionProfile,
    ) -> Result<(), StorageError> {
        let alias = alias.into();
        let previous = self.favorites.insert(alias.clone(), profile);
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.favorites.insert(alias, old),
                None => self.favorites.remove(&alias),
            };
            return Err(e);
        }
        info!("Saved favorite '{alias}'");
        Ok(())
    }

    pub fn delete(&mut self, alias: &str) -> Result<RemoveOutcome, StorageError> {
        let Some(removed) = self.favorites.remove(alias) else {
            return Ok(RemoveOutcome::NotFound);
        };
        if let Err(e) = self.save() {
            self.favorites.insert(alias.to_string(), removed);
            return Err(e);
        }
        info!("Removed favorite '{alias}'");
        Ok(RemoveOutcome::Removed)
    }

    /// Classifies a proposed alias. `choice` is the operator's answer to the
    /// overwrite question, if it has been asked.
    pub fn resolve_alias(&self, alias: &str, choice: Option<OverwriteChoice>) -> AliasOutcome {
        if !self.contains(alias) {
            return AliasOutcome::Accepted;
        }
        match choice {
            Some(OverwriteChoice::Yes) => AliasOutcome::Accepted,
            Some(OverwriteChoice::Abort) => AliasOutcome::Aborted,
            Some(OverwriteChoice::No) | None => AliasOutcome::Collision,
        }
    }

    /// Interactively asks for a new favorite and persists it.
    ///
    /// Returns the saved alias, or `None` when the operator aborted at the
    /// overwrite question (the store is left untouched in that case).
    pub fn add(&mut self, prompter: &mut dyn Prompter) -> Result<Option<String>, StorageError> {
        let Some(alias) = self.acquire_alias(prompter)? else {
            return Ok(None);
        };

        let address = loop {
            let address = prompter.read_line("Hostname: ").map_err(StorageError::Input)?;
            let address = address.trim();
            if !address.is_empty() {
                break address.to_string();
            }
        };

        let port_text = prompter
            .read_line(&format!("Port [{DEFAULT_PORT}]: "))
            .map_err(StorageError::Input)?;
        let port = parse_port(&port_text).unwrap_or_else(|e| {
            warn!("{e}, using {DEFAULT_PORT}");
            prompter.notice(&format!("Invalid Port. Defaulting to {DEFAULT_PORT}."));
            DEFAULT_PORT
        });

        let password = prompter
            .read_password("Password: ")
            .map_err(StorageError::Input)?;

        self.insert(alias.clone(), ConnectionProfile::new(address, port, password))?;
        Ok(Some(alias))
    }

    fn acquire_alias(&self, prompter: &mut dyn Prompter) -> Result<Option<String>, StorageError> {
        loop {
            let alias = prompter.read_line("Alias: ").map_err(StorageError::Input)?;
            let alias = alias.trim();
            if alias.is_empty() {
                continue;
            }
            let mut outcome = self.resolve_alias(alias, None);
            if outcome == AliasOutcome::Collision {
                prompter.notice(&format!(
                    "There is already a server with alias {alias}. Do you want to OVERWRITE it?"
                ));
                let answer = prompter
                    .read_line("OVERWRITE yes/[n]o/abort: ")
                    .map_err(StorageError::Input)?;
                outcome = self.resolve_alias(alias, Some(OverwriteChoice::parse(&answer)));
            }
            match outcome {
                AliasOutcome::Accepted => return Ok(Some(alias.to_string())),
                AliasOutcome::Collision => continue,
                AliasOutcome::Aborted => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_answers_use_the_first_letter() {
        assert_eq!(OverwriteChoice::parse("yes"), OverwriteChoice::Yes);
        assert_eq!(OverwriteChoice::parse("Y"), OverwriteChoice::Yes);
        assert_eq!(OverwriteChoice::parse("abort"), OverwriteChoice::Abort);
        assert_eq!(OverwriteChoice::parse("no"), OverwriteChoice::No);
        assert_eq!(OverwriteChoice::parse(""), OverwriteChoice::No);
        assert_eq!(OverwriteChoice::parse("maybe"), OverwriteChoice::No);
    }

    #[test]
    fn resolve_alias_covers_all_three_outcomes() {
        let mut store = FavoritesStore::empty("unused.json");
        store
            .favorites
            .insert("pub".into(), ConnectionProfile::new("a", DEFAULT_PORT, "p"));

        assert_eq!(store.resolve_alias("new", None), AliasOutcome::Accepted);
        assert_eq!(store.resolve_alias("pub", None), AliasOutcome::Collision);
        assert_eq!(
            store.resolve_alias("pub", Some(OverwriteChoice::No)),
            AliasOutcome::Collision
        );
        assert_eq!(
            store.resolve_alias("pub", Some(OverwriteChoice::Yes)),
            AliasOutcome::Accepted
        );
        assert_eq!(
            store.resolve_alias("pub", Some(OverwriteChoice::Abort)),
            AliasOutcome::Aborted
        );
    }
}

pub mod autocomplete;
pub mod errors;
pub mod favorites;
pub mod profile;

pub use autocomplete::{AutocompleteCache, CacheError, CacheLoad};
pub use errors::{InvalidPort, StorageError};
pub use favorites::{AliasOutcome, FavoritesStore, LoadStatus, OverwriteChoice, RemoveOutcome};
pub use profile::{parse_port, ConnectionProfile, DEFAULT_PORT};

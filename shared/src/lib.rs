//! Pure player-lookup core shared by the browser client and the native CLI:
//! cache keys, the query dependency graph and the persisted stores.

pub mod api;
pub mod cache;
pub mod favorites;
pub mod format;
pub mod guild;
pub mod history;
pub mod metric;
pub mod player;
pub mod query;
pub mod services;
pub mod session;
pub mod store;
pub mod tabs;

pub use api::{AbilityClass, ClientConfig, Endpoint, GUILD_PAGE_SIZE};
pub use cache::QueryCache;
pub use favorites::{Favorite, FavoritesStore};
pub use history::{MAX_HISTORY, SearchHistory, SearchHistoryStore};
pub use query::{FetchError, FetchOutcome, QueryKey, QueryState};
pub use session::{PlayerSession, RawResponse, ServiceSection, SessionEvent, TransportResult};
pub use store::{ChangeNotifier, KeyValueStorage, MemoryStorage, NoopNotifier, StorageError};
pub use tabs::ServiceTab;

pub mod session;
pub mod storage;
pub mod store;
pub mod trie;
pub mod value;

pub use session::{LOGIN_ROUTE, ROUTE_PATH, SESSION_PATH, SessionService, THEME_PATH};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError};
pub use store::StateStore;
pub use value::{StateValue, SubscriptionId};

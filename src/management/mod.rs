mod auth;
mod cache;
mod store;

pub use auth::CredentialManager;
pub use cache::CacheRecord;
pub use store::FileStore;
pub use store::KeyValueStore;
pub use store::MemoryStore;
pub use store::keys;

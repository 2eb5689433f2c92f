// Service exports
pub mod disposable;
pub mod dns;
pub mod sessions;
pub mod store;

pub use disposable::{DisposableDomains, DisposableSource};
pub use dns::{DnsMxResolver, MxResolver};
pub use sessions::SessionManager;
pub use store::{DocumentStoreClient, ProfileStore, StoreCollections, StoreError};

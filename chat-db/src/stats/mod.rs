pub mod aggregate;
pub mod identity;
pub mod snapshot;
pub mod store;

pub use aggregate::{round_half_up, AuthorAggregate, MAX_DECIMAL_PRECISION};
pub use identity::{placeholder_author, Identity, PLACEHOLDER_NAME_PREFIX};
pub use snapshot::Snapshot;
pub use store::AuthorStore;

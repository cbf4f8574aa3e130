//! Persisted records and the predicates used to select them.

mod filter;
mod subscription;
mod table;

pub use filter::{Filter, Patch};
pub use subscription::{Keys, Subscription};
pub use table::Table;

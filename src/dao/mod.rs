use std::sync::Arc;

use crate::{configuration::Config, error::Error};

mod file;
mod postgre;
mod store;

pub use file::FileStore;
pub use postgre::PoolType;
pub use store::SubscriptionStore;

/// Opens the backend named by `DATABASE_URL`: a `postgres://` URL selects
/// the sqlx table, anything else is taken as the path of a JSON-lines file.
pub async fn open_store(
    config: &Config,
) -> Result<Arc<dyn SubscriptionStore>, Error> {
    let url = config.database_url.as_str();

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let table = postgre::open(config).await?;
        return Ok(Arc::new(table));
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    let store = FileStore::open(path).await?;
    Ok(Arc::new(store))
}

pub use self::{
    path::get_path,
    types::{DataBase, PoolOption, PoolType},
};

use tracing::info;

use crate::{
    configuration::Config,
    error::Error,
    model::{Subscription, Table},
};

mod path;
mod subscription;
mod types;

const MIGRATIONS: [&str; 1] = ["subscription.sql"];

pub async fn open(config: &Config) -> Result<Table<Subscription>, Error> {
    let pool = PoolOption::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await?;

    init_migrations(&pool).await?;
    info!("Postgres subscription store ready");

    Ok(Table::new(pool))
}

async fn init_migrations(pool: &PoolType) -> Result<(), Error> {
    let dir = env!("CARGO_MANIFEST_DIR");

    for file in MIGRATIONS {
        let data = tokio::fs::read_to_string(get_path(dir, file)).await?;
        sqlx::raw_sql(data.as_str()).execute(pool).await?;
    }

    Ok(())
}

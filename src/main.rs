use std::sync::Arc;

use tracing::{error, info, Level};

use push_notifier::{
    configuration::{get_configuration, set_configuration, AppState, Config, State},
    dao::open_store,
    error::Error,
    provider::HTTP,
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let config = match init() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(Level::INFO)?;
            return Err(Error::ConfigurationError(e.to_string()));
        },
    };

    init_tracing(config.log_level)?;

    let store = open_store(&config).await?;
    let http = HTTP::new(config.clone())?;

    let state = State::new(config, store.clone(), Arc::new(http));
    let app_state = AppState::new(state);

    info!(
        host = %app_state.config.server_host,
        port = app_state.config.port,
        "Push notifier listening"
    );

    let result = server::server_task(&app_state).await;

    store.close().await?;
    info!("Push notifier stopped");

    result
}

fn init_tracing(level: Level) -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn init() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

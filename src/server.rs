use actix_cors::Cors;
use actix_web::{dev::Server, http::header, middleware, web, App, HttpServer};

use crate::{
    configuration::{AppState, State},
    controller::{deregister, public_key, push, register, version},
    error::Error,
};

const JSON_LIMIT: usize = 64 * 1024;

/// Runs the HTTP server until it receives a shutdown signal.
pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let server = init_server(app_state.clone())?;
    server.await?;
    Ok(())
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.contains(&origin.to_owned());
                }
                false
            })
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .service(public_key::index)
            .service(register::index)
            .service(deregister::index)
            .service(push::index)
            .service(version::index)
    })
    .bind((host, port))?
    .run();
    Ok(server)
}

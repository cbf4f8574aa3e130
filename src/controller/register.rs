use actix_web::{post, web, HttpResponse, Result};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::registration::{register, Registration},
    types,
};

#[post("/register")]
pub async fn index(
    state: web::Data<AppState<State>>,
    subscription: web::Json<types::Register>,
) -> Result<HttpResponse, Error> {
    let types::Register {
        user_id,
        endpoint,
        keys,
    } = subscription.into_inner();

    info!("register push subscription for user {}", user_id);

    let response = match register(&state, &user_id, &endpoint, keys).await? {
        Registration::Created => HttpResponse::Created().finish(),
        Registration::Refreshed => HttpResponse::Ok().finish(),
    };

    Ok(response)
}

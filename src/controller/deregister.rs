use actix_web::{post, web, HttpResponse, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::registration::deregister,
    types,
};

#[post("/deregister")]
pub async fn index(
    state: web::Data<AppState<State>>,
    subscription: web::Json<types::Deregister>,
) -> Result<HttpResponse, Error> {
    deregister(&state, &subscription.user_id, &subscription.endpoint).await?;

    Ok(HttpResponse::Ok().finish())
}

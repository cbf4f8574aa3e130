use actix_web::{post, web, HttpResponse, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::delivery::send,
    types,
};

#[post("/push")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Json<types::Push>,
) -> Result<HttpResponse, Error> {
    let report =
        send(state.get_ref().clone(), &data.user_id, &data.notification).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Sent {} messages", report.attempted)))
}

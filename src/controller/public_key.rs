use actix_web::{get, web, HttpResponse, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::PublicKey,
};

#[get("/public-key")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(PublicKey {
        public_key: state.config.vapid_public_key.to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;
    use crate::{
        configuration::Config, provider::mock::RecordingDelivery,
        testing::fixture_with,
    };

    #[actix_web::test]
    async fn test_public_key_is_served() {
        let config = Config {
            vapid_public_key: String::from("BOr5cJ4ZbQ"),
            ..Config::default()
        };
        let fx = fixture_with(config, RecordingDelivery::default()).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fx.state.clone()))
                .service(index),
        )
        .await;

        let req = test::TestRequest::get().uri("/public-key").to_request();
        let body: PublicKey = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.public_key, "BOr5cJ4ZbQ");
    }
}

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use crate::{
    configuration::{AppState, Config, State},
    dao::{FileStore, SubscriptionStore},
    model::{Keys, Subscription},
    provider::mock::RecordingDelivery,
};

pub struct Fixture {
    pub state: AppState<State>,
    pub store: Arc<FileStore>,
    pub delivery: Arc<RecordingDelivery>,
    _dir: TempDir,
}

pub async fn fixture(delivery: RecordingDelivery) -> Fixture {
    fixture_with(Config::default(), delivery).await
}

pub async fn fixture_with(config: Config, delivery: RecordingDelivery) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path().join("db")).await.unwrap());
    let delivery = Arc::new(delivery);

    let state = AppState::new(State::new(
        config,
        store.clone() as Arc<dyn SubscriptionStore>,
        delivery.clone(),
    ));

    Fixture {
        state,
        store,
        delivery,
        _dir: dir,
    }
}

pub fn keys(p256dh: &str, auth: &str) -> Keys {
    Keys {
        p256dh: p256dh.to_owned(),
        auth: auth.to_owned(),
    }
}

pub fn subscription(user_id: &str, endpoint: &str, service: &str) -> Subscription {
    Subscription::new(
        user_id.to_owned(),
        endpoint.to_owned(),
        keys("k1", "a1"),
        service.to_owned(),
        Utc::now(),
    )
}

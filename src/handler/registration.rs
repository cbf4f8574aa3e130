use chrono::Utc;
use tracing::info;

use crate::{
    configuration::State,
    error::Error,
    helpers::parse_service,
    model::{Filter, Keys, Patch, Subscription},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Refreshed,
}

/// Idempotent upsert of `(user_id, endpoint)`.
///
/// A new record is inserted, an existing one only has its modification time
/// refreshed. Afterwards every other endpoint the same push service issued
/// to this user is deleted. Repeating the call converges to the same single
/// record.
pub async fn register(
    state: &State,
    user_id: &str,
    endpoint: &str,
    keys: Keys,
) -> Result<Registration, Error> {
    if user_id.trim().is_empty() {
        return Err(Error::MissingField(String::from("userId")));
    }

    if keys.p256dh.is_empty() || keys.auth.is_empty() {
        return Err(Error::MissingField(String::from("keys")));
    }

    let service = parse_service(endpoint)?;
    let store = &state.store;
    let now = Utc::now();
    let key = Filter::by_endpoint(user_id, endpoint);

    let registration = match store.find_one(&key).await? {
        Some(_) => {
            store.update(&key, &Patch::touch(now)).await?;
            Registration::Refreshed
        },
        None => {
            let subscription = Subscription::new(
                user_id.to_owned(),
                endpoint.to_owned(),
                keys,
                service.to_owned(),
                now,
            );

            match store.insert(subscription).await {
                Ok(()) => Registration::Created,
                Err(Error::DuplicateSubscription(_)) => {
                    store.update(&key, &Patch::touch(now)).await?;
                    Registration::Refreshed
                },
                Err(e) => return Err(e),
            }
        },
    };

    match registration {
        Registration::Created => {
            info!(user_id = %user_id, service = %service, "no subscription found, created");
        },
        Registration::Refreshed => {
            info!(user_id = %user_id, service = %service, "subscription already exists, refreshed");
        },
    }

    let superseded = store
        .remove(&Filter::siblings(user_id, &service, endpoint))
        .await?;

    if superseded > 0 {
        info!(
            user_id = %user_id,
            service = %service,
            superseded,
            "Removed superseded subscriptions"
        );
    }

    Ok(registration)
}

/// Deletes the exact `(user_id, endpoint)` record. Deleting something that
/// is not there is not an error.
pub async fn deregister(
    state: &State,
    user_id: &str,
    endpoint: &str,
) -> Result<u64, Error> {
    if user_id.trim().is_empty() {
        return Err(Error::MissingField(String::from("userId")));
    }

    let removed = state
        .store
        .remove(&Filter::by_endpoint(user_id, endpoint))
        .await?;

    info!(user_id = %user_id, removed, "deregister push subscription");
    Ok(removed)
}

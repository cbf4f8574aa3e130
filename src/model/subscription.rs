use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Key material a browser hands out with a push subscription, both
/// base64url encoded.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Keys {
    pub p256dh: String,
    pub auth: String,
}

/// One registered push endpoint of a user.
///
/// `service` is the authority of `endpoint` and identifies the push service
/// that issued it; a newer endpoint from the same service replaces older
/// ones for the same user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: String,
    pub endpoint: String,
    #[sqlx(flatten)]
    pub keys: Keys,
    pub service: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(
        user_id: String,
        endpoint: String,
        keys: Keys,
        service: String,
        now: DateTime<Utc>,
    ) -> Subscription {
        Subscription {
            user_id,
            endpoint,
            keys,
            service,
            created_at: now,
            last_modified_at: now,
        }
    }
}

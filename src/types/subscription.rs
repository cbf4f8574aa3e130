use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Keys;

#[derive(Debug, Deserialize)]
pub struct Register {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub endpoint: String,
    pub keys: Keys,
}

#[derive(Debug, Deserialize)]
pub struct Deregister {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct Push {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub notification: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    error::Error,
    model::{Filter, Patch, Subscription},
};

/// Collection of subscription records.
///
/// Every call is atomic with respect to the store itself; nothing spans
/// calls. `update` and `remove` return the number of records affected.
#[async_trait]
pub trait SubscriptionStore: Debug + Send + Sync {
    async fn find(&self, filter: &Filter) -> Result<Vec<Subscription>, Error>;

    async fn find_one(
        &self,
        filter: &Filter,
    ) -> Result<Option<Subscription>, Error>;

    /// Fails with [`Error::DuplicateSubscription`] when the
    /// `(user_id, endpoint)` pair is already stored.
    async fn insert(&self, subscription: Subscription) -> Result<(), Error>;

    async fn update(&self, filter: &Filter, patch: &Patch)
        -> Result<u64, Error>;

    async fn remove(&self, filter: &Filter) -> Result<u64, Error>;

    async fn close(&self) -> Result<(), Error>;
}

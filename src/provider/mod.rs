use std::fmt::Debug;

use async_trait::async_trait;

use crate::{model::Subscription, types::PushHeader};

pub use self::http::{classify, HTTP};

mod http;
mod vapid;

#[cfg(test)]
pub(crate) mod mock;

/// Result of one delivery attempt, as seen by the fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Accepted by the push service
    Delivered,
    /// The push service no longer knows the endpoint; the subscription
    /// should be deleted
    EndpointGone,
    /// Anything else; the subscription is kept
    OtherFailure(String),
}

#[async_trait]
pub trait PushDelivery: Debug + Send + Sync {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        header: &PushHeader,
    ) -> DeliveryOutcome;
}

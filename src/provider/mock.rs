use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;

use super::{DeliveryOutcome, PushDelivery};
use crate::{model::Subscription, types::PushHeader};

/// Delivery double: answers with a scripted outcome per endpoint
/// (`Delivered` by default) and records every attempt once it completes.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    outcomes: HashMap<String, DeliveryOutcome>,
    panics: Vec<String>,
    delay: Option<Duration>,
    attempts: Mutex<Vec<(String, Vec<u8>, PushHeader)>>,
}

impl RecordingDelivery {
    pub fn with_outcome(mut self, endpoint: &str, outcome: DeliveryOutcome) -> Self {
        self.outcomes.insert(endpoint.to_owned(), outcome);
        self
    }

    pub fn with_panic(mut self, endpoint: &str) -> Self {
        self.panics.push(endpoint.to_owned());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn attempts(&self) -> Vec<(String, Vec<u8>, PushHeader)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> =
            self.attempts().into_iter().map(|(endpoint, _, _)| endpoint).collect();
        endpoints.sort();
        endpoints
    }
}

#[async_trait]
impl PushDelivery for RecordingDelivery {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        header: &PushHeader,
    ) -> DeliveryOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.attempts.lock().unwrap().push((
            subscription.endpoint.to_owned(),
            payload.to_vec(),
            header.clone(),
        ));

        if self.panics.contains(&subscription.endpoint) {
            panic!("delivery to {} panicked", subscription.endpoint);
        }

        self.outcomes
            .get(&subscription.endpoint)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered)
    }
}

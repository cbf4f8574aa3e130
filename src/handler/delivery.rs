use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::{
    configuration::{AppState, State},
    error::Error,
    futures_set::join_all_settled,
    model::{Filter, Subscription},
    provider::DeliveryOutcome,
    types::PushHeader,
};

/// Tally of one push fan-out. `attempted` is what callers are told;
/// the rest is for logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub evicted: usize,
    pub failed: usize,
}

impl PushReport {
    fn record(mut self, outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::EndpointGone => self.evicted += 1,
            DeliveryOutcome::OtherFailure(_) => self.failed += 1,
        }
        self
    }

    fn record_join_error(mut self, e: JoinError) -> Self {
        error!(error = %e, "Push task did not complete");
        self.failed += 1;
        self
    }
}

/// Sends `notification` to every subscription of `user_id`.
///
/// Attempts run concurrently and are isolated from one another; the call
/// returns once all of them have settled. The fan-out runs on its own task,
/// so dropping this future does not cancel attempts already scheduled.
/// Only a failure to load the subscriptions is reported as an error.
pub async fn send(
    app_state: AppState<State>,
    user_id: &str,
    notification: &Value,
) -> Result<PushReport, Error> {
    if user_id.trim().is_empty() {
        return Err(Error::MissingField(String::from("userId")));
    }

    let items = app_state.store.find(&Filter::by_user(user_id)).await?;

    let attempted = items.len();
    if attempted == 0 {
        info!(user_id = %user_id, "No subscriptions to push to");
        return Ok(PushReport::default());
    }

    let payload: Arc<[u8]> = serde_json::to_vec(notification)?.into();
    let push_header = app_state.push_header();
    let capacity = app_state.fan_out_capacity();

    let tasks: Vec<_> = items
        .into_iter()
        .map(|subscription| {
            send_push(
                app_state.clone(),
                subscription,
                push_header.clone(),
                payload.clone(),
            )
        })
        .collect();

    let fan_out = tokio::spawn(join_all_settled(
        tasks,
        capacity,
        PushReport {
            attempted,
            ..PushReport::default()
        },
        PushReport::record,
        PushReport::record_join_error,
    ));

    let report = fan_out.await?;

    info!(
        user_id = %user_id,
        attempted = report.attempted,
        delivered = report.delivered,
        evicted = report.evicted,
        failed = report.failed,
        "Push fan-out finished"
    );

    Ok(report)
}

pub async fn send_push(
    state: AppState<State>,
    subscription: Subscription,
    push_header: PushHeader,
    payload: Arc<[u8]>,
) -> DeliveryOutcome {
    let outcome = state
        .delivery
        .deliver(&subscription, &payload, &push_header)
        .await;

    match &outcome {
        DeliveryOutcome::Delivered => {
            debug!(
                user_id = %subscription.user_id,
                service = %subscription.service,
                "Push notification sent"
            );
        },
        DeliveryOutcome::EndpointGone => {
            info!(
                user_id = %subscription.user_id,
                endpoint = %subscription.endpoint,
                "Removing de-registered subscription"
            );

            let filter =
                Filter::by_endpoint(&subscription.user_id, &subscription.endpoint);
            if let Err(e) = state.store.remove(&filter).await {
                error!(
                    user_id = %subscription.user_id,
                    endpoint = %subscription.endpoint,
                    error = %e,
                    "Failed to remove de-registered subscription"
                );
            }
        },
        DeliveryOutcome::OtherFailure(detail) => {
            warn!(
                user_id = %subscription.user_id,
                endpoint = %subscription.endpoint,
                error = %detail,
                "Push notification failed"
            );
        },
    }

    outcome
}

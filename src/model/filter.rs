use chrono::{DateTime, Utc};

use super::Subscription;

/// Conjunction of exact-match predicates over a subscription, plus one
/// inequality on the endpoint. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub user_id: Option<String>,
    pub endpoint: Option<String>,
    pub service: Option<String>,
    pub endpoint_ne: Option<String>,
}

impl Filter {
    pub fn by_user(user_id: &str) -> Filter {
        Filter {
            user_id: Some(user_id.to_owned()),
            ..Filter::default()
        }
    }

    pub fn by_endpoint(user_id: &str, endpoint: &str) -> Filter {
        Filter {
            user_id: Some(user_id.to_owned()),
            endpoint: Some(endpoint.to_owned()),
            ..Filter::default()
        }
    }

    /// Same user and service, any endpoint other than `endpoint`.
    pub fn siblings(user_id: &str, service: &str, endpoint: &str) -> Filter {
        Filter {
            user_id: Some(user_id.to_owned()),
            service: Some(service.to_owned()),
            endpoint_ne: Some(endpoint.to_owned()),
            ..Filter::default()
        }
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        fn eq(expected: &Option<String>, value: &str) -> bool {
            expected.as_deref().map_or(true, |expected| expected == value)
        }

        eq(&self.user_id, &subscription.user_id)
            && eq(&self.endpoint, &subscription.endpoint)
            && eq(&self.service, &subscription.service)
            && self
                .endpoint_ne
                .as_deref()
                .map_or(true, |excluded| excluded != subscription.endpoint)
    }
}

/// Fields an update may touch. Keys are never patched: an identical
/// endpoint is assumed to carry identical keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Patch {
    pub fn touch(now: DateTime<Utc>) -> Patch {
        Patch {
            last_modified_at: Some(now),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_modified_at.is_none()
    }

    pub fn apply(&self, subscription: &mut Subscription) {
        if let Some(at) = self.last_modified_at {
            subscription.last_modified_at = at;
        }
    }
}

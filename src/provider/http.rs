use std::{fmt, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use jsonwebtoken::EncodingKey;
use reqwest::{
    header::{
        HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_ENCODING,
        CONTENT_TYPE, USER_AGENT,
    },
    Client,
};

use super::{vapid, DeliveryOutcome, PushDelivery};
use crate::{
    configuration::Config,
    error::Error,
    model::Subscription,
    types::PushHeader,
};

/// Web Push client: aes128gcm payload encryption (RFC 8291) and VAPID
/// signed requests (RFC 8292).
pub struct HTTP {
    pub config: Config,
    pub http: Client,
    key: EncodingKey,
}

impl fmt::Debug for HTTP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HTTP")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        let key = EncodingKey::from_ec_pem(&config.vapid_private_key)?;

        Ok(HTTP { config, http, key })
    }

    pub async fn post_push(
        &self,
        url: &str,
        token: &str,
        push_header: &PushHeader,
        data: Vec<u8>,
    ) -> Result<u16, Error> {
        let mut header_map = HeaderMap::new();

        header_map.insert(USER_AGENT, HeaderValue::from_static("push-notifier"));
        header_map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!(
                "vapid t={},k={}",
                token, self.config.vapid_public_key
            ))?,
        );
        header_map.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        header_map.insert(CONTENT_ENCODING, HeaderValue::from_static("aes128gcm"));
        header_map.insert(
            HeaderName::from_static("ttl"),
            HeaderValue::from_str(&push_header.ttl.to_string())?,
        );
        header_map.insert(
            HeaderName::from_static("urgency"),
            HeaderValue::from_str(&push_header.urgency.to_string())?,
        );

        let response = self
            .http
            .post(url)
            .headers(header_map)
            .body(data)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn send(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        push_header: &PushHeader,
    ) -> Result<u16, Error> {
        let p256dh = BASE64_URL.decode(subscription.keys.p256dh.trim_end_matches('='))?;
        let auth = BASE64_URL.decode(subscription.keys.auth.trim_end_matches('='))?;

        let data = ece::encrypt(&p256dh, &auth, payload)?;
        let token =
            vapid::sign(&subscription.endpoint, &self.config.mail_to, &self.key)?;

        self.post_push(&subscription.endpoint, &token, push_header, data)
            .await
    }
}

/// Maps a push service response status onto a delivery outcome. `gone`
/// lists the statuses meaning the endpoint no longer exists.
pub fn classify(status: u16, gone: &[u16]) -> DeliveryOutcome {
    if (200..300).contains(&status) {
        return DeliveryOutcome::Delivered;
    }

    if gone.contains(&status) {
        return DeliveryOutcome::EndpointGone;
    }

    DeliveryOutcome::OtherFailure(format!("HTTP {}", status))
}

#[async_trait]
impl PushDelivery for HTTP {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        header: &PushHeader,
    ) -> DeliveryOutcome {
        match self.send(subscription, payload, header).await {
            Ok(status) => classify(status, &self.config.status_code_to_delete),
            Err(e) => DeliveryOutcome::OtherFailure(e.to_string()),
        }
    }
}

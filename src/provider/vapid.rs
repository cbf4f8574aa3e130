//! VAPID (RFC 8292) request signing.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use url::Url;

use crate::{error::Error, types::Claims};

/// Lifetime of a signed token; push services reject anything over 24h.
const TOKEN_TTL: i64 = 12 * 60 * 60;

/// Origin of the push service an endpoint belongs to, used as the token
/// audience.
pub fn audience(endpoint: &str) -> Result<String, Error> {
    let url = Url::parse(endpoint)?;

    let host = match url.host_str() {
        Some(host) => host,
        None => {
            return Err(Error::InvalidEndpoint(format!(
                "{}: missing host",
                endpoint
            )));
        },
    };

    let aud = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    Ok(aud)
}

pub fn sign(
    endpoint: &str,
    mail_to: &str,
    key: &EncodingKey,
) -> Result<String, Error> {
    let aud = audience(endpoint)?;
    let sub = format!("mailto:{}", mail_to);
    let exp = Utc::now().timestamp() + TOKEN_TTL;

    let claims = Claims { aud, sub, exp };
    let token = encode(&Header::new(Algorithm::ES256), &claims, key)?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_is_origin() {
        assert_eq!(
            audience("https://push.example.com/send/abc").unwrap(),
            "https://push.example.com"
        );
        assert_eq!(
            audience("https://push.example.com:8443/send/abc").unwrap(),
            "https://push.example.com:8443"
        );
        assert!(audience("not a url").is_err());
    }
}

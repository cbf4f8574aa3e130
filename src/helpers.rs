use url::Url;

use crate::error::Error;

/// Authority (`host[:port]`) of a push endpoint, identifying the push
/// service that issued it.
pub fn parse_service(endpoint: &str) -> Result<String, Error> {
    let url = Url::parse(endpoint).map_err(|e| {
        Error::InvalidEndpoint(format!("{}: {}", endpoint, e))
    })?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(Error::InvalidEndpoint(format!(
                "{}: missing host",
                endpoint
            )));
        },
    };

    let service = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    };

    Ok(service)
}

pub fn parse_list(data: &str) -> Vec<String> {
    data.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_is_endpoint_host() {
        let service = parse_service("https://push.example.com/a").unwrap();
        assert_eq!(service, "push.example.com");

        let service = parse_service(
            "https://fcm.googleapis.com/fcm/send/dQw4w9WgXcQ:APA91b",
        )
        .unwrap();
        assert_eq!(service, "fcm.googleapis.com");
    }

    #[test]
    fn test_service_keeps_explicit_port() {
        let service = parse_service("https://push.example.com:8443/a").unwrap();
        assert_eq!(service, "push.example.com:8443");

        let service = parse_service("https://push.example.com:443/a").unwrap();
        assert_eq!(service, "push.example.com");
    }

    #[test]
    fn test_malformed_endpoint_is_rejected() {
        for endpoint in ["", "not a url", "/relative/path", "mailto:someone@example.com"] {
            let err = parse_service(endpoint).unwrap_err();
            assert!(
                matches!(err, Error::InvalidEndpoint(_)),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("404, 410,"), vec!["404", "410"]);
        assert!(parse_list("").is_empty());
    }
}

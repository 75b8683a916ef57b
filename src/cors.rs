use std::error::Error;

use axum::http::{
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    Any,
    List(Vec<HeaderValue>),
}

/// A literal "*" anywhere in the list selects the wildcard mode;
/// otherwise every entry must parse as an explicit origin.
pub fn parse_origins(origins: &[String]) -> Result<OriginPolicy, Box<dyn Error>> {
    if origins.iter().any(|origin| origin == "*") {
        return Ok(OriginPolicy::Any);
    }
    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        values.push(HeaderValue::from_str(origin)?);
    }
    Ok(OriginPolicy::List(values))
}

pub fn build_cors_layer(policy: OriginPolicy) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_TYPE]);
    match policy {
        OriginPolicy::Any => cors.allow_origin(Any),
        OriginPolicy::List(origins) => cors.allow_origin(AllowOrigin::list(origins)),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use crate::cors::{parse_origins, OriginPolicy};

    #[test]
    fn test_wildcard_origin() {
        let policy = parse_origins(&["*".to_string()]).unwrap();
        assert_eq!(policy, OriginPolicy::Any);

        let mixed = parse_origins(&["https://example.com".to_string(), "*".to_string()]).unwrap();
        assert_eq!(mixed, OriginPolicy::Any);
    }

    #[test]
    fn test_explicit_origin_list() {
        let policy = parse_origins(&[
            "https://example.com".to_string(),
            "https://web.telegram.org".to_string(),
        ])
        .unwrap();
        assert_eq!(
            policy,
            OriginPolicy::List(vec![
                HeaderValue::from_static("https://example.com"),
                HeaderValue::from_static("https://web.telegram.org"),
            ])
        );
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(parse_origins(&["bad\norigin".to_string()]).is_err());
    }
}

use axum::http::{HeaderMap, HeaderName, header};

/// Credentials following `scheme` in the `Authorization` header.
///
/// The scheme keyword is case-insensitive (RFC 7235). Returns `None` when the
/// header is absent, not visible ASCII, or carries another scheme.
pub(crate) fn authorization_param<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (given, rest) = value.split_once(' ')?;
    given.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(
            authorization_param(&with_auth("bearer abc.def"), "Bearer"),
            Some("abc.def")
        );
        assert_eq!(
            authorization_param(&with_auth("BASIC dXNlcjpwYXNzd29yZA=="), "Basic"),
            Some("dXNlcjpwYXNzd29yZA==")
        );
    }

    #[test]
    fn other_scheme_or_missing_header_is_none() {
        assert_eq!(authorization_param(&with_auth("Basic abc"), "Bearer"), None);
        assert_eq!(authorization_param(&with_auth("Bearer"), "Bearer"), None);
        assert_eq!(authorization_param(&HeaderMap::new(), "Bearer"), None);
    }

    #[test]
    fn empty_credentials_are_kept_empty() {
        assert_eq!(authorization_param(&with_auth("Bearer "), "Bearer"), Some(""));
    }
}

//! Request identity — the session token carried by an inbound request.
//!
//! Cookie parsing lives here and nowhere else: handlers hand the raw
//! `Cookie` header to [`RequestIdentity::from_cookie_header`] and never
//! touch transport details themselves.

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// The (possibly absent) session token extracted from a request.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    session_token: Option<String>,
}

impl RequestIdentity {
    /// An identity with no session at all.
    pub fn anonymous() -> Self {
        Self {
            session_token: None,
        }
    }

    /// Extract the session token from a `Cookie` header value.
    ///
    /// A missing or malformed header yields an anonymous identity; the
    /// gate turns that into a denial, not an error.
    pub fn from_cookie_header(header: &str) -> Self {
        Self {
            session_token: parse_cookies(header)
                .into_iter()
                .find(|(name, _)| name == SESSION_COOKIE)
                .map(|(_, value)| value),
        }
    }

    /// Wrap a bare token (e.g. from a test or a non-cookie transport).
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|cookie| {
            let (name, value) = cookie.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_session_cookie() {
        let identity = RequestIdentity::from_cookie_header("session_id=abc123");
        assert_eq!(identity.session_token(), Some("abc123"));
    }

    #[test]
    fn extracts_among_other_cookies() {
        let identity =
            RequestIdentity::from_cookie_header("theme=dark; session_id=tok; lang=en");
        assert_eq!(identity.session_token(), Some("tok"));
    }

    #[test]
    fn missing_cookie_is_anonymous() {
        let identity = RequestIdentity::from_cookie_header("theme=dark; lang=en");
        assert_eq!(identity.session_token(), None);
    }

    #[test]
    fn malformed_header_is_anonymous() {
        for header in ["", ";;;", "no-equals-sign", "=value-without-name"] {
            let identity = RequestIdentity::from_cookie_header(header);
            assert_eq!(identity.session_token(), None, "header: {header:?}");
        }
    }
}

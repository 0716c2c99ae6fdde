//! Session authentication against the portal login form.
//!
//! The authenticator has two states: no session, or a session cookie. The
//! only way in is a successful login; the only way out is [`SessionAuthenticator::invalidate`],
//! called by whoever notices the portal no longer accepts the cookie.

use std::fmt;
use std::sync::Arc;

use crate::error::ClientError;
use crate::extract::{unicode_unescape, Extractor};
use crate::portal::PortalLayout;
use crate::transport::Transport;

/// Account username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated portal session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookie_name: String,
    value: String,
}

impl Session {
    /// `Cookie` header value carrying this session.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.cookie_name, self.value)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie_name", &self.cookie_name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Acquires and holds the portal session cookie.
#[derive(Debug)]
pub struct SessionAuthenticator {
    credentials: Credentials,
    layout: PortalLayout,
    extractor: Arc<dyn Extractor>,
    session: Option<Session>,
}

impl SessionAuthenticator {
    /// Create an authenticator with no session.
    #[must_use]
    pub fn new(credentials: Credentials, layout: PortalLayout, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            credentials,
            layout,
            extractor,
            session: None,
        }
    }

    /// Whether a session is currently held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// `Cookie` header for authenticated requests.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.session.as_ref().map(Session::cookie_header)
    }

    /// Drop the current session; the next [`ensure_authenticated`](Self::ensure_authenticated)
    /// logs in again.
    pub fn invalidate(&mut self) {
        if self.session.take().is_some() {
            tracing::warn!("Portal session invalidated");
        }
    }

    /// Log in unless a session is already held.
    ///
    /// Fetches the login page, extracts and unescapes the form token, posts
    /// the credentials, and keeps the session cookie if the response both
    /// sets it and shows the dashboard.
    ///
    /// # Errors
    ///
    /// - `ClientError::Extraction` if the login page has no token.
    /// - `ClientError::Serialization` if the token is not a valid escaped string.
    /// - `ClientError::Authentication` if the login response lacks the session
    ///   cookie or the dashboard marker. No session is kept in that case.
    /// - `ClientError::Http` on transport failure.
    pub async fn ensure_authenticated(&mut self, transport: &Transport) -> Result<(), ClientError> {
        if self.session.is_some() {
            return Ok(());
        }
        let layout = &self.layout;

        let login_page = transport.get(layout.login_page, None).await?;
        let raw_token =
            self.extractor
                .extract(layout.csrf_token_pattern, &login_page.body, layout.login_page)?;
        let token = unicode_unescape(&raw_token)?;

        let form = layout.login_form(&token, &self.credentials.username, &self.credentials.password);
        let response = transport
            .post_form(layout.login_page, login_page.cookie_header().as_deref(), &form)
            .await?;

        let Some(value) = response.cookie(layout.session_cookie) else {
            return Err(ClientError::Authentication(format!(
                "no {} cookie in {} response",
                layout.session_cookie, layout.login_page
            )));
        };
        if !response.body.contains(layout.dashboard_marker) {
            return Err(ClientError::Authentication(format!(
                "no {} in {} response",
                layout.dashboard_marker, layout.login_page
            )));
        }

        self.session = Some(Session {
            cookie_name: layout.session_cookie.to_string(),
            value: value.to_string(),
        });
        tracing::info!("Logged in to portal");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RegexExtractor;

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials::new("me@example.com", "hunter2");
        assert!(!format!("{credentials:?}").contains("hunter2"));

        let session = Session {
            cookie_name: "eZSESSID".into(),
            value: "s3cr3t".into(),
        };
        assert!(!format!("{session:?}").contains("s3cr3t"));
        assert_eq!(session.cookie_header(), "eZSESSID=s3cr3t");
    }

    #[test]
    fn starts_unauthenticated_and_invalidate_is_idempotent() {
        let mut auth = SessionAuthenticator::new(
            Credentials::new("u", "p"),
            PortalLayout::default(),
            Arc::new(RegexExtractor),
        );
        assert!(!auth.is_authenticated());
        assert!(auth.cookie_header().is_none());
        auth.invalidate();
        assert!(!auth.is_authenticated());
    }
}

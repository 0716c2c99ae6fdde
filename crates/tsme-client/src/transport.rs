//! Thin HTTP layer over `reqwest`.
//!
//! Cookies are not stored here: the session is owned by the authenticator and
//! passed in explicitly on every request.

use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use crate::error::ClientError;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct Page {
    /// HTTP status.
    pub status: StatusCode,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// Cookies set by the response, as name/value pairs.
    pub cookies: Vec<(String, String)>,
    /// Decoded body.
    pub body: String,
}

impl Page {
    async fn read(response: Response) -> Result<Self, ClientError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await?;
        Ok(Self {
            status,
            content_type,
            cookies,
            body,
        })
    }

    /// Whether the response declares a JSON body.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// Value of a cookie set by this response.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All cookies set by this response, formatted for a `Cookie` request header.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.cookies.iter().map(|(n, v)| format!("{n}={v}")).collect();
        Some(pairs.join("; "))
    }
}

/// HTTP access to one portal base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    login_client: Client,
    base_url: String,
}

impl Transport {
    /// Create a transport for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        // The login response is judged as-is; following its redirect would hide the session cookie.
        let login_client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            login_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_cookie(request: RequestBuilder, cookie: Option<&str>) -> RequestBuilder {
        match cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// GET a path, sending `cookie` as the `Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<Page, ClientError> {
        let request = Self::with_cookie(self.client.get(self.url(path)), cookie);
        let page = Page::read(request.send().await?).await?;
        tracing::debug!(path = %path, status = %page.status, "GET");
        Ok(page)
    }

    /// POST a form to a path without following redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    pub async fn post_form(
        &self,
        path: &str,
        cookie: Option<&str>,
        form: &[(&str, &str)],
    ) -> Result<Page, ClientError> {
        let request = Self::with_cookie(self.login_client.post(self.url(path)), cookie).form(form);
        let page = Page::read(request.send().await?).await?;
        tracing::debug!(path = %path, status = %page.status, "POST");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(content_type: Option<&str>, cookies: &[(&str, &str)]) -> Page {
        Page {
            status: StatusCode::OK,
            content_type: content_type.map(str::to_string),
            cookies: cookies
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn json_detection() {
        assert!(page(Some("application/json"), &[]).is_json());
        assert!(page(Some("application/json; charset=utf-8"), &[]).is_json());
        assert!(!page(Some("text/html; charset=UTF-8"), &[]).is_json());
        assert!(!page(None, &[]).is_json());
    }

    #[test]
    fn cookie_lookup_and_header() {
        let p = page(None, &[("PHPSESSID", "abc"), ("eZSESSID", "xyz")]);
        assert_eq!(p.cookie("eZSESSID"), Some("xyz"));
        assert_eq!(p.cookie("missing"), None);
        assert_eq!(p.cookie_header().unwrap(), "PHPSESSID=abc; eZSESSID=xyz");
        assert_eq!(page(None, &[]).cookie_header(), None);
    }

    #[test]
    fn transport_trims_trailing_slash() {
        let transport = Transport::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(transport.url("/statMData/1"), "http://localhost:8080/statMData/1");
    }
}

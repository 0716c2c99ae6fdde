//! Portal contract: page paths, endpoints, cookie and form field names.
//!
//! None of this is documented upstream; it mirrors what the customer portal
//! serves today and is kept in one immutable value so tests (or a future
//! portal revision) can substitute their own.

/// Pattern capturing the login token from the escaped JSON embedded in the login page.
pub const CSRF_TOKEN_PATTERN: &str = r"\\u0022csrfToken\\u0022\\u003A\\u0022([^,]+)\\u0022";

/// Pattern capturing the meter id from links on the consumption history page.
pub const METER_ID_PATTERN: &str = r"/month/([0-9]+)";

/// Static description of the portal the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalLayout {
    /// Login form page, fetched for the token then posted to.
    pub login_page: &'static str,
    /// Text present in the body of a successful login response.
    pub dashboard_marker: &'static str,
    /// Consumption history page carrying the meter id.
    pub consumption_page: &'static str,
    /// Daily series endpoint: `<endpoint>/<year>/<month>/<meter id>`.
    pub daily_endpoint: &'static str,
    /// Monthly series endpoint: `<endpoint>/<meter id>`.
    pub monthly_endpoint: &'static str,
    /// Contract list endpoint.
    pub contracts_endpoint: &'static str,
    /// Name of the cookie carrying the authenticated session.
    pub session_cookie: &'static str,
    /// Regex with one capture group for the login token.
    pub csrf_token_pattern: &'static str,
    /// Regex with one capture group for the meter id.
    pub meter_id_pattern: &'static str,
    /// Form field for the login token.
    pub token_field: &'static str,
    /// Form field names that all receive the username.
    pub username_fields: &'static [&'static str],
    /// Form field names that all receive the password.
    pub password_fields: &'static [&'static str],
    /// Contract fields that only matter to the portal UI.
    pub contract_fields_to_strip: &'static [&'static str],
}

impl PortalLayout {
    /// Form body for the login POST.
    ///
    /// Every field-name alias the portal has used is sent, so one request
    /// works across portal versions.
    #[must_use]
    pub fn login_form<'a>(
        &self,
        token: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![(self.token_field, token)];
        form.extend(self.username_fields.iter().map(|f| (*f, username)));
        form.extend(self.password_fields.iter().map(|f| (*f, password)));
        form
    }

    /// Path of the daily series for a month.
    #[must_use]
    pub fn daily_path(&self, year: i32, month: u32, meter_id: &str) -> String {
        format!("{}/{year}/{month}/{meter_id}", self.daily_endpoint)
    }

    /// Path of the monthly series.
    #[must_use]
    pub fn monthly_path(&self, meter_id: &str) -> String {
        format!("{}/{meter_id}", self.monthly_endpoint)
    }
}

impl Default for PortalLayout {
    fn default() -> Self {
        Self {
            login_page: "je-me-connecte",
            dashboard_marker: "tableau-de-bord",
            consumption_page: "historique-de-consommation-tr",
            daily_endpoint: "statJData",
            monthly_endpoint: "statMData",
            contracts_endpoint: "donnees-contrats",
            session_cookie: "eZSESSID",
            csrf_token_pattern: CSRF_TOKEN_PATTERN,
            meter_id_pattern: METER_ID_PATTERN,
            token_field: "_csrf_token",
            username_fields: &["_username", "signin[username]", "tsme_user_login[_username]"],
            password_fields: &["_password", "tsme_user_login[_password]"],
            contract_fields_to_strip: &["website-link", "searchData"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_sends_every_alias() {
        let layout = PortalLayout::default();
        let form = layout.login_form("tok", "me@example.com", "secret");

        assert_eq!(form[0], ("_csrf_token", "tok"));
        for field in ["_username", "signin[username]", "tsme_user_login[_username]"] {
            assert!(form.contains(&(field, "me@example.com")), "missing {field}");
        }
        for field in ["_password", "tsme_user_login[_password]"] {
            assert!(form.contains(&(field, "secret")), "missing {field}");
        }
        assert_eq!(form.len(), 6);
    }

    #[test]
    fn resource_paths() {
        let layout = PortalLayout::default();
        assert_eq!(layout.daily_path(2023, 3, "42"), "statJData/2023/3/42");
        assert_eq!(layout.monthly_path("42"), "statMData/42");
    }
}

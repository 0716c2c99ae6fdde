//! Customer portals that expose the consumption API.

use std::fmt;
use std::str::FromStr;

/// Path under the provider's host where the customer account lives.
const ACCOUNT_PATH: &str = "mon-compte-en-ligne";

/// Water utility portal to connect to.
///
/// Known providers resolve to their account base URL. Anything else is taken
/// as a literal base URL, which is how test servers are wired in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Provider {
    /// Suez, on toutsurmoneau.fr.
    #[default]
    Suez,
    /// Eau d'Olivet, on eau-olivet.fr.
    EauOlivet,
    /// Explicit base URL, used verbatim.
    Custom(String),
}

impl Provider {
    /// Display name of the provider, or its URL for custom providers.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Suez => "Suez",
            Self::EauOlivet => "Eau Olivet",
            Self::Custom(url) => url.as_str(),
        }
    }

    /// Base URL that portal page paths and API endpoints are appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        match self {
            Self::Suez => format!("https://www.toutsurmoneau.fr/{ACCOUNT_PATH}"),
            Self::EauOlivet => format!("https://www.eau-olivet.fr/{ACCOUNT_PATH}"),
            Self::Custom(url) => url.trim_end_matches('/').to_string(),
        }
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Suez" => Self::Suez,
            "Eau Olivet" => Self::EauOlivet,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_resolve_to_account_url() {
        assert_eq!(
            Provider::Suez.base_url(),
            "https://www.toutsurmoneau.fr/mon-compte-en-ligne"
        );
        assert_eq!(
            Provider::EauOlivet.base_url(),
            "https://www.eau-olivet.fr/mon-compte-en-ligne"
        );
    }

    #[test]
    fn parse_by_name_or_url() {
        assert_eq!("Suez".parse::<Provider>().unwrap(), Provider::Suez);
        assert_eq!("Eau Olivet".parse::<Provider>().unwrap(), Provider::EauOlivet);
        let custom: Provider = "http://localhost:8080/".parse().unwrap();
        assert_eq!(custom.base_url(), "http://localhost:8080");
    }

    #[test]
    fn default_is_suez() {
        assert_eq!(Provider::default(), Provider::Suez);
    }
}

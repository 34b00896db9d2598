use serde::{Deserialize, Serialize};
use url::Url;

/// Regional API server selector.
///
/// The vendor operates two developer-API deployments on distinct
/// subdomains; accounts are bound to the region they registered in,
/// so picking the wrong one fails authentication rather than routing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Region {
    /// Europe (`eu1`).
    Eu1,
    /// United States (`us1`).
    Us1,
}

impl Region {
    /// The server identifier used as the subdomain prefix.
    pub fn server_id(self) -> &'static str {
        match self {
            Self::Eu1 => "eu1",
            Self::Us1 => "us1",
        }
    }

    /// Base URL of the regional developer API.
    pub fn base_url(self) -> Url {
        let raw = format!("https://{}-developer.deyecloud.com", self.server_id());
        Url::parse(&raw).expect("region base URL is valid")
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::Eu1
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The ATS platforms we know how to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Greenhouse,
    Lever,
    SmartRecruiters,
    Ashby,
    Workday,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Greenhouse => "greenhouse",
            Provider::Lever => "lever",
            Provider::SmartRecruiters => "smartrecruiters",
            Provider::Ashby => "ashby",
            Provider::Workday => "workday",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greenhouse" => Ok(Provider::Greenhouse),
            "lever" => Ok(Provider::Lever),
            "smartrecruiters" => Ok(Provider::SmartRecruiters),
            "ashby" => Ok(Provider::Ashby),
            "workday" => Ok(Provider::Workday),
            other => Err(format!("Unknown ATS provider '{other}'")),
        }
    }
}

/// One external listing feed to poll: a provider plus the company's
/// handle on that provider's board, with optional provider-specific
/// extras (e.g. a Workday tenant host).
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub provider: Provider,
    pub company_handle: String,
    pub extra: BTreeMap<String, String>,
}

impl SourceDescriptor {
    pub fn new(provider: Provider, company_handle: &str) -> Self {
        Self {
            provider,
            company_handle: company_handle.to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key.to_string(), value.to_string());
        self
    }
}

/// Static registry of sources to poll. Immutable at runtime; taxonomy of
/// companies is reviewed in code rather than stored in the database.
pub fn registry() -> Vec<SourceDescriptor> {
    use Provider::*;
    vec![
        SourceDescriptor::new(Greenhouse, "stripe"),
        SourceDescriptor::new(Greenhouse, "cloudflare"),
        SourceDescriptor::new(Greenhouse, "datadog"),
        SourceDescriptor::new(Greenhouse, "gitlab"),
        SourceDescriptor::new(Lever, "netflix"),
        SourceDescriptor::new(Lever, "spotify"),
        SourceDescriptor::new(Lever, "plaid"),
        SourceDescriptor::new(SmartRecruiters, "bosch").with_extra("limit", "100"),
        SourceDescriptor::new(SmartRecruiters, "visa").with_extra("limit", "100"),
        SourceDescriptor::new(Ashby, "linear"),
        SourceDescriptor::new(Ashby, "ramp"),
        // Tenant host recorded for when the Workday fetcher lands.
        SourceDescriptor::new(Workday, "salesforce")
            .with_extra("host", "salesforce.wd1.myworkdayjobs.com"),
    ]
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobyError;

/// External job board a search fans out to.
///
/// Variant order is the merge order used when concatenating per-source results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Indeed,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Glassdoor,
    Google,
    ZipRecruiter,
}

impl SourceId {
    pub const ALL: [SourceId; 5] = [
        SourceId::Indeed,
        SourceId::LinkedIn,
        SourceId::Glassdoor,
        SourceId::Google,
        SourceId::ZipRecruiter,
    ];

    pub fn defaults() -> Vec<SourceId> {
        vec![SourceId::Indeed, SourceId::LinkedIn]
    }

    /// Site name as understood by the scrape service.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Indeed => "indeed",
            SourceId::LinkedIn => "linkedin",
            SourceId::Glassdoor => "glassdoor",
            SourceId::Google => "google",
            SourceId::ZipRecruiter => "zip_recruiter",
        }
    }

    /// Response key carrying this source's contribution, e.g. `indeed_count`.
    pub fn count_key(&self) -> String {
        format!("{}_count", self.as_str())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = JobyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized || id.as_str().replace('_', "") == normalized)
            .ok_or_else(|| JobyError::UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_site_names() {
        assert_eq!("indeed".parse::<SourceId>().unwrap(), SourceId::Indeed);
        assert_eq!("LinkedIn".parse::<SourceId>().unwrap(), SourceId::LinkedIn);
        assert_eq!("zip recruiter".parse::<SourceId>().unwrap(), SourceId::ZipRecruiter);
        assert_eq!("ziprecruiter".parse::<SourceId>().unwrap(), SourceId::ZipRecruiter);
        assert!("monster".parse::<SourceId>().is_err());
    }

    #[test]
    fn count_key_uses_site_name() {
        assert_eq!(SourceId::Indeed.count_key(), "indeed_count");
        assert_eq!(SourceId::LinkedIn.count_key(), "linkedin_count");
    }

    #[test]
    fn serde_matches_site_name() {
        for id in SourceId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }
}

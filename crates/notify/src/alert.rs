//! Stored saved searches and their delivery cadence.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use joby_core::{JobScope, SearchRequestBody, Seniority};

use crate::traits::NotifyError;

/// How often an alert is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    TwiceWeek,
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::TwiceWeek, Frequency::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::TwiceWeek => "twice_week",
            Frequency::Weekly => "weekly",
        }
    }

    /// Look-back window sent as `days_back`, wide enough to cover the gap
    /// between two deliveries.
    pub fn days_back(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::TwiceWeek => 3,
            Frequency::Weekly => 7,
        }
    }

    /// Delivery schedule as a 5-field cron expression (UTC).
    pub fn cron_expr(&self) -> &'static str {
        match self {
            Frequency::Daily => "0 8 * * *",
            Frequency::TwiceWeek => "0 8 * * Mon,Thu",
            Frequency::Weekly => "0 8 * * Mon",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| {
                NotifyError::Config(format!(
                    "unknown frequency '{s}' (expected daily, twice_week or weekly)"
                ))
            })
    }
}

/// Owner of an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Subscriber {
    /// First name when present, otherwise the local part of the address.
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(self.email.as_str()),
        }
    }
}

/// A saved search replayed on a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAlert {
    pub id: String,
    pub title: String,
    pub seniority: Seniority,
    #[serde(default)]
    pub country: String,
    pub location: String,
    #[serde(default)]
    pub dist: i64,
    #[serde(default = "default_job_scope")]
    pub job_scope: String,
    pub frequency: Frequency,
    #[serde(default = "default_email_enabled")]
    pub email_enabled: bool,
    #[serde(default)]
    pub last_sent_at: Option<DateTime<Utc>>,
    pub subscriber: Subscriber,
}

fn default_job_scope() -> String {
    JobScope::Fulltime.as_str().to_string()
}

fn default_email_enabled() -> bool {
    true
}

impl JobAlert {
    /// Stored scope mapped to its canonical name; anything unrecognized
    /// is searched as full time.
    pub fn normalized_scope(&self) -> JobScope {
        self.job_scope.parse().unwrap_or(JobScope::Fulltime)
    }

    /// Body posted to `/jobs_search` for this alert.
    pub fn search_body(&self) -> SearchRequestBody {
        SearchRequestBody {
            title: self.title.clone(),
            seniority: self.seniority.as_str().to_string(),
            country: self.country.clone(),
            location: self.location.clone(),
            dist: self.dist,
            job_scope: self.normalized_scope().as_str().to_string(),
            days_back: self.frequency.days_back(),
        }
    }
}

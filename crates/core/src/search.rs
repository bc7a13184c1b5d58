//! Search request types and their validation.
//!
//! `SearchRequestBody` is the loose wire shape; `SearchRequest` is the
//! validated, immutable value the engine works with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobyError;

/// Requested experience tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Intern,
    Junior,
    Senior,
    Chief,
}

impl Seniority {
    pub const ALL: [Seniority; 4] = [
        Seniority::Intern,
        Seniority::Junior,
        Seniority::Senior,
        Seniority::Chief,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Intern => "intern",
            Seniority::Junior => "junior",
            Seniority::Senior => "senior",
            Seniority::Chief => "chief",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seniority {
    type Err = JobyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Seniority::ALL
            .into_iter()
            .find(|tier| tier.as_str() == lowered)
            .ok_or_else(|| {
                JobyError::validation(
                    "seniority",
                    format!("'{s}' is not one of intern, junior, senior, chief"),
                )
            })
    }
}

/// Employment type filter passed to every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobScope {
    Fulltime,
    Parttime,
    Temporary,
}

impl JobScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobScope::Fulltime => "fulltime",
            JobScope::Parttime => "parttime",
            JobScope::Temporary => "temporary",
        }
    }
}

impl fmt::Display for JobScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobScope {
    type Err = JobyError;

    /// Accepts the canonical names and the spaced spellings ("full time").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        match compact.as_str() {
            "fulltime" => Ok(JobScope::Fulltime),
            "parttime" => Ok(JobScope::Parttime),
            "temporary" => Ok(JobScope::Temporary),
            _ => Err(JobyError::validation(
                "job_scope",
                format!("'{s}' is not one of fulltime, parttime, temporary"),
            )),
        }
    }
}

/// JSON body of `POST /jobs_search`, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequestBody {
    pub title: String,
    pub seniority: String,
    #[serde(default)]
    pub country: String,
    pub location: String,
    #[serde(default, alias = "distance")]
    pub dist: i64,
    #[serde(default = "default_job_scope")]
    pub job_scope: String,
    #[serde(default = "default_days_back")]
    pub days_back: i64,
}

fn default_job_scope() -> String {
    JobScope::Fulltime.as_str().to_string()
}

fn default_days_back() -> i64 {
    1
}

/// A validated search. Constructed once per incoming call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub title: String,
    pub seniority: Seniority,
    pub country: String,
    pub location: String,
    pub distance: u32,
    pub job_scope: JobScope,
    pub days_back: u32,
}

impl SearchRequest {
    /// Recency window handed to sources.
    pub fn hours_old(&self) -> u32 {
        self.days_back.saturating_mul(24)
    }
}

impl TryFrom<SearchRequestBody> for SearchRequest {
    type Error = JobyError;

    fn try_from(body: SearchRequestBody) -> Result<Self, Self::Error> {
        let seniority: Seniority = body.seniority.parse()?;
        let job_scope: JobScope = body.job_scope.parse()?;

        let title = body.title.trim().to_string();
        if title.is_empty() {
            return Err(JobyError::validation("title", "must not be empty"));
        }
        let location = body.location.trim().to_string();
        if location.is_empty() {
            return Err(JobyError::validation("location", "must not be empty"));
        }
        let distance = u32::try_from(body.dist)
            .map_err(|_| JobyError::validation("dist", format!("{} is not a distance >= 0", body.dist)))?;
        let days_back = u32::try_from(body.days_back)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                JobyError::validation("days_back", format!("{} is not a day count > 0", body.days_back))
            })?;

        Ok(SearchRequest {
            title,
            seniority,
            country: body.country.trim().to_string(),
            location,
            distance,
            job_scope,
            days_back,
        })
    }
}

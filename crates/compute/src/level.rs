//! Confirmatory seniority inference for records without a level.
//!
//! The inferencer only answers "does this record look like tier X?" for the
//! tier the current search asks about. It never assigns a different tier.

use std::sync::LazyLock;

use regex::Regex;

use joby_core::{RawJobRecord, Seniority, SourceId};

use crate::types::ClassifiedJob;

/// Keywords per tier, as regex fragments. Matched as whole words,
/// case-insensitive; plural and long forms are spelled out as optional
/// suffixes so short stems like `sr` keep strict boundaries.
const INTERN_KEYWORDS: &[&str] = &["interns?", "internships?", "students?"];
const JUNIOR_KEYWORDS: &[&str] = &["junior", "jr", "entry level", "grad(?:uate)?s?"];
const SENIOR_KEYWORDS: &[&str] = &["senior", "sr"];
const CHIEF_KEYWORDS: &[&str] = &["chief"];

pub fn keywords(tier: Seniority) -> &'static [&'static str] {
    match tier {
        Seniority::Intern => INTERN_KEYWORDS,
        Seniority::Junior => JUNIOR_KEYWORDS,
        Seniority::Senior => SENIOR_KEYWORDS,
        Seniority::Chief => CHIEF_KEYWORDS,
    }
}

/// Whole-word alternation; a space inside a keyword also matches `-`/`_`
/// so URL slugs like `entry-level` count.
fn keyword_pattern(words: &[&str]) -> Regex {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| {
            w.split(' ')
                .collect::<Vec<_>>()
                .join(r"[\s_-]+")
        })
        .collect();
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern).expect("keyword patterns are valid regexes")
}

static TIER_PATTERNS: LazyLock<[(Seniority, Regex); 4]> = LazyLock::new(|| {
    Seniority::ALL.map(|tier| (tier, keyword_pattern(keywords(tier))))
});

fn pattern_for(tier: Seniority) -> &'static Regex {
    // ALL is in declaration order, so the discriminant is the index.
    &TIER_PATTERNS[tier as usize].1
}

/// Text the inferencer looks at: the title and the detail URL.
fn inspected_text(record: &RawJobRecord) -> String {
    [record.title.as_deref(), record.job_url.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Some(target)` when the record's title/URL carries a keyword of `target`.
pub fn infer(record: &RawJobRecord, target: Seniority) -> Option<Seniority> {
    let text = inspected_text(record);
    pattern_for(target).is_match(&text).then_some(target)
}

/// Keep the source's level when present, otherwise try to confirm `target`.
pub fn classify(source: SourceId, record: RawJobRecord, target: Seniority) -> ClassifiedJob {
    let job_level = match record.job_level.as_deref() {
        Some(level) if !level.trim().is_empty() => Some(level.to_string()),
        _ => infer(&record, target).map(|tier| tier.as_str().to_string()),
    };
    ClassifiedJob {
        source,
        record,
        job_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> RawJobRecord {
        RawJobRecord {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn confirms_only_the_requested_tier() {
        let rec = titled("Junior Backend Intern");
        assert_eq!(infer(&rec, Seniority::Intern), Some(Seniority::Intern));
        assert_eq!(infer(&rec, Seniority::Junior), Some(Seniority::Junior));
        assert_eq!(infer(&rec, Seniority::Senior), None);
        assert_eq!(infer(&rec, Seniority::Chief), None);
    }

    #[test]
    fn matches_whole_words_only() {
        // "sr" inside "Israel", "intern" inside "international"
        let rec = RawJobRecord {
            title: Some("International Sales Manager".into()),
            job_url: Some("https://jobs.example.com/israel/12345".into()),
            ..Default::default()
        };
        assert_eq!(infer(&rec, Seniority::Senior), None);
        assert_eq!(infer(&rec, Seniority::Intern), None);
    }

    #[test]
    fn inspects_detail_url_slug() {
        let rec = RawJobRecord {
            title: Some("Software Engineer".into()),
            job_url: Some("https://www.linkedin.com/jobs/view/entry-level-software-engineer-at-acme-42".into()),
            ..Default::default()
        };
        assert_eq!(infer(&rec, Seniority::Junior), Some(Seniority::Junior));
    }

    #[test]
    fn abbreviations_and_case() {
        assert_eq!(infer(&titled("Sr. DevOps Engineer"), Seniority::Senior), Some(Seniority::Senior));
        assert_eq!(infer(&titled("JR QA tester"), Seniority::Junior), Some(Seniority::Junior));
        assert_eq!(infer(&titled("Chief Technology Officer"), Seniority::Chief), Some(Seniority::Chief));
        assert_eq!(infer(&titled("Student Position - Data"), Seniority::Intern), Some(Seniority::Intern));
    }

    #[test]
    fn plural_and_long_forms_match() {
        assert_eq!(
            infer(&titled("Graduate Software Engineer"), Seniority::Junior),
            Some(Seniority::Junior)
        );
        assert_eq!(
            infer(&titled("Software Engineering Internships 2026"), Seniority::Intern),
            Some(Seniority::Intern)
        );
        assert_eq!(infer(&titled("Hiring Interns"), Seniority::Intern), Some(Seniority::Intern));
        assert_eq!(infer(&titled("Graders Wanted"), Seniority::Junior), None);
        assert_eq!(infer(&titled("Internal Tools Engineer"), Seniority::Intern), None);
    }

    #[test]
    fn empty_record_is_unresolved() {
        assert_eq!(infer(&RawJobRecord::default(), Seniority::Junior), None);
    }

    #[test]
    fn classify_keeps_source_level() {
        let mut rec = titled("Senior Engineer");
        rec.job_level = Some("mid-senior level".into());
        let job = classify(SourceId::LinkedIn, rec.clone(), Seniority::Junior);
        assert_eq!(job.job_level.as_deref(), Some("mid-senior level"));
        assert_eq!(job.record, rec);
    }

    #[test]
    fn classify_fills_missing_level_without_touching_record() {
        let rec = titled("Graduate Program - Grad Developer");
        let job = classify(SourceId::Indeed, rec.clone(), Seniority::Junior);
        assert_eq!(job.job_level.as_deref(), Some("junior"));
        assert!(job.record.job_level.is_none());
        assert_eq!(job.clone().into_record().job_level.as_deref(), Some("junior"));

        let unresolved = classify(SourceId::Indeed, titled("Developer"), Seniority::Junior);
        assert!(unresolved.job_level.is_none());
    }
}

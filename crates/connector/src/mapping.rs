//! Per-board translation of a `SearchRequest` into a `SourceQuery`.
//!
//! Indeed has no seniority facet, so the tier goes into the search term.
//! LinkedIn geocodes cities but not administrative districts, so district
//! names are swapped for a representative city.

use joby_core::{SearchRequest, SourceId};

use crate::source::SourceQuery;

/// District (or region nickname) → representative city.
const DISTRICT_CITIES: &[(&str, &str)] = &[
    ("tel aviv district", "Tel Aviv"),
    ("gush dan", "Tel Aviv"),
    ("central district", "Rishon LeZion"),
    ("center district", "Rishon LeZion"),
    ("center", "Rishon LeZion"),
    ("central", "Rishon LeZion"),
    ("hamerkaz", "Rishon LeZion"),
    ("sharon", "Netanya"),
    ("jerusalem district", "Jerusalem"),
    ("haifa district", "Haifa"),
    ("northern district", "Nazareth"),
    ("north", "Nazareth"),
    ("hatzafon", "Nazareth"),
    ("southern district", "Beersheba"),
    ("south", "Beersheba"),
    ("hadarom", "Beersheba"),
    ("judea and samaria", "Ariel"),
    ("judea and samaria area", "Ariel"),
];

/// Look up the representative city for a district name (case/space-insensitive).
pub fn city_for_district(location: &str) -> Option<&'static str> {
    let normalized = location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    DISTRICT_CITIES
        .iter()
        .find(|(district, _)| *district == normalized)
        .map(|(_, city)| *city)
}

pub fn query_for(site: SourceId, request: &SearchRequest, results_wanted: u32) -> SourceQuery {
    let mut query = SourceQuery {
        site_name: site,
        search_term: request.title.clone(),
        location: request.location.clone(),
        distance: request.distance,
        job_type: request.job_scope.as_str().to_string(),
        job_level: Some(request.seniority.as_str().to_string()),
        results_wanted,
        hours_old: request.hours_old(),
        country_indeed: request.country.clone(),
        linkedin_fetch_description: false,
    };

    match site {
        SourceId::Indeed => {
            query.search_term = format!("{} {}", request.seniority, request.title);
            query.job_level = None;
        }
        SourceId::LinkedIn => {
            let city = city_for_district(&request.location).unwrap_or(request.location.as_str());
            query.location = if request.country.is_empty() {
                city.to_string()
            } else {
                format!("{}, {}", city, request.country)
            };
            query.linkedin_fetch_description = true;
        }
        SourceId::Glassdoor | SourceId::Google | SourceId::ZipRecruiter => {}
    }

    query
}

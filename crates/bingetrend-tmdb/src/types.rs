//! Response types for the TMDB v3 endpoints used by enrichment.
//!
//! Movie and TV detail payloads share one struct: the fields that differ
//! (`title`/`name`, `release_date`/`first_air_date`,
//! `runtime`/`episode_run_time`) are all optional.

use bingetrend_core::null_as_default;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// /find/{external_id}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct FindResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub movie_results: Vec<FindResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tv_results: Vec<FindResult>,
}

/// One match from the find endpoint. Only the id is needed to fetch details.
#[derive(Debug, Deserialize)]
pub struct FindResult {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// /movie/{id} and /tv/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TmdbDetails {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_run_time: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<NamedRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_companies: Vec<NamedRef>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

impl TmdbDetails {
    /// Movie title or show name, whichever is present and non-blank.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref()).or_else(|| non_blank(self.name.as_deref()))
    }

    #[must_use]
    pub fn display_release_date(&self) -> Option<&str> {
        non_blank(self.release_date.as_deref())
            .or_else(|| non_blank(self.first_air_date.as_deref()))
    }

    /// Movie runtime, else the first listed episode runtime. Zero means unknown.
    #[must_use]
    pub fn display_runtime(&self) -> Option<u32> {
        self.runtime
            .filter(|m| *m > 0)
            .or_else(|| self.episode_run_time.first().copied().filter(|m| *m > 0))
    }

    /// A payload with no title and no overview carries nothing worth merging.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_title().is_none() && non_blank(self.overview.as_deref()).is_none()
    }
}

/// `{ "id": .., "name": .. }` as used for genres and production companies.
#[derive(Debug, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cast: Vec<TmdbCast>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crew: Vec<TmdbCrew>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCast {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCrew {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

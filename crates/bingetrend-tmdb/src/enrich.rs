//! Merges TMDB metadata into the agent's program record.
//!
//! Enrichment never fails: a missing key, a missing IMDb id or any lookup
//! error produces a fallback record built from the program alone.

use bingetrend_core::{CastMember, CrewMember, EnrichedProgram, EnrichmentSource, Program};

use crate::client::TmdbClient;
use crate::types::{non_blank, TmdbDetails};

pub const NO_OVERVIEW: &str = "No overview available";
pub const NO_DESCRIPTION: &str = "No description available";

pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "w1280";

/// Builds a display record for `program`, consulting TMDB when possible.
pub async fn enrich_program(client: Option<&TmdbClient>, program: &Program) -> EnrichedProgram {
    let Some(imdb_id) = program.external_id() else {
        tracing::debug!(title = %program.title, "no IMDb id, using fallback");
        return fallback(program);
    };
    let Some(client) = client else {
        tracing::debug!(imdb_id, "no TMDB key configured, using fallback");
        return fallback(program);
    };

    match client.lookup(program.program_type, imdb_id).await {
        Ok(details) if details.is_empty() => {
            tracing::info!(imdb_id, "TMDB returned an empty record, using fallback");
            fallback(program)
        }
        Ok(details) => merge_details(program, &details),
        Err(e) => {
            tracing::warn!(imdb_id, error = %e, "TMDB lookup failed, using fallback");
            fallback(program)
        }
    }
}

/// Record built from the program alone.
#[must_use]
pub fn fallback(program: &Program) -> EnrichedProgram {
    EnrichedProgram {
        title: program.title.clone(),
        overview: non_blank(program.description.as_deref())
            .unwrap_or(NO_DESCRIPTION)
            .to_owned(),
        tagline: None,
        poster_path: non_blank(program.poster_path.as_deref()).map(str::to_owned),
        backdrop_path: None,
        release_date: program.release_date_from_year(),
        vote_average: None,
        runtime: None,
        genres: Vec::new(),
        production_companies: Vec::new(),
        cast: Vec::new(),
        crew: Vec::new(),
        tmdb_id: None,
        source: EnrichmentSource::Fallback,
    }
}

/// Field-by-field merge where TMDB wins whenever it has a non-empty value.
#[must_use]
pub fn merge_details(program: &Program, details: &TmdbDetails) -> EnrichedProgram {
    let credits = details.credits.as_ref();

    EnrichedProgram {
        title: details
            .display_title()
            .unwrap_or(&program.title)
            .to_owned(),
        overview: non_blank(details.overview.as_deref())
            .or_else(|| non_blank(program.description.as_deref()))
            .unwrap_or(NO_OVERVIEW)
            .to_owned(),
        tagline: non_blank(details.tagline.as_deref()).map(str::to_owned),
        poster_path: non_blank(details.poster_path.as_deref())
            .or_else(|| non_blank(program.poster_path.as_deref()))
            .map(str::to_owned),
        backdrop_path: non_blank(details.backdrop_path.as_deref()).map(str::to_owned),
        release_date: details
            .display_release_date()
            .map(str::to_owned)
            .or_else(|| program.release_date_from_year()),
        vote_average: details.vote_average.filter(|v| *v > 0.0),
        runtime: details.display_runtime(),
        genres: details.genres.iter().map(|g| g.name.clone()).collect(),
        production_companies: details
            .production_companies
            .iter()
            .map(|c| c.name.clone())
            .collect(),
        cast: credits
            .map(|c| {
                c.cast
                    .iter()
                    .map(|m| CastMember {
                        name: m.name.clone(),
                        character: m.character.clone(),
                        profile_path: m.profile_path.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        crew: credits
            .map(|c| {
                c.crew
                    .iter()
                    .map(|m| CrewMember {
                        name: m.name.clone(),
                        job: m.job.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        tmdb_id: Some(details.id),
        source: EnrichmentSource::Tmdb,
    }
}

/// Full image URL for a TMDB poster path at `size` (e.g. [`POSTER_SIZE`]).
#[must_use]
pub fn poster_url(image_base: &str, path: &str, size: &str) -> String {
    format!(
        "{}/{}/{}",
        image_base.trim_end_matches('/'),
        size,
        path.trim_start_matches('/')
    )
}

#[must_use]
pub fn backdrop_url(image_base: &str, path: &str) -> String {
    poster_url(image_base, path, BACKDROP_SIZE)
}

//! `enrich`: look up one program the way `analyze --enrich` does.

use bingetrend_core::{AppConfig, Program, ProgramKind};
use bingetrend_tmdb::{enrich_program, TmdbClient};

use crate::output::format_enriched;

#[derive(Debug, Clone)]
pub(crate) struct EnrichRequest {
    pub imdb_id: String,
    pub kind: ProgramKind,
    pub title: String,
    pub year: Option<i32>,
    pub description: Option<String>,
}

impl EnrichRequest {
    fn into_program(self) -> Program {
        Program {
            title: self.title,
            program_type: self.kind,
            release_year: self.year,
            description: self.description,
            cast: Vec::new(),
            explanation_of_trend: None,
            imdb_id: Some(self.imdb_id),
            poster_path: None,
        }
    }
}

/// # Errors
///
/// Returns an error only if the TMDB client cannot be constructed from the
/// config. Lookup failures print the fallback record.
pub(crate) async fn run_enrich(config: &AppConfig, request: EnrichRequest) -> anyhow::Result<()> {
    let tmdb = TmdbClient::from_config(config)?;
    if tmdb.is_none() {
        tracing::warn!("TMDB_API_KEY not set; showing agent data only");
    }
    let enriched = enrich_program(tmdb.as_ref(), &request.into_program()).await;
    println!("{}", format_enriched(&enriched, &config.tmdb_image_base_url));
    Ok(())
}

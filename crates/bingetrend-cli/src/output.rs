//! Plain-text rendering of batch rows and enriched programs.

use bingetrend_agent::BatchSummary;
use bingetrend_core::{EnrichedProgram, EnrichmentSource, RowStatus, TrendResult};
use bingetrend_tmdb::{backdrop_url, poster_url, POSTER_SIZE};

const TOP_CAST: usize = 5;
const MAX_DIRECTORS: usize = 3;

/// Shortens `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// One-block report for a resolved batch row.
pub(crate) fn format_row(position: usize, total: usize, row: &TrendResult) -> String {
    let mut lines = vec![format!(
        "[{position}/{total}] {:<10} {}",
        row.status.to_string().to_uppercase(),
        truncate(row.query.as_str(), 70)
    )];

    match (&row.status, &row.outcome) {
        (RowStatus::Errored, _) => {
            lines.push(format!(
                "    error: {}",
                row.error.as_deref().unwrap_or("unknown error")
            ));
        }
        (_, Some(outcome)) => {
            lines.push(format!("    result: {}", outcome.classify()));
            if let Some(program) = &outcome.program {
                let year = program
                    .release_year
                    .map(|y| format!(", {y}"))
                    .unwrap_or_default();
                lines.push(format!(
                    "    program: {} ({}{year})",
                    program.title, program.program_type
                ));
                if let Some(why) = program.explanation_of_trend.as_deref() {
                    lines.push(format!("    why: {}", truncate(why, 160)));
                }
            }
            if let Some(text) = outcome.error.as_deref().or(outcome.message.as_deref()) {
                lines.push(format!("    note: {text}"));
            }
        }
        _ => {}
    }

    if !row.logs.is_empty() {
        lines.push(format!(
            "    logs: {} entries ({})",
            row.logs.len(),
            row.correlation_id
        ));
    }
    lines.join("\n")
}

pub(crate) fn format_summary(summary: &BatchSummary) -> String {
    format!(
        "{} queries: {} completed, {} errored | trending {}, not trending {}, no program {}, agent errors {}",
        summary.total,
        summary.completed,
        summary.errored,
        summary.trending_found,
        summary.not_trending,
        summary.no_program_found,
        summary.agent_errors
    )
}

/// Detail view of an enriched program.
pub(crate) fn format_enriched(program: &EnrichedProgram, image_base: &str) -> String {
    let source = match program.source {
        EnrichmentSource::Tmdb => "tmdb",
        EnrichmentSource::Fallback => "fallback",
    };
    let heading = match program.release_year() {
        Some(year) => format!("{} ({year}) [{source}]", program.title),
        None => format!("{} [{source}]", program.title),
    };
    let mut lines = vec![heading];
    if let Some(tagline) = program.tagline.as_deref() {
        lines.push(format!("  \"{tagline}\""));
    }
    lines.push(format!("  {}", program.overview));

    let mut facts = Vec::new();
    if let Some(rating) = program.vote_average {
        facts.push(format!("rating {rating:.1}/10"));
    }
    if let Some(minutes) = program.runtime {
        facts.push(format!("{minutes} min"));
    }
    if let Some(date) = program.release_date.as_deref() {
        facts.push(format!("released {date}"));
    }
    if !facts.is_empty() {
        lines.push(format!("  {}", facts.join(" | ")));
    }

    if !program.genres.is_empty() {
        lines.push(format!("  genres: {}", program.genres.join(", ")));
    }
    if !program.production_companies.is_empty() {
        lines.push(format!(
            "  studios: {}",
            program.production_companies.join(", ")
        ));
    }

    let directors: Vec<&str> = program
        .crew_with_job("Director", MAX_DIRECTORS)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !directors.is_empty() {
        lines.push(format!("  directed by: {}", directors.join(", ")));
    }

    let cast: Vec<String> = program
        .top_cast(TOP_CAST)
        .iter()
        .map(|c| match c.character.as_deref() {
            Some(character) if !character.is_empty() => format!("{} as {character}", c.name),
            _ => c.name.clone(),
        })
        .collect();
    if !cast.is_empty() {
        lines.push(format!("  cast: {}", cast.join(", ")));
    }

    if let Some(path) = program.poster_path.as_deref() {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            poster_url(image_base, path, POSTER_SIZE)
        };
        lines.push(format!("  poster: {url}"));
    }
    if let Some(path) = program.backdrop_path.as_deref() {
        lines.push(format!("  backdrop: {}", backdrop_url(image_base, path)));
    }
    lines.join("\n")
}

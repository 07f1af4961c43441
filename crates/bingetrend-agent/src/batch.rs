//! Sequential batch orchestration over a list of trend queries.
//!
//! A [`BatchRun`] owns one [`TrendResult`] per query, keyed by correlation
//! id. Rows start in [`RowStatus::Processing`] and are resolved one at a
//! time; a failed row never stops the run.

use std::collections::HashMap;
use std::future::Future;

use bingetrend_core::{
    parse_query_block, AnalysisOutcome, CorrelationId, InputError, LogEntry, OutcomeKind,
    RowStatus, TrendBreakdown, TrendQuery, TrendResult,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AgentError;
use crate::relay::LogRelay;

/// One analysis call's inputs.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub query: &'a TrendQuery,
    pub correlation_id: &'a CorrelationId,
    /// Trend-fetch row for this query, when the batch came from a fetch.
    pub trend_datum: Option<&'a TrendBreakdown>,
}

/// Anything that can analyse one query. Implemented by
/// [`crate::AgentClient`]; tests substitute scripted analyzers.
pub trait TrendAnalyzer {
    fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
    ) -> impl Future<Output = Result<AnalysisOutcome, AgentError>> + Send;
}

/// Row counts by status, plus outcome classification of completed rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub errored: usize,
    pub processing: usize,
    pub trending_found: usize,
    pub not_trending: usize,
    pub no_program_found: usize,
    pub agent_errors: usize,
}

pub struct BatchRun {
    run_id: Uuid,
    order: Vec<CorrelationId>,
    rows: HashMap<CorrelationId, TrendResult>,
    side_channel: HashMap<CorrelationId, TrendBreakdown>,
    next: usize,
}

impl BatchRun {
    /// Creates every row up front, in query order, all still processing.
    ///
    /// `side_channel[i]` is attached to `queries[i]`; extra entries are ignored.
    #[must_use]
    pub fn prepare(queries: Vec<TrendQuery>, side_channel: Vec<TrendBreakdown>) -> Self {
        let run_id = Uuid::new_v4();
        let mut order = Vec::with_capacity(queries.len());
        let mut rows = HashMap::with_capacity(queries.len());

        for (index, query) in queries.into_iter().enumerate() {
            let id = CorrelationId::for_row(run_id, index);
            order.push(id.clone());
            rows.insert(id.clone(), TrendResult::pending(query, id));
        }

        let side_channel = order.iter().cloned().zip(side_channel).collect();

        tracing::info!(%run_id, rows = order.len(), "batch prepared");
        Self {
            run_id,
            order,
            rows,
            side_channel,
            next: 0,
        }
    }

    /// Validates a keyword block and prepares a run from it.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyQueryBlock`] if every line is blank.
    pub fn from_block(block: &str, side_channel: Vec<TrendBreakdown>) -> Result<Self, InputError> {
        Ok(Self::prepare(parse_query_block(block)?, side_channel))
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next >= self.order.len()
    }

    /// Rows in query order.
    pub fn results(&self) -> impl Iterator<Item = &TrendResult> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    #[must_use]
    pub fn get(&self, correlation_id: &CorrelationId) -> Option<&TrendResult> {
        self.rows.get(correlation_id)
    }

    #[must_use]
    pub fn trend_datum(&self, correlation_id: &CorrelationId) -> Option<&TrendBreakdown> {
        self.side_channel.get(correlation_id)
    }

    /// Consumes the run, returning rows in query order.
    #[must_use]
    pub fn into_results(mut self) -> Vec<TrendResult> {
        self.order
            .iter()
            .filter_map(|id| self.rows.remove(id))
            .collect()
    }

    /// Resolves the next pending row and returns it, or `None` when done.
    ///
    /// The log stream (if any) is attached before the analysis call and
    /// released after it; a relay that cannot connect only costs the logs.
    pub async fn process_next<A: TrendAnalyzer>(
        &mut self,
        analyzer: &A,
        relay: Option<&LogRelay>,
    ) -> Option<&TrendResult> {
        let index = self.next;
        let id = self.order.get(index)?.clone();
        self.next += 1;

        let query = self.rows.get(&id)?.query.clone();
        tracing::info!(correlation_id = %id, index, query = %query, "analyzing query");

        let subscription = match relay {
            Some(relay) => match relay.subscribe(&id).await {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    tracing::warn!(correlation_id = %id, error = %e, "continuing without logs");
                    None
                }
            },
            None => None,
        };

        let request = AnalysisRequest {
            query: &query,
            correlation_id: &id,
            trend_datum: self.side_channel.get(&id),
        };
        let result = analyzer.analyze(&request).await;

        let logs: Vec<LogEntry> = match subscription {
            Some(subscription) => subscription.close().await,
            None => Vec::new(),
        };

        let row = self.rows.get_mut(&id)?;
        row.processed_at = Some(Utc::now());
        row.logs = logs;
        match result {
            Ok(outcome) => {
                tracing::info!(
                    correlation_id = %id,
                    index,
                    outcome = %outcome.classify(),
                    logs = row.logs.len(),
                    "query completed"
                );
                row.outcome = Some(outcome);
                row.status = RowStatus::Completed;
            }
            Err(e) => {
                tracing::warn!(correlation_id = %id, index, error = %e, "query failed");
                row.error = Some(e.to_string());
                row.status = RowStatus::Errored;
            }
        }
        Some(&*row)
    }

    /// Processes every remaining row in order, calling `on_row` as each
    /// one resolves.
    pub async fn run_to_completion<A, F>(
        &mut self,
        analyzer: &A,
        relay: Option<&LogRelay>,
        mut on_row: F,
    ) where
        A: TrendAnalyzer,
        F: FnMut(&TrendResult),
    {
        while let Some(row) = self.process_next(analyzer, relay).await {
            on_row(row);
        }
        let summary = self.summary();
        tracing::info!(
            run_id = %self.run_id,
            completed = summary.completed,
            errored = summary.errored,
            "batch finished"
        );
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.order.len(),
            ..BatchSummary::default()
        };
        for row in self.results() {
            match row.status {
                RowStatus::Processing => summary.processing += 1,
                RowStatus::Errored => summary.errored += 1,
                RowStatus::Completed => summary.completed += 1,
            }
            match row.outcome.as_ref().map(AnalysisOutcome::classify) {
                Some(OutcomeKind::TrendingFound) => summary.trending_found += 1,
                Some(OutcomeKind::NotTrending) => summary.not_trending += 1,
                Some(OutcomeKind::NoProgramFound) => summary.no_program_found += 1,
                Some(OutcomeKind::AgentError) => summary.agent_errors += 1,
                None => {}
            }
        }
        summary
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;

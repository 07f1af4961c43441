use std::sync::Mutex;

use bingetrend_core::{Program, ProgramKind};

use super::*;

/// Fails any query containing `fail`, otherwise reports a trending movie.
/// Records `(query, correlation_id, trend_datum query text)` per call.
#[derive(Default)]
struct ScriptedAnalyzer {
    calls: Mutex<Vec<(String, String, Option<String>)>>,
}

impl ScriptedAnalyzer {
    fn calls(&self) -> Vec<(String, String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TrendAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<AnalysisOutcome, AgentError> {
        self.calls.lock().unwrap().push((
            request.query.as_str().to_owned(),
            request.correlation_id.as_str().to_owned(),
            request.trend_datum.map(TrendBreakdown::query_text),
        ));

        if request.query.as_str().contains("fail") {
            return Err(AgentError::Api {
                status: 500,
                detail: "Agent crashed".to_owned(),
            });
        }
        Ok(AnalysisOutcome {
            success: true,
            program_is_trending: Some(true),
            program: Some(Program {
                title: request.query.as_str().to_owned(),
                program_type: ProgramKind::Movie,
                release_year: Some(2024),
                description: None,
                cast: Vec::new(),
                explanation_of_trend: None,
                imdb_id: None,
                poster_path: None,
            }),
            message: None,
            error: None,
        })
    }
}

fn queries(texts: &[&str]) -> Vec<TrendQuery> {
    texts.iter().map(|t| TrendQuery((*t).to_owned())).collect()
}

#[test]
fn prepare_creates_one_processing_row_per_query() {
    let run = BatchRun::prepare(queries(&["a", "b", "c"]), Vec::new());
    assert_eq!(run.len(), 3);
    assert!(run
        .results()
        .all(|r| r.status == RowStatus::Processing && r.processed_at.is_none()));

    let texts: Vec<&str> = run.results().map(|r| r.query.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[test]
fn correlation_ids_are_unique_and_carry_index() {
    let run = BatchRun::prepare(queries(&["a", "b"]), Vec::new());
    let ids: Vec<String> = run
        .results()
        .map(|r| r.correlation_id.as_str().to_owned())
        .collect();
    assert_eq!(ids[0], format!("{}-0", run.run_id()));
    assert_eq!(ids[1], format!("{}-1", run.run_id()));

    let other = BatchRun::prepare(queries(&["a"]), Vec::new());
    assert_ne!(other.results().next().unwrap().correlation_id.as_str(), ids[0]);
}

#[test]
fn from_block_rejects_blank_input() {
    assert!(matches!(
        BatchRun::from_block(" \n\n", Vec::new()),
        Err(InputError::EmptyQueryBlock)
    ));
}

#[tokio::test]
async fn partial_failure_keeps_order_and_finishes_every_row() {
    let analyzer = ScriptedAnalyzer::default();
    let mut run = BatchRun::from_block("Dune\nplease fail\nBarbie", Vec::new()).unwrap();

    let mut seen = Vec::new();
    run.run_to_completion(&analyzer, None, |row| {
        seen.push(row.query.as_str().to_owned());
    })
    .await;

    assert_eq!(seen, vec!["Dune", "please fail", "Barbie"]);
    let rows: Vec<&TrendResult> = run.results().collect();
    assert_eq!(rows[0].status, RowStatus::Completed);
    assert_eq!(rows[1].status, RowStatus::Errored);
    assert_eq!(rows[2].status, RowStatus::Completed);
    assert!(rows[1]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("Agent crashed")));
    assert!(rows.iter().all(|r| r.processed_at.is_some()));

    assert_eq!(
        run.summary(),
        BatchSummary {
            total: 3,
            completed: 2,
            errored: 1,
            processing: 0,
            trending_found: 2,
            ..BatchSummary::default()
        }
    );
}

#[tokio::test]
async fn calls_are_sequential_and_tagged_with_row_ids() {
    let analyzer = ScriptedAnalyzer::default();
    let mut run = BatchRun::prepare(queries(&["one", "two"]), Vec::new());

    let first = run.process_next(&analyzer, None).await.unwrap().clone();
    assert_eq!(first.status, RowStatus::Completed);
    let pending: Vec<RowStatus> = run.results().map(|r| r.status).collect();
    assert_eq!(pending, vec![RowStatus::Completed, RowStatus::Processing]);

    run.process_next(&analyzer, None).await.unwrap();
    assert!(run.process_next(&analyzer, None).await.is_none());
    assert!(run.is_finished());

    let calls = analyzer.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, first.correlation_id.as_str());
    assert_eq!(run.get(&first.correlation_id).unwrap().query.as_str(), "one");
}

#[tokio::test]
async fn side_channel_follows_position() {
    let breakdowns: Vec<TrendBreakdown> = ["Dune, Zendaya", "Barbie"]
        .iter()
        .map(|text| TrendBreakdown {
            trend_breakdown: Some(bingetrend_core::types::BreakdownField::Text(
                (*text).to_owned(),
            )),
            ..TrendBreakdown::default()
        })
        .collect();
    let lines: Vec<TrendQuery> = breakdowns
        .iter()
        .map(|b| TrendQuery(b.query_text()))
        .collect();

    let analyzer = ScriptedAnalyzer::default();
    let mut run = BatchRun::prepare(lines, breakdowns);
    run.run_to_completion(&analyzer, None, |_| {}).await;

    let calls = analyzer.calls();
    assert_eq!(calls[0].2.as_deref(), Some("Dune, Zendaya"));
    assert_eq!(calls[1].2.as_deref(), Some("Barbie"));
}

#[tokio::test]
async fn unreachable_relay_costs_only_the_logs() {
    // Nothing listens on port 9 locally; the connect fails fast.
    let relay = LogRelay::new("ws://127.0.0.1:9/ws/logs").unwrap();
    let analyzer = ScriptedAnalyzer::default();
    let mut run = BatchRun::prepare(queries(&["Dune"]), Vec::new());

    let row = run.process_next(&analyzer, Some(&relay)).await.unwrap();
    assert_eq!(row.status, RowStatus::Completed);
    assert!(row.logs.is_empty());
}

//! One scout run: Idle → Running → Completed | Failed.
//!
//! The run executes on its own task, independent of whoever consumes its events. Stage work
//! (fetch, normalize, score, build) runs on a further child task so that a panic inside a
//! stage is caught here and turned into the run's terminal `error` event.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::channel::{
    progress_channel, Delivery, ProgressReceiver, ProgressSender, StepSink, TerminalSlot,
};
use super::events::ProgressEvent;
use super::fetch::fetch_all;
use super::normalize::normalize;
use super::PipelineFault;
use crate::matching::fit_scoring::MatchScorer;
use crate::matching::scoring::score_listings;
use crate::models::{CandidateProfile, ScoutReport};
use crate::report::builder::build_report;
use crate::sources::SourceSet;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub event_buffer: usize,
    pub send_grace: Duration,
    pub scoring_timeout: Duration,
}

/// Read-only handles every run borrows from application state.
#[derive(Clone)]
pub struct PipelineContext {
    pub sources: SourceSet,
    pub scorer: Arc<dyn MatchScorer>,
    pub settings: PipelineSettings,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub query: String,
    pub location: String,
    pub profile: CandidateProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Owns the terminal transition of a run. `complete` and `fail` consume the reporter, so a
/// run can emit at most one terminal event.
#[derive(Debug)]
pub struct RunReporter {
    run_id: Uuid,
    sender: ProgressSender,
    slot: Option<TerminalSlot>,
    state: RunState,
}

impl RunReporter {
    pub fn new(run_id: Uuid, sender: ProgressSender) -> Self {
        Self {
            run_id,
            sender,
            slot: None,
            state: RunState::Idle,
        }
    }

    /// Idle → Running. Claims the terminal slot, then returns the step-only handle for stage
    /// code.
    pub async fn start(&mut self) -> StepSink {
        debug_assert_eq!(self.state, RunState::Idle);
        self.slot = Some(self.sender.reserve_terminal().await);
        self.state = RunState::Running;
        StepSink::new(self.sender.clone())
    }

    pub async fn complete(self, report: ScoutReport) -> RunState {
        self.finish(ProgressEvent::Result(report), RunState::Completed)
            .await
    }

    pub async fn fail(self, message: String) -> RunState {
        self.finish(ProgressEvent::Error(message), RunState::Failed)
            .await
    }

    async fn finish(self, event: ProgressEvent, next: RunState) -> RunState {
        let slot = match self.slot {
            Some(slot) => slot,
            None => self.sender.reserve_terminal().await,
        };
        if slot.deliver(event) == Delivery::Detached {
            warn!(run_id = %self.run_id, "Consumer disconnected before the run finished");
        }
        debug!(run_id = %self.run_id, from = ?self.state, to = ?next, "Run state transition");
        next
    }
}

/// A started run: its id, its event stream, and the handle resolving to the final state.
pub struct PipelineRun {
    pub run_id: Uuid,
    pub events: ProgressReceiver,
    pub handle: JoinHandle<RunState>,
}

pub fn spawn_run(ctx: PipelineContext, request: RunRequest) -> PipelineRun {
    let run_id = Uuid::new_v4();
    let (sender, events) =
        progress_channel(ctx.settings.event_buffer, ctx.settings.send_grace);
    let reporter = RunReporter::new(run_id, sender);
    let handle = tokio::spawn(drive(ctx, request, reporter));
    PipelineRun {
        run_id,
        events,
        handle,
    }
}

async fn drive(ctx: PipelineContext, request: RunRequest, mut reporter: RunReporter) -> RunState {
    let run_id = reporter.run_id;
    info!(
        run_id = %run_id,
        query = %request.query,
        location = %request.location,
        sources = ctx.sources.len(),
        scorer = ctx.scorer.backend(),
        "Scout run started"
    );

    let steps = reporter.start().await;
    let stages = tokio::spawn(execute(ctx, request, steps));
    let outcome = match stages.await {
        Ok(outcome) => outcome,
        Err(join_err) => Err(PipelineFault::Aborted(join_err.to_string())),
    };

    match outcome {
        Ok(report) => {
            info!(run_id = %run_id, jobs = report.jobs.len(), "Scout run completed");
            reporter.complete(report).await
        }
        Err(fault) => {
            error!(run_id = %run_id, error = %fault, "Scout run failed");
            reporter.fail(fault.to_string()).await
        }
    }
}

async fn execute(
    ctx: PipelineContext,
    request: RunRequest,
    steps: StepSink,
) -> Result<ScoutReport, PipelineFault> {
    let fetched = fetch_all(&ctx.sources, &request.query, &request.location, &steps).await;

    steps
        .step(format!(
            "Normalizing and de-duplicating {} listings",
            fetched.listings.len()
        ))
        .await;
    let listings = normalize(fetched.listings)?;
    steps
        .step(format!("{} unique listings after de-duplication", listings.len()))
        .await;

    if listings.is_empty() {
        steps.step("No listings to score; building report").await;
        return Ok(build_report(Vec::new(), None, &fetched.coverage));
    }

    steps
        .step(format!(
            "Scoring {} listings against the candidate profile",
            listings.len()
        ))
        .await;
    let scored = match score_listings(
        ctx.scorer.as_ref(),
        &request.profile,
        &listings,
        ctx.settings.scoring_timeout,
    )
    .await
    {
        Ok(scored) => scored,
        Err(err) => {
            error!(error = %err, "Match scoring failed, returning an empty report");
            steps.step("Match scoring failed; returning an empty report").await;
            return Ok(ScoutReport::generation_failed());
        }
    };
    if scored.recovered {
        steps
            .step("Recovered scores from unstructured scorer output")
            .await;
    }

    steps
        .step(format!("Building report from {} matches", scored.jobs.len()))
        .await;
    Ok(build_report(scored.jobs, scored.commentary, &fetched.coverage))
}

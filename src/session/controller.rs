use crate::draw::capture::Anchor;
use crate::draw::input::{resolve_event_coordinates, RawPointerEvent, StrokePoint, SurfaceOrigin};
use crate::draw::model::{Color, Tool, ToolState};
use crate::draw::surface::StrokeSurface;
use crate::error::{EvaluationError, SubmitRejected};
use crate::eval::client::EvaluationService;
use crate::eval::wire::{EvaluationRequest, EvaluationResult};
use crate::eval::worker::{spawn_evaluation, EvaluationOutcome, PendingEvaluation, Poll};
use crate::session::overlay::{OverlayMessage, PlacedResult, ResultId};
use crate::session::scheduler::{Scheduler, TaskId};
use crate::session::state::{LayoutMode, SessionConfig, SessionState};
use crate::session::variables::VariableStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    Place(ResultId),
    DismissError,
}

struct InFlight {
    pending: PendingEvaluation,
    epoch: u64,
    anchor: Anchor,
}

/// Owns the whole drawing session and is the single writer of its state.
///
/// Everything runs on the caller's thread: input methods react immediately,
/// and `tick` advances timers and picks up the evaluation response. Time is
/// always passed in.
pub struct SessionController {
    config: SessionConfig,
    surface: StrokeSurface,
    surface_origin: SurfaceOrigin,
    state: SessionState,
    scheduler: Scheduler<SessionTask>,
    service: Arc<dyn EvaluationService>,
    in_flight: Option<InFlight>,
    error_dismiss_task: Option<TaskId>,
    // Bumped by every reset; responses tagged with an older epoch are dropped.
    epoch: u64,
}

impl SessionController {
    pub fn new(config: SessionConfig, service: Arc<dyn EvaluationService>) -> Self {
        let state = SessionState::new(config.initial_tools);
        Self {
            config,
            surface: StrokeSurface::default(),
            surface_origin: SurfaceOrigin::default(),
            state,
            scheduler: Scheduler::default(),
            service,
            in_flight: None,
            error_dismiss_task: None,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn tools(&self) -> &ToolState {
        &self.state.tools
    }

    pub fn variables(&self) -> &VariableStore {
        &self.state.variables
    }

    /// Results that finished their stagger delay, in placement order.
    pub fn placed_results(&self) -> Vec<&PlacedResult> {
        self.state.overlays.visible().collect()
    }

    pub fn pending_results(&self) -> usize {
        self.state.overlays.pending_count()
    }

    pub fn error_visible(&self) -> bool {
        self.state.error_visible
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.state.layout
    }

    pub fn reset_in_progress(&self) -> bool {
        self.state.reset_in_progress
    }

    /// `false` while an evaluation is in flight.
    pub fn submit_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    pub fn next_wakeup(&mut self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.state.tools.select_tool(tool);
    }

    pub fn select_color(&mut self, color: Color) {
        self.state.tools.select_color(color);
    }

    pub fn set_active_width(&mut self, width: u32) {
        self.state.tools.set_active_width(width);
    }

    /// Recomputes the layout mode and fits the surface below `origin`.
    /// The surface is only reallocated (and its ink dropped) when its size
    /// actually changes.
    pub fn resize_viewport(&mut self, width: f32, height: f32, origin: SurfaceOrigin) {
        self.state.layout = LayoutMode::from_viewport_width(width, self.config.mobile_breakpoint);
        self.surface_origin = origin;

        let surface_w = width.max(0.0) as u32;
        let surface_h = (height - origin.top).max(0.0) as u32;
        if self.surface.size() != Some((surface_w, surface_h)) {
            tracing::debug!(surface_w, surface_h, "resizing drawing surface");
            self.surface.resize(surface_w, surface_h);
        }
    }

    pub fn pointer_down(&mut self, event: &RawPointerEvent) {
        let Some(point) = self.resolve(event) else {
            return;
        };
        let tools = self.state.tools;
        self.surface.begin_stroke(
            point,
            tools.active_tool(),
            tools.color(),
            tools.active_width(),
        );
    }

    pub fn pointer_move(&mut self, event: &RawPointerEvent) {
        if !self.surface.is_stroking() {
            return;
        }
        if let Some(point) = self.resolve(event) {
            self.surface.extend_stroke(point);
        }
    }

    /// Pointer up, pointer leaving the surface, touch end and touch cancel.
    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
    }

    fn resolve(&self, event: &RawPointerEvent) -> Option<StrokePoint> {
        match resolve_event_coordinates(event, self.surface_origin) {
            Ok(input) => Some(input.point()),
            Err(err) => {
                tracing::debug!("dropping pointer event: {err}");
                None
            }
        }
    }

    /// Starts an evaluation of the current drawing.
    ///
    /// A blank surface is not sent. A snapshot that cannot be encoded counts
    /// as a failed evaluation and shows the error banner.
    pub fn submit(&mut self, now: Instant) -> Result<(), SubmitRejected> {
        if self.in_flight.is_some() {
            return Err(SubmitRejected::InFlight);
        }
        if !self.surface.is_attached() {
            return Err(SubmitRejected::Detached);
        }
        let Some(bounds) = self.surface.scan_opaque_bounds() else {
            tracing::info!("skipping evaluation of an empty canvas");
            return Err(SubmitRejected::EmptyCanvas);
        };
        let anchor = bounds.centroid();

        let image = match self.surface.capture_as_image() {
            Ok(image) => image,
            Err(err) => {
                self.fail(EvaluationError::from(err), now);
                return Ok(());
            }
        };
        let request = EvaluationRequest {
            image,
            dict_of_vars: self.state.variables.snapshot(),
        };
        tracing::info!(
            vars = request.dict_of_vars.len(),
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "submitting canvas for evaluation"
        );
        self.in_flight = Some(InFlight {
            pending: spawn_evaluation(Arc::clone(&self.service), request),
            epoch: self.epoch,
            anchor,
        });
        Ok(())
    }

    /// Applies a deferred reset, collects a finished evaluation and fires due
    /// timers, in that order.
    pub fn tick(&mut self, now: Instant) {
        if self.state.reset_in_progress {
            self.reset();
        }

        let outcome = self
            .in_flight
            .as_ref()
            .and_then(|in_flight| match in_flight.pending.poll() {
                Poll::Ready(outcome) => Some(outcome),
                Poll::Pending => None,
            });
        if let Some(outcome) = outcome {
            self.settle(outcome, now);
        }

        for (_, task) in self.scheduler.drain_due(now) {
            match task {
                SessionTask::Place(id) => {
                    self.state.overlays.reveal(id);
                }
                SessionTask::DismissError => {
                    self.error_dismiss_task = None;
                    self.state.error_visible = false;
                }
            }
        }
    }

    /// Blocks up to `timeout` for the in-flight evaluation and applies it as
    /// if it had arrived at `now`. Returns whether an outcome was applied.
    pub fn settle_evaluation(&mut self, now: Instant, timeout: Duration) -> bool {
        let outcome = match self.in_flight.as_ref().map(|f| f.pending.wait(timeout)) {
            Some(Poll::Ready(outcome)) => outcome,
            _ => return false,
        };
        self.settle(outcome, now);
        true
    }

    fn settle(&mut self, outcome: EvaluationOutcome, now: Instant) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        if in_flight.epoch != self.epoch {
            tracing::info!("discarding evaluation response issued before reset");
            return;
        }
        match outcome {
            Ok(results) => self.apply_batch(results, in_flight.anchor, now),
            Err(err) => self.fail(err, now),
        }
    }

    /// Assignments go to the variable store; everything else is staged at
    /// the shared anchor and revealed one placement delay after the previous
    /// result of the batch.
    fn apply_batch(&mut self, results: Vec<EvaluationResult>, anchor: Anchor, now: Instant) {
        tracing::info!(items = results.len(), "applying evaluation batch");
        let mut slot: u32 = 0;
        for result in &results {
            if result.is_assignment {
                self.state
                    .variables
                    .record_assignment(result.expression.clone(), result.answer.clone());
                continue;
            }
            slot += 1;
            let id = self.state.overlays.stage(result, anchor);
            let deadline = now + self.config.placement_delay * slot;
            self.scheduler.schedule(deadline, SessionTask::Place(id));
        }
    }

    fn fail(&mut self, err: EvaluationError, now: Instant) {
        tracing::warn!("evaluation failed: {err}");
        if let Some(task) = self.error_dismiss_task.take() {
            self.scheduler.cancel(task);
        }
        self.state.error_visible = true;
        self.error_dismiss_task = Some(
            self.scheduler
                .schedule(now + self.config.error_dismiss, SessionTask::DismissError),
        );
    }

    pub fn dismiss_error(&mut self) {
        if let Some(task) = self.error_dismiss_task.take() {
            self.scheduler.cancel(task);
        }
        self.state.error_visible = false;
    }

    pub fn reposition(&mut self, id: ResultId, position: Anchor) {
        self.state
            .overlays
            .apply(OverlayMessage::Reposition { id, position });
    }

    /// Marks a reset to be carried out by the next `tick`.
    pub fn request_reset(&mut self) {
        self.state.reset_in_progress = true;
    }

    /// Clears ink, results and variables, and cancels every pending
    /// placement and the error auto-dismiss.
    pub fn reset(&mut self) {
        tracing::info!(
            placements_cancelled = self.state.overlays.pending_count(),
            "resetting session"
        );
        self.surface.clear();
        self.state.overlays.clear();
        self.state.variables.clear();
        self.scheduler.cancel_all();
        self.error_dismiss_task = None;
        self.state.error_visible = false;
        self.epoch += 1;
        self.state.reset_in_progress = false;
    }
}

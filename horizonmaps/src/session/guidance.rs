//! The guidance event loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::SessionConfig;
use super::report::{SessionError, SessionOutcome, SessionReport};
use crate::announce::AnnouncementSink;
use crate::geo::GeoPoint;
use crate::map_view::MapView;
use crate::navigation::{NavigationEvent, ProgressTracker, TrackerConfig};
use crate::position::{
    GeoSampler, Position, PositionHistory, SamplerError, SamplerEvent,
    DEFAULT_SAMPLER_CHANNEL_CAPACITY,
};
use crate::route::RouteModel;
use crate::routing::{RouteRequest, RoutingClient, RoutingError};

/// Capacity of the reroute result channel. At most one request is in flight.
const REROUTE_CHANNEL_CAPACITY: usize = 4;

/// Idle timer duration used when the fix timeout is disabled. The branch is
/// never polled in that case.
const IDLE_TIMER_PLACEHOLDER: Duration = Duration::from_secs(3600);

/// Answer from a spawned routing request.
#[derive(Debug)]
struct RerouteResult {
    generation: u64,
    result: Result<RouteModel, RoutingError>,
}

#[derive(Debug, Default)]
struct SessionStats {
    fixes_processed: u64,
    steps_advanced: u64,
    off_route_signals: u64,
    reroutes_applied: u64,
    reroute_failures: u64,
}

/// Couples a position stream to a [`ProgressTracker`].
///
/// Construct, then [`start`](Self::start) with a known route or
/// [`plan`](Self::plan) one through the routing client, then
/// [`run`](Self::run) until the session ends.
pub struct GuidanceSession {
    tracker: ProgressTracker,
    history: PositionHistory,
    routing: Arc<dyn RoutingClient>,
    announcer: Arc<dyn AnnouncementSink>,
    map: Arc<dyn MapView>,
    config: SessionConfig,
    stats: SessionStats,
    generation: u64,
    consecutive_failures: u32,
    reroute_tx: Option<mpsc::Sender<RerouteResult>>,
    reroute_task: Option<JoinHandle<()>>,
}

impl GuidanceSession {
    /// Create an idle session.
    pub fn new(
        tracker_config: TrackerConfig,
        routing: Arc<dyn RoutingClient>,
        announcer: Arc<dyn AnnouncementSink>,
        map: Arc<dyn MapView>,
        config: SessionConfig,
    ) -> Self {
        Self {
            tracker: ProgressTracker::new(tracker_config),
            history: PositionHistory::new(),
            routing,
            announcer,
            map,
            config,
            stats: SessionStats::default(),
            generation: 0,
            consecutive_failures: 0,
            reroute_tx: None,
            reroute_task: None,
        }
    }

    /// Begin guidance along `route`: draws it and announces the first step.
    pub fn start(&mut self, route: RouteModel, origin: Position) -> Result<(), SessionError> {
        self.tracker.start(route, origin)?;
        self.history.clear();
        self.stats = SessionStats::default();
        self.consecutive_failures = 0;

        self.map.update_marker(&origin, None);
        self.present_route();
        Ok(())
    }

    /// Ask the routing client for a route from `origin`, then start on it.
    pub async fn plan(&mut self, origin: Position, destination: GeoPoint) -> Result<(), SessionError> {
        let request = RouteRequest::new(origin.point(), destination, self.config.profile);
        tracing::info!(
            client = self.routing.name(),
            origin = %request.origin,
            destination = %request.destination,
            "Planning route"
        );
        let route = self.routing.route(&request).await?;
        self.start(route, origin)
    }

    /// Start `sampler`, run until the session ends, then stop the sampler.
    pub async fn drive(
        self,
        sampler: &mut dyn GeoSampler,
        cancellation: CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        if !self.tracker.status().is_tracking() {
            return Err(SessionError::NotStarted);
        }

        let (tx, rx) = mpsc::channel(DEFAULT_SAMPLER_CHANNEL_CAPACITY);
        sampler.start(tx)?;
        tracing::debug!(sampler = sampler.name(), "Position source started");

        let report = self.run(rx, cancellation).await;
        sampler.stop();
        report
    }

    /// Consume fixes until arrival, cancellation, source failure, or
    /// reroute exhaustion.
    pub async fn run(
        mut self,
        mut fixes: mpsc::Receiver<SamplerEvent>,
        cancellation: CancellationToken,
    ) -> Result<SessionReport, SessionError> {
        if !self.tracker.status().is_tracking() {
            return Err(SessionError::NotStarted);
        }

        let started = Instant::now();
        let (reroute_tx, mut reroute_rx) = mpsc::channel(REROUTE_CHANNEL_CAPACITY);
        self.reroute_tx = Some(reroute_tx);

        let fix_timeout = self.config.fix_timeout;
        let idle = tokio::time::sleep(fix_timeout.unwrap_or(IDLE_TIMER_PLACEHOLDER));
        tokio::pin!(idle);

        tracing::info!(
            routing = self.routing.name(),
            language = %self.config.language,
            profile = %self.config.profile,
            "Guidance session running"
        );

        let outcome = loop {
            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break SessionOutcome::Cancelled,

                Some(reroute) = reroute_rx.recv() => {
                    if let Some(outcome) = self.handle_reroute(reroute) {
                        break outcome;
                    }
                }

                event = fixes.recv() => match event {
                    Some(SamplerEvent::Fix(position)) => {
                        if let Some(timeout) = fix_timeout {
                            idle.as_mut().reset(Instant::now() + timeout);
                        }
                        if let Some(outcome) = self.handle_fix(position) {
                            break outcome;
                        }
                    }
                    Some(SamplerEvent::Failed(error)) => {
                        tracing::warn!(error = %error, "Position source failed");
                        break SessionOutcome::SourceFailed(error);
                    }
                    None => break SessionOutcome::SourceClosed,
                },

                _ = &mut idle, if fix_timeout.is_some() => {
                    tracing::warn!(
                        timeout_secs = fix_timeout.map(|t| t.as_secs()).unwrap_or_default(),
                        "No position fix received in time"
                    );
                    break SessionOutcome::SourceFailed(SamplerError::Timeout);
                }
            }
        };

        Ok(self.finish(outcome, started.elapsed()))
    }

    /// The tracker driven by this session.
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event handling
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_fix(&mut self, position: Position) -> Option<SessionOutcome> {
        if !self.history.record(position) {
            tracing::debug!(
                timestamp_ms = position.timestamp_ms,
                "Dropping out-of-order fix"
            );
            return None;
        }
        self.stats.fixes_processed += 1;
        self.map.update_marker(&position, self.history.heading_deg());

        match self.tracker.on_position_update(&position) {
            NavigationEvent::NoChange => None,
            NavigationEvent::StepAdvanced { instruction, .. } => {
                self.stats.steps_advanced += 1;
                self.announce(&instruction);
                None
            }
            NavigationEvent::Arrived => {
                self.announce(&self.config.arrival_phrase);
                Some(SessionOutcome::Arrived)
            }
            NavigationEvent::OffRoute { distance_m } => {
                self.stats.off_route_signals += 1;
                tracing::info!(
                    distance_m = format!("{:.1}", distance_m),
                    speed_mps = ?self.history.speed_mps(),
                    "Traveller left the route"
                );
                self.announce(&self.config.rerouting_phrase);
                if self.tracker.begin_reroute() {
                    self.spawn_reroute(position);
                }
                None
            }
        }
    }

    fn spawn_reroute(&mut self, from: Position) {
        let destination = self.tracker.route().and_then(|r| r.destination());
        let (Some(destination), Some(tx)) = (destination, self.reroute_tx.clone()) else {
            self.tracker.cancel_reroute();
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        let request = RouteRequest::new(from.point(), destination, self.config.profile);
        let routing = Arc::clone(&self.routing);

        tracing::info!(
            generation,
            client = routing.name(),
            origin = %request.origin,
            destination = %request.destination,
            "Requesting new route"
        );

        if let Some(previous) = self.reroute_task.take() {
            previous.abort();
        }
        self.reroute_task = Some(tokio::spawn(async move {
            let result = routing.route(&request).await;
            // Receiver gone means the session already ended.
            let _ = tx.send(RerouteResult { generation, result }).await;
        }));
    }

    fn handle_reroute(&mut self, reroute: RerouteResult) -> Option<SessionOutcome> {
        if reroute.generation != self.generation {
            tracing::debug!(
                generation = reroute.generation,
                current = self.generation,
                "Dropping stale reroute result"
            );
            return None;
        }
        self.reroute_task = None;

        match reroute.result {
            Ok(route) => match self.tracker.replace_route(route) {
                Ok(true) => {
                    self.consecutive_failures = 0;
                    self.stats.reroutes_applied += 1;
                    self.history.clear();
                    self.present_route();
                    None
                }
                Ok(false) => None,
                Err(e) => self.record_reroute_failure(RoutingError::InvalidRoute(e)),
            },
            Err(e) => self.record_reroute_failure(e),
        }
    }

    fn record_reroute_failure(&mut self, error: RoutingError) -> Option<SessionOutcome> {
        self.consecutive_failures += 1;
        self.stats.reroute_failures += 1;

        tracing::warn!(
            attempt = self.consecutive_failures,
            max_attempts = self.config.max_reroute_attempts,
            error = %error,
            "Reroute failed"
        );

        if self.consecutive_failures >= self.config.max_reroute_attempts {
            self.tracker.fail();
            return Some(SessionOutcome::RerouteFailed {
                attempts: self.consecutive_failures,
                last_error: error,
            });
        }
        self.tracker.cancel_reroute();
        None
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    /// Draw the active route and speak its current step.
    fn present_route(&self) {
        let Some(route) = self.tracker.route() else {
            return;
        };
        self.map.replace_polyline(route.polyline());
        if let Some(step) = self.tracker.current_step() {
            self.announce(&step.instruction);
        }
    }

    fn announce(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.announcer.announce(text, &self.config.language);
    }

    fn finish(mut self, outcome: SessionOutcome, elapsed: Duration) -> SessionReport {
        if let Some(task) = self.reroute_task.take() {
            task.abort();
        }
        match outcome {
            SessionOutcome::Arrived | SessionOutcome::RerouteFailed { .. } => {}
            _ => self.tracker.stop(),
        }

        let report = SessionReport {
            outcome,
            final_status: self.tracker.status(),
            final_step_index: self.tracker.current_step_index(),
            fixes_processed: self.stats.fixes_processed,
            steps_advanced: self.stats.steps_advanced,
            off_route_signals: self.stats.off_route_signals,
            reroutes_applied: self.stats.reroutes_applied,
            reroute_failures: self.stats.reroute_failures,
            last_speed_mps: self.history.speed_mps(),
            elapsed,
        };

        tracing::info!(
            outcome = %report.outcome,
            fixes = report.fixes_processed,
            steps_advanced = report.steps_advanced,
            reroutes = report.reroutes_applied,
            elapsed_secs = format!("{:.1}", elapsed.as_secs_f64()),
            "Guidance session ended"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::RecordingAnnouncer;
    use crate::map_view::RecordingMapView;
    use crate::navigation::NavigationStatus;
    use crate::route::{RouteError, Step};
    use crate::routing::ScriptedRoutingClient;

    const A: GeoPoint = GeoPoint::new(0.0, 0.0);
    const B: GeoPoint = GeoPoint::new(0.0, 0.002);
    const C: GeoPoint = GeoPoint::new(0.0, 0.004);
    /// About 1.1 km north of B.
    const FAR: GeoPoint = GeoPoint::new(0.01, 0.002);
    const FAR_END: GeoPoint = GeoPoint::new(0.01, 0.004);

    fn route() -> RouteModel {
        RouteModel::new(
            vec![A, B, C],
            vec![
                Step::new(A, "Head east", 0.0),
                Step::new(B, "Continue straight", 222.0),
                Step::new(C, "Destination ahead", 222.0),
            ],
        )
    }

    fn detour() -> RouteModel {
        RouteModel::new(
            vec![FAR, FAR_END],
            vec![
                Step::new(FAR, "Head east on the detour", 0.0),
                Step::new(FAR_END, "Destination ahead", 222.0),
            ],
        )
    }

    struct Harness {
        announcer: Arc<RecordingAnnouncer>,
        map: Arc<RecordingMapView>,
        routing: Arc<ScriptedRoutingClient>,
    }

    fn session(routing: ScriptedRoutingClient, config: SessionConfig) -> (GuidanceSession, Harness) {
        let announcer = Arc::new(RecordingAnnouncer::new());
        let map = Arc::new(RecordingMapView::new());
        let routing = Arc::new(routing);
        let session = GuidanceSession::new(
            TrackerConfig::default(),
            routing.clone(),
            announcer.clone(),
            map.clone(),
            config,
        );
        (
            session,
            Harness {
                announcer,
                map,
                routing,
            },
        )
    }

    fn fix(point: GeoPoint, ts: u64) -> SamplerEvent {
        SamplerEvent::Fix(Position::at(point, ts))
    }

    #[tokio::test]
    async fn test_run_requires_start() {
        let (session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        let (_tx, rx) = mpsc::channel(4);
        let result = session.run(rx, CancellationToken::new()).await;
        assert!(matches!(result, Err(SessionError::NotStarted)));
    }

    #[tokio::test]
    async fn test_start_rejects_empty_route() {
        let (mut session, h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        let result = session.start(RouteModel::new(vec![A], vec![]), Position::at(A, 0));
        assert!(matches!(
            result,
            Err(SessionError::InvalidRoute(RouteError::NoSteps))
        ));
        assert_eq!(session.tracker().status(), NavigationStatus::Idle);
        assert!(h.announcer.texts().is_empty());
    }

    #[tokio::test]
    async fn test_arrival() {
        let (mut session, h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let (tx, rx) = mpsc::channel(8);
        tx.send(fix(A, 1_000)).await.unwrap();
        tx.send(fix(B, 2_000)).await.unwrap();
        tx.send(fix(C, 3_000)).await.unwrap();
        drop(tx);

        let report = session.run(rx, CancellationToken::new()).await.unwrap();

        assert_eq!(report.outcome, SessionOutcome::Arrived);
        assert_eq!(report.final_status, NavigationStatus::Arrived);
        assert_eq!(report.final_step_index, 2);
        assert_eq!(report.steps_advanced, 2);
        assert_eq!(report.fixes_processed, 3);
        // 444 m between the first and last fix, two seconds apart
        let speed = report.last_speed_mps.unwrap();
        assert!((speed - 222.4).abs() < 1.0, "{speed}");
        assert_eq!(
            h.announcer.texts(),
            vec![
                "Head east",
                "Continue straight",
                "Destination ahead",
                "You have arrived at your destination",
            ]
        );
        assert_eq!(h.map.polylines().len(), 1);
        // Origin marker plus one per fix
        assert_eq!(h.map.markers().len(), 4);
        assert_eq!(h.routing.request_count(), 0);
    }

    #[tokio::test]
    async fn test_source_closed_stops_tracker() {
        let (mut session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let (tx, rx) = mpsc::channel(8);
        tx.send(fix(A, 1_000)).await.unwrap();
        drop(tx);

        let report = session.run(rx, CancellationToken::new()).await.unwrap();
        assert_eq!(report.outcome, SessionOutcome::SourceClosed);
        assert_eq!(report.final_status, NavigationStatus::Idle);
        assert_eq!(report.final_step_index, 1);
    }

    #[tokio::test]
    async fn test_source_failure() {
        let (mut session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let (tx, rx) = mpsc::channel(8);
        tx.send(SamplerEvent::Failed(SamplerError::PermissionDenied))
            .await
            .unwrap();

        let report = session.run(rx, CancellationToken::new()).await.unwrap();
        assert_eq!(
            report.outcome,
            SessionOutcome::SourceFailed(SamplerError::PermissionDenied)
        );
        assert_eq!(report.final_status, NavigationStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fix_timeout() {
        let config = SessionConfig::default().with_fix_timeout(Some(Duration::from_secs(5)));
        let (mut session, _h) = session(ScriptedRoutingClient::new(), config);
        session.start(route(), Position::at(A, 0)).unwrap();

        let (_tx, rx) = mpsc::channel(8);
        let report = session.run(rx, CancellationToken::new()).await.unwrap();

        assert_eq!(report.outcome, SessionOutcome::SourceFailed(SamplerError::Timeout));
        assert!(report.elapsed >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let (mut session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let (_tx, rx) = mpsc::channel(8);

        let report = session.run(rx, token).await.unwrap();
        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert_eq!(report.final_status, NavigationStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reroute_applied() {
        let routing = ScriptedRoutingClient::new().with_answer(Ok(detour()));
        let (mut session, h) = session(routing, SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx, CancellationToken::new()));

        tx.send(fix(FAR, 1_000)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(fix(FAR, 2_000)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(fix(FAR_END, 3_000)).await.unwrap();

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.outcome, SessionOutcome::Arrived);
        assert_eq!(report.off_route_signals, 1);
        assert_eq!(report.reroutes_applied, 1);
        assert_eq!(report.reroute_failures, 0);

        let requests = h.routing.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].origin, FAR);
        assert_eq!(requests[0].destination, C);

        assert_eq!(h.map.polylines().len(), 2);
        assert_eq!(h.map.current_polyline(), Some(vec![FAR, FAR_END]));
        assert_eq!(
            h.announcer.texts(),
            vec![
                "Head east",
                "Recalculating route",
                "Head east on the detour",
                "Destination ahead",
                "You have arrived at your destination",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reroute_exhaustion_fails_guidance() {
        let config = SessionConfig::default().with_max_reroute_attempts(2);
        let (mut session, h) = session(ScriptedRoutingClient::new(), config);
        session.start(route(), Position::at(A, 0)).unwrap();

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(session.run(rx, CancellationToken::new()));

        tx.send(fix(FAR, 1_000)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(fix(FAR, 2_000)).await.unwrap();

        let report = handle.await.unwrap().unwrap();
        match &report.outcome {
            SessionOutcome::RerouteFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(*attempts, 2);
                assert!(last_error.is_no_route());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(report.final_status, NavigationStatus::Failed);
        assert_eq!(report.off_route_signals, 2);
        assert_eq!(report.reroute_failures, 2);
        assert_eq!(h.routing.request_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_reroute_dropped() {
        let (mut session, h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        let outcome = session.handle_reroute(RerouteResult {
            generation: 7,
            result: Ok(detour()),
        });

        assert!(outcome.is_none());
        assert_eq!(session.tracker().route(), Some(&route()));
        assert_eq!(h.map.polylines().len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_order_fix_ignored() {
        let (mut session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        session.start(route(), Position::at(A, 0)).unwrap();

        assert!(session.handle_fix(Position::at(B, 5_000)).is_none());
        assert!(session.handle_fix(Position::at(A, 4_000)).is_none());
        assert_eq!(session.stats.fixes_processed, 1);
    }

    #[tokio::test]
    async fn test_plan_uses_routing_client() {
        let routing = ScriptedRoutingClient::new().with_answer(Ok(route()));
        let (mut session, h) = session(routing, SessionConfig::default());

        session.plan(Position::at(A, 0), C).await.unwrap();
        assert_eq!(session.tracker().status(), NavigationStatus::Navigating);
        assert_eq!(h.routing.requests()[0].destination, C);
        assert_eq!(h.announcer.texts(), vec!["Head east"]);
    }

    #[tokio::test]
    async fn test_plan_no_route() {
        let (mut session, _h) = session(ScriptedRoutingClient::new(), SessionConfig::default());
        let err = session.plan(Position::at(A, 0), C).await.unwrap_err();
        assert!(matches!(err, SessionError::Routing(ref e) if e.is_no_route()));
        assert_eq!(session.tracker().status(), NavigationStatus::Idle);
    }
}

//! End-to-end guidance sessions driven by the built-in samplers.

use std::sync::Arc;
use std::time::Duration;

use horizonmaps::announce::RecordingAnnouncer;
use horizonmaps::geo::GeoPoint;
use horizonmaps::map_view::RecordingMapView;
use horizonmaps::navigation::{NavigationStatus, OffRouteMetric, TrackerConfig};
use horizonmaps::position::{
    GeoSampler, Position, ReplaySampler, SimulatedSampler, SimulationConfig,
};
use horizonmaps::route::{RouteModel, Step};
use horizonmaps::routing::ScriptedRoutingClient;
use horizonmaps::session::{
    GuidanceSession, SessionConfig, SessionOutcome, DEFAULT_ARRIVAL_PHRASE,
    DEFAULT_REROUTING_PHRASE,
};
use tokio_util::sync::CancellationToken;

const A: GeoPoint = GeoPoint::new(0.0, 0.0);
const B: GeoPoint = GeoPoint::new(0.0, 0.002);
const C: GeoPoint = GeoPoint::new(0.0, 0.004);
const FAR: GeoPoint = GeoPoint::new(0.01, 0.002);
const FAR_END: GeoPoint = GeoPoint::new(0.01, 0.004);

fn main_route() -> RouteModel {
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

struct Sinks {
    announcer: Arc<RecordingAnnouncer>,
    map: Arc<RecordingMapView>,
    routing: Arc<ScriptedRoutingClient>,
}

fn build(
    tracker: TrackerConfig,
    routing: ScriptedRoutingClient,
    config: SessionConfig,
) -> (GuidanceSession, Sinks) {
    let sinks = Sinks {
        announcer: Arc::new(RecordingAnnouncer::new()),
        map: Arc::new(RecordingMapView::new()),
        routing: Arc::new(routing),
    };
    let session = GuidanceSession::new(
        tracker,
        sinks.routing.clone(),
        sinks.announcer.clone(),
        sinks.map.clone(),
        config,
    );
    (session, sinks)
}

fn simulation(lateral_offset_m: f64) -> SimulationConfig {
    SimulationConfig {
        speed_mps: 10.0,
        interval: Duration::from_secs(1),
        lateral_offset_m,
    }
}

#[tokio::test(start_paused = true)]
async fn simulated_drive_arrives() {
    let tracker = TrackerConfig::default().with_off_route_metric(OffRouteMetric::Segment);
    let (mut session, sinks) = build(tracker, ScriptedRoutingClient::new(), SessionConfig::default());
    session.start(main_route(), Position::at(A, 0)).unwrap();

    let mut sampler = SimulatedSampler::new(vec![A, B, C], simulation(0.0));
    let report = session
        .drive(&mut sampler, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::Arrived);
    assert_eq!(report.final_status, NavigationStatus::Arrived);
    assert_eq!(report.steps_advanced, 2);
    assert_eq!(report.off_route_signals, 0);
    assert!(report.fixes_processed > 20);
    assert_eq!(
        sinks.announcer.texts(),
        vec![
            "Head east",
            "Continue straight",
            "Destination ahead",
            DEFAULT_ARRIVAL_PHRASE,
        ]
    );
    assert_eq!(sinks.routing.request_count(), 0);
    assert!(!sampler.is_running());

    // Markers after the first few metres carry an eastward heading
    let headings: Vec<f64> = sinks.map.markers().iter().filter_map(|(_, h)| *h).collect();
    assert!(!headings.is_empty());
    assert!(headings.iter().all(|h| (h - 90.0).abs() < 1.0));
}

#[tokio::test(start_paused = true)]
async fn replayed_detour_reroutes_and_arrives() {
    let routing = ScriptedRoutingClient::new().with_answer(Ok(detour()));
    let (mut session, sinks) = build(TrackerConfig::default(), routing, SessionConfig::default());
    session.start(main_route(), Position::at(A, 0)).unwrap();

    let mut sampler = ReplaySampler::new(vec![
        Position::at(A, 1_000),
        Position::at(FAR, 2_000),
        Position::at(FAR, 3_000),
        Position::at(FAR_END, 4_000),
    ]);
    let report = session
        .drive(&mut sampler, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::Arrived);
    assert_eq!(report.off_route_signals, 1);
    assert_eq!(report.reroutes_applied, 1);
    assert_eq!(report.final_step_index, 1);

    let requests = sinks.routing.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].origin, FAR);
    assert_eq!(requests[0].destination, C);

    assert_eq!(
        sinks.announcer.texts(),
        vec![
            "Head east",
            "Continue straight",
            DEFAULT_REROUTING_PHRASE,
            "Head east on the detour",
            "Destination ahead",
            DEFAULT_ARRIVAL_PHRASE,
        ]
    );
    assert_eq!(sinks.map.current_polyline(), Some(vec![FAR, FAR_END]));
}

#[tokio::test(start_paused = true)]
async fn persistent_deviation_exhausts_reroutes() {
    let config = SessionConfig::default().with_max_reroute_attempts(3);
    let (mut session, sinks) = build(TrackerConfig::default(), ScriptedRoutingClient::new(), config);
    session.start(main_route(), Position::at(A, 0)).unwrap();

    // Every simulated fix sits 200 m to the right of the road
    let mut sampler = SimulatedSampler::new(vec![A, B, C], simulation(200.0));
    let report = session
        .drive(&mut sampler, CancellationToken::new())
        .await
        .unwrap();

    match report.outcome {
        SessionOutcome::RerouteFailed { attempts, ref last_error } => {
            assert_eq!(attempts, 3);
            assert!(last_error.is_no_route());
        }
        ref other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(report.final_status, NavigationStatus::Failed);
    assert_eq!(report.reroute_failures, 3);
    assert_eq!(sinks.routing.request_count(), 3);
    assert_eq!(report.steps_advanced, 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_guidance() {
    let (mut session, _sinks) = build(
        TrackerConfig::default(),
        ScriptedRoutingClient::new(),
        SessionConfig::default(),
    );
    session.start(main_route(), Position::at(A, 0)).unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        canceller.cancel();
    });

    let mut sampler = SimulatedSampler::new(vec![A, B, C], simulation(0.0));
    let report = session.drive(&mut sampler, token).await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Cancelled);
    assert_eq!(report.final_status, NavigationStatus::Idle);
    assert!(report.fixes_processed >= 5);
}

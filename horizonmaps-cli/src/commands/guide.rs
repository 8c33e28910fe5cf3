//! `simulate` and `replay`: run a guidance session against a position source.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use horizonmaps::config::ConfigFile;
use horizonmaps::geo::GeoPoint;
use horizonmaps::map_view::TracingMapView;
use horizonmaps::position::{GeoSampler, Position, ReplaySampler, SimulatedSampler};
use horizonmaps::route::RouteModel;
use horizonmaps::routing::RoutingProfile;
use horizonmaps::session::{GuidanceSession, SessionReport};
use tokio_util::sync::CancellationToken;

use super::common::{
    ctrl_c_token, guidance_routing_client, load_route, load_track, parse_point, runtime,
    ProfileArg,
};
use crate::error::CliError;
use crate::output::{print_report, ConsoleAnnouncer};

/// Arguments for `horizonmaps simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Route file saved by `horizonmaps route --output`
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub route: Option<PathBuf>,

    /// Plan from LAT,LON through the directions service
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true, requires = "to")]
    pub from: Option<GeoPoint>,

    /// Destination LAT,LON when planning
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true, requires = "from")]
    pub to: Option<GeoPoint>,

    /// Travel mode (default: routing.profile from config)
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Simulated speed in m/s (default: simulation.speed_mps)
    #[arg(long)]
    pub speed: Option<f64>,

    /// Milliseconds between fixes (default: simulation.interval_ms)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Shift every fix sideways by this many meters (right of travel)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_m: f64,

    /// Announcement language (default: announcements.language)
    #[arg(long)]
    pub language: Option<String>,
}

/// Arguments for `horizonmaps replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Route file saved by `horizonmaps route --output`
    #[arg(long)]
    pub route: PathBuf,

    /// Recorded track: JSON array of {latitude, longitude, timestamp_ms}
    #[arg(long)]
    pub track: PathBuf,

    /// Time compression factor
    #[arg(long, default_value_t = 1.0)]
    pub speedup: f64,

    /// Announcement language (default: announcements.language)
    #[arg(long)]
    pub language: Option<String>,
}

/// Run `horizonmaps simulate`.
pub fn run_simulate(args: SimulateArgs, config: &ConfigFile) -> Result<(), CliError> {
    if let Some(speed) = args.speed {
        require_positive("--speed", speed)?;
    }
    if args.interval_ms == Some(0) {
        return Err(CliError::InvalidArgument(
            "--interval-ms must be at least 1".to_string(),
        ));
    }
    let mut config = config.clone();
    if let Some(profile) = args.profile {
        config.routing.profile = RoutingProfile::from(profile);
    }
    if let Some(language) = args.language {
        config.announcements.language = language;
    }

    let mut simulation = config.simulation();
    if let Some(speed) = args.speed {
        simulation.speed_mps = speed;
    }
    if let Some(ms) = args.interval_ms {
        simulation.interval = std::time::Duration::from_millis(ms);
    }
    simulation.lateral_offset_m = args.offset_m;

    let rt = runtime()?;
    let cancellation = ctrl_c_token()?;

    rt.block_on(async {
        let mut session = new_session(&config)?;
        match (args.route, args.from, args.to) {
            (Some(path), _, _) => {
                let route = load_route(&path)?;
                let origin = start_position(&route)?;
                session.start(route, origin)?;
            }
            (None, Some(from), Some(to)) => {
                session.plan(Position::at(from, 0), to).await?;
            }
            _ => {
                return Err(CliError::InvalidArgument(
                    "either --route or both --from and --to are required".to_string(),
                ))
            }
        }

        let polyline = session
            .tracker()
            .route()
            .map(|r| r.polyline().to_vec())
            .unwrap_or_default();
        let mut sampler = SimulatedSampler::new(polyline, simulation);
        tracing::info!(
            estimated_secs = sampler.estimated_duration().as_secs(),
            "Starting simulated drive"
        );
        finish(drive(session, &mut sampler, cancellation).await?)
    })
}

/// Run `horizonmaps replay`.
pub fn run_replay(args: ReplayArgs, config: &ConfigFile) -> Result<(), CliError> {
    require_positive("--speedup", args.speedup)?;
    let mut config = config.clone();
    if let Some(language) = args.language {
        config.announcements.language = language;
    }

    let route = load_route(&args.route)?;
    let track = load_track(&args.track)?;
    let Some(first) = track.first().copied() else {
        return Err(CliError::File {
            path: args.track,
            message: "track contains no fixes".to_string(),
        });
    };

    let rt = runtime()?;
    let cancellation = ctrl_c_token()?;

    rt.block_on(async {
        let mut session = new_session(&config)?;
        session.start(route, first)?;
        let mut sampler = ReplaySampler::with_speedup(track, args.speedup);
        finish(drive(session, &mut sampler, cancellation).await?)
    })
}

fn require_positive(flag: &str, value: f64) -> Result<(), CliError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "{} must be a positive number, got {}",
            flag, value
        )))
    }
}

fn new_session(config: &ConfigFile) -> Result<GuidanceSession, CliError> {
    Ok(GuidanceSession::new(
        config.tracker(),
        guidance_routing_client(config)?,
        Arc::new(ConsoleAnnouncer),
        Arc::new(TracingMapView),
        config.session(),
    ))
}

/// Origin for a saved route: its first vertex, stamped now.
fn start_position(route: &RouteModel) -> Result<Position, CliError> {
    let first = route
        .polyline()
        .first()
        .copied()
        .ok_or_else(|| CliError::InvalidArgument("route has no polyline".to_string()))?;
    Ok(Position::at(first, 0))
}

async fn drive(
    session: GuidanceSession,
    sampler: &mut dyn GeoSampler,
    cancellation: CancellationToken,
) -> Result<SessionReport, CliError> {
    Ok(session.drive(sampler, cancellation).await?)
}

fn finish(report: SessionReport) -> Result<(), CliError> {
    print_report(&report);
    if report.outcome.is_arrived() {
        Ok(())
    } else {
        Err(CliError::GuidanceIncomplete(report.outcome.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate_args(speed: Option<f64>, interval_ms: Option<u64>) -> SimulateArgs {
        SimulateArgs {
            route: Some(PathBuf::from("missing-route.json")),
            from: None,
            to: None,
            profile: None,
            speed,
            interval_ms,
            offset_m: 0.0,
            language: None,
        }
    }

    #[test]
    fn test_simulate_rejects_unusable_speed() {
        for speed in [f64::NAN, 0.0, -13.9, f64::INFINITY] {
            let result = run_simulate(simulate_args(Some(speed), None), &ConfigFile::default());
            assert!(
                matches!(result, Err(CliError::InvalidArgument(_))),
                "speed {speed} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_simulate_rejects_zero_interval() {
        let result = run_simulate(simulate_args(None, Some(0)), &ConfigFile::default());
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_replay_rejects_nan_speedup() {
        let args = ReplayArgs {
            route: PathBuf::from("missing-route.json"),
            track: PathBuf::from("missing-track.json"),
            speedup: f64::NAN,
            language: None,
        };
        let result = run_replay(args, &ConfigFile::default());
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("--speed", 13.9).is_ok());
        assert!(require_positive("--speed", 1e-300).is_ok());
        assert!(require_positive("--speed", f64::NAN).is_err());
    }
}

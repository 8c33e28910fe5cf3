//! Helpers shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use horizonmaps::config::ConfigFile;
use horizonmaps::geo::GeoPoint;
use horizonmaps::position::Position;
use horizonmaps::route::RouteModel;
use horizonmaps::routing::{HttpRoutingClient, RoutingClient, RoutingProfile, ScriptedRoutingClient};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Travel mode for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ProfileArg {
    /// Car routing
    Driving,
    /// Pedestrian routing
    Walking,
    /// Bicycle routing
    Cycling,
}

impl From<ProfileArg> for RoutingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Driving => RoutingProfile::Driving,
            ProfileArg::Walking => RoutingProfile::Walking,
            ProfileArg::Cycling => RoutingProfile::Cycling,
        }
    }
}

/// Parse `lat,lon` into a point.
pub fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    let point = GeoPoint::new(lat, lon);
    if !point.is_valid() {
        return Err(format!("coordinate {} is out of range", point));
    }
    Ok(point)
}

/// Build the directions client from config.
pub fn http_routing_client(config: &ConfigFile) -> Result<Arc<dyn RoutingClient>, CliError> {
    let client = HttpRoutingClient::from_config(config.directions()).map_err(|e| {
        CliError::Config(format!(
            "{}. Set it with 'horizonmaps config set routing.access_token <token>'",
            e
        ))
    })?;
    Ok(Arc::new(client))
}

/// Directions client for guidance. Without an access token, reroute
/// requests always answer "no route".
pub fn guidance_routing_client(config: &ConfigFile) -> Result<Arc<dyn RoutingClient>, CliError> {
    if config.routing.access_token.is_some() {
        return http_routing_client(config);
    }
    tracing::warn!("No routing.access_token configured, rerouting is disabled");
    Ok(Arc::new(ScriptedRoutingClient::new()))
}

/// Load a route saved by `horizonmaps route --output`.
pub fn load_route(path: &Path) -> Result<RouteModel, CliError> {
    let text = read_file(path)?;
    let route: RouteModel = serde_json::from_str(&text).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: format!("not a route file: {}", e),
    })?;
    route.validate().map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(route)
}

/// Load a recorded track (JSON array of fixes).
pub fn load_track(path: &Path) -> Result<Vec<Position>, CliError> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: format!("not a track file: {}", e),
    })
}

/// Write pretty JSON to `path`.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    std::fs::write(path, text).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Create the async runtime used by network and guidance commands.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("failed to create Tokio runtime: {}", e)))
}

/// Token cancelled on Ctrl-C.
pub fn ctrl_c_token() -> Result<CancellationToken, CliError> {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupted, stopping guidance");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("failed to install Ctrl-C handler: {}", e)))?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizonmaps::route::Step;
    use tempfile::TempDir;

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_point("4.6531, -74.0837").unwrap(),
            GeoPoint::new(4.6531, -74.0837)
        );
        assert!(parse_point("4.6531").is_err());
        assert!(parse_point("abc,1").is_err());
        assert!(parse_point("95,10").is_err());
    }

    #[test]
    fn test_route_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("route.json");
        let a = GeoPoint::new(4.6531, -74.0837);
        let b = GeoPoint::new(4.6600, -74.0700);
        let route = RouteModel::new(
            vec![a, b],
            vec![Step::new(a, "Head northeast", 0.0), Step::new(b, "Arrive", 1700.0)],
        );

        write_json(&path, &route).unwrap();
        assert_eq!(load_route(&path).unwrap(), route);
    }

    #[test]
    fn test_load_route_rejects_empty_steps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("route.json");
        std::fs::write(&path, r#"{"polyline": [{"lat": 0.0, "lon": 0.0}], "steps": []}"#).unwrap();
        assert!(matches!(load_route(&path), Err(CliError::File { .. })));
    }

    #[test]
    fn test_load_track() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(
            &path,
            r#"[{"latitude": 4.6531, "longitude": -74.0837, "timestamp_ms": 1000}]"#,
        )
        .unwrap();
        let track = load_track(&path).unwrap();
        assert_eq!(track, vec![Position::new(4.6531, -74.0837, 1000)]);
    }
}

//! `route`: fetch a route from the directions service.

use std::path::PathBuf;

use clap::Args;
use horizonmaps::config::ConfigFile;
use horizonmaps::geo::GeoPoint;
use horizonmaps::routing::{RouteRequest, RoutingProfile};

use super::common::{http_routing_client, parse_point, runtime, write_json, ProfileArg};
use crate::error::CliError;
use crate::output::{print_route, spinner};

/// Arguments for `horizonmaps route`.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Start point as LAT,LON
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: GeoPoint,

    /// Destination as LAT,LON
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: GeoPoint,

    /// Travel mode (default: routing.profile from config)
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Save the route as JSON for `simulate --route` / `replay --route`
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Run `horizonmaps route`.
pub fn run(args: RouteArgs, config: &ConfigFile) -> Result<(), CliError> {
    let profile: RoutingProfile = args
        .profile
        .map(Into::into)
        .unwrap_or(config.routing.profile);
    let client = http_routing_client(config)?;
    let request = RouteRequest::new(args.from, args.to, profile);

    let rt = runtime()?;
    let progress = spinner(&format!("Requesting {} directions...", profile));
    let result = rt.block_on(client.route(&request));
    progress.finish_and_clear();
    let route = result?;

    print_route(&route);

    if let Some(path) = args.output {
        write_json(&path, &route)?;
        println!("Saved route to {}", path.display());
    }
    Ok(())
}

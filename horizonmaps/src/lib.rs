//! HorizonMaps guidance core.
//!
//! Turn-by-turn navigation against an externally planned route: live
//! position fixes go in, step advances, off-route signals and arrival come
//! out. Route planning, map rendering and speech are external collaborators
//! reached through traits.
//!
//! # Layout
//!
//! | Module        | Role                                                   |
//! |---------------|--------------------------------------------------------|
//! | [`geo`]        | Great-circle distance, bearing, segment projection     |
//! | [`route`]      | Immutable route snapshot (polyline + steps)            |
//! | [`position`]   | Position fixes, samplers, heading history              |
//! | [`navigation`] | The synchronous progress tracker                       |
//! | [`routing`]    | Directions service client                              |
//! | [`announce`]   | Spoken instruction sinks                               |
//! | [`map_view`]   | Marker and route-line sinks                            |
//! | [`session`]    | Async loop tying sampler, tracker, sinks and rerouting |
//! | [`config`]     | INI configuration file                                 |
//! | [`logging`]    | Tracing subscriber setup                               |

pub mod announce;
pub mod config;
pub mod geo;
pub mod logging;
pub mod map_view;
pub mod navigation;
pub mod position;
pub mod route;
pub mod routing;
pub mod session;

/// Version of the HorizonMaps library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Route command handler for computing least-cost paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use roadrouter_lib::{
    route_between_links, FreeSpeedTravelTime, LeastCostPathCalculator, Network,
    OnlyTimeDependentDisutility, RecordingRouter, RouteAlgorithm, RouterConfig,
    TimeDistanceDisutility, TravelDisutility, TravelTime, Vehicle,
};

use crate::network_file::load_network;
use crate::output::{OutputFormat, RouteReport};

/// Where a route starts and ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoints {
    /// External node identifiers.
    Nodes { from: String, to: String },
    /// External link identifiers; the route runs from the end of `from` to
    /// the start of `to`.
    Links { from: String, to: String },
}

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub network: PathBuf,
    pub endpoints: Endpoints,
    /// JSON `RouterConfig` to start from.
    pub config: Option<PathBuf>,
    /// Overrides for the loaded configuration.
    pub algorithm: Option<RouteAlgorithm>,
    pub overdo_factor: Option<f64>,
    pub landmarks: Option<usize>,
    /// Departure time in seconds after midnight.
    pub start_time: f64,
    /// Restrict the network to links allowing one of these modes.
    pub modes: Vec<String>,
    /// Cap on the vehicle speed in m/s.
    pub max_speed: Option<f64>,
    /// Extra cost per metre on top of travel time.
    pub distance_cost: f64,
}

impl RouteCommandArgs {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn router_config(&self) -> Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => read_router_config(path)?,
            None => RouterConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(overdo_factor) = self.overdo_factor {
            config.overdo_factor = overdo_factor;
        }
        if let Some(landmarks) = self.landmarks {
            config.landmark_count = landmarks;
        }
        config.validate().context("invalid router configuration")?;
        Ok(config)
    }
}

fn read_router_config(path: &Path) -> Result<RouterConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read router config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse router config {}", path.display()))
}

/// Handle the route subcommand.
pub fn handle_route_command(args: &RouteCommandArgs, format: OutputFormat) -> Result<()> {
    let config = args.router_config()?;
    let network = load_network(&args.network)?;
    let network = Arc::new(restrict_modes(network, &args.modes));

    let travel_time: Arc<dyn TravelTime> = Arc::new(FreeSpeedTravelTime);
    let disutility: Arc<dyn TravelDisutility> = if args.distance_cost > 0.0 {
        Arc::new(TimeDistanceDisutility::new(
            travel_time.clone(),
            1.0,
            args.distance_cost,
        ))
    } else {
        Arc::new(OnlyTimeDependentDisutility::new(travel_time.clone()))
    };

    let router = RecordingRouter::new(
        config
            .build_router(network.clone(), travel_time, disutility)
            .with_context(|| format!("failed to prepare {} router", config.algorithm))?,
    );
    let vehicle = args
        .max_speed
        .map(|speed| Vehicle::new("cli").with_max_velocity(speed));

    let (path, from, to) = match &args.endpoints {
        Endpoints::Nodes { from, to } => {
            let source = network.resolve_node(from)?;
            let target = network.resolve_node(to)?;
            let path = router.calc_least_cost_path(
                source,
                target,
                args.start_time,
                None,
                vehicle.as_ref(),
            )?;
            (path, from, to)
        }
        Endpoints::Links { from, to } => {
            let entry = network.resolve_link(from)?;
            let exit = network.resolve_link(to)?;
            let path = route_between_links(
                &router,
                entry,
                exit,
                args.start_time,
                None,
                vehicle.as_ref(),
            )?;
            (path, from, to)
        }
    };

    let Some(path) = path else {
        bail!(
            "No route found between '{from}' and '{to}'. Check link directions{}.",
            if args.modes.is_empty() {
                ""
            } else {
                " and the --mode filter"
            }
        );
    };

    let report = RouteReport::new(&network, config.algorithm, args.start_time, &path);
    format.render_route(&report)
}

fn restrict_modes(network: Network, modes: &[String]) -> Network {
    if modes.is_empty() {
        return network;
    }
    let modes: Vec<&str> = modes.iter().map(String::as_str).collect();
    let filtered = network.filter_by_modes(&modes);
    tracing::debug!(
        modes = ?modes,
        links = filtered.link_count(),
        dropped = network.link_count() - filtered.link_count(),
        "filtered network by mode"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args() -> RouteCommandArgs {
        RouteCommandArgs {
            network: PathBuf::from("network.json"),
            endpoints: Endpoints::Nodes {
                from: "a".into(),
                to: "b".into(),
            },
            config: None,
            algorithm: None,
            overdo_factor: None,
            landmarks: None,
            start_time: 0.0,
            modes: Vec::new(),
            max_speed: None,
            distance_cost: 0.0,
        }
    }

    #[test]
    fn defaults_to_dijkstra() {
        let config = args().router_config().unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn flags_override_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "algorithm": "a-star-landmarks", "landmark_count": 4, "overdo_factor": 2.0 }}"#
        )
        .unwrap();

        let mut args = args();
        args.config = Some(file.path().to_path_buf());
        args.overdo_factor = Some(1.5);
        let config = args.router_config().unwrap();

        assert_eq!(config.algorithm, RouteAlgorithm::AStarLandmarks);
        assert_eq!(config.landmark_count, 4);
        assert_eq!(config.overdo_factor, 1.5);
    }

    #[test]
    fn invalid_overdo_factor_is_rejected_before_loading() {
        let mut args = args();
        args.overdo_factor = Some(0.5);
        let error = args.router_config().unwrap_err();
        assert!(format!("{error:#}").contains("overdo"));
    }
}

//! Travel time and travel disutility functions.
//!
//! The router never computes link costs itself. Callers hand it a
//! [`TravelTime`] and a [`TravelDisutility`], both of which may depend on the
//! time a link is entered and on the traveler and vehicle making the trip.
//! A few common implementations live here; anything more elaborate (congestion
//! feedback, tolls, personal preferences) is expected to come from the caller.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::network::{Link, LinkId};

/// Person on whose behalf a route is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub id: String,
}

impl Traveler {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Vehicle used for the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    /// Maximum velocity in metres per second, if the vehicle is slower than
    /// some of the roads it uses.
    pub max_velocity: Option<f64>,
}

impl Vehicle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            max_velocity: None,
        }
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = Some(max_velocity);
        self
    }
}

/// Seconds needed to traverse a link when entering it at `time`.
pub trait TravelTime: Send + Sync {
    fn link_travel_time(
        &self,
        link: &Link,
        time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64;
}

/// Generalized, non-negative cost of traversing a link when entering it at `time`.
pub trait TravelDisutility: Send + Sync {
    fn link_travel_disutility(
        &self,
        link: &Link,
        time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64;

    /// Lower bound of [`TravelDisutility::link_travel_disutility`] over all
    /// times, travelers and vehicles. Landmark preprocessing uses it as the
    /// static link weight.
    fn link_minimum_travel_disutility(&self, link: &Link) -> f64;
}

/// Travel time at free-flow speed, capped by the vehicle's maximum velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeSpeedTravelTime;

impl TravelTime for FreeSpeedTravelTime {
    fn link_travel_time(
        &self,
        link: &Link,
        _time: f64,
        _traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64 {
        let speed = match vehicle.and_then(|vehicle| vehicle.max_velocity) {
            Some(max_velocity) if max_velocity > 0.0 => link.freespeed.min(max_velocity),
            _ => link.freespeed,
        };
        link.length / speed
    }
}

/// Observed travel times aggregated into fixed-width time bins.
///
/// Links or bins without observations fall back to free-flow travel time.
/// Times after the last recorded bin reuse that bin. Observed values below
/// the free-flow time are raised to it, so the free-flow time stays a valid
/// lower bound for heuristics.
#[derive(Debug, Clone)]
pub struct TimeBinnedTravelTime {
    bin_size: f64,
    observed: HashMap<LinkId, Vec<Option<f64>>>,
}

impl TimeBinnedTravelTime {
    /// Create an empty table with bins `bin_size` seconds wide.
    ///
    /// Non-positive bin sizes are replaced with 900 s.
    pub fn new(bin_size: f64) -> Self {
        let bin_size = if bin_size.is_finite() && bin_size > 0.0 {
            bin_size
        } else {
            900.0
        };
        Self {
            bin_size,
            observed: HashMap::new(),
        }
    }

    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// Record the travel time for `link` during `bin`.
    pub fn set(&mut self, link: LinkId, bin: usize, travel_time: f64) {
        let bins = self.observed.entry(link).or_default();
        if bins.len() <= bin {
            bins.resize(bin + 1, None);
        }
        bins[bin] = Some(travel_time);
    }

    fn bin_for(&self, time: f64) -> usize {
        if time <= 0.0 {
            0
        } else {
            (time / self.bin_size).floor() as usize
        }
    }
}

impl TravelTime for TimeBinnedTravelTime {
    fn link_travel_time(
        &self,
        link: &Link,
        time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64 {
        let free_flow = FreeSpeedTravelTime.link_travel_time(link, time, traveler, vehicle);
        let observed = self.observed.get(&link.id).and_then(|bins| {
            let bin = self.bin_for(time).min(bins.len().saturating_sub(1));
            bins.get(bin).copied().flatten()
        });
        observed.map_or(free_flow, |value| value.max(free_flow))
    }
}

/// Disutility equal to the travel time reported by the wrapped function.
#[derive(Clone)]
pub struct OnlyTimeDependentDisutility {
    travel_time: Arc<dyn TravelTime>,
}

impl OnlyTimeDependentDisutility {
    pub fn new(travel_time: Arc<dyn TravelTime>) -> Self {
        Self { travel_time }
    }
}

impl TravelDisutility for OnlyTimeDependentDisutility {
    fn link_travel_disutility(
        &self,
        link: &Link,
        time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64 {
        self.travel_time
            .link_travel_time(link, time, traveler, vehicle)
    }

    fn link_minimum_travel_disutility(&self, link: &Link) -> f64 {
        link.free_flow_travel_time()
    }
}

/// Linear combination of travel time and distance.
///
/// `cost = cost_per_second * travel_time + cost_per_meter * length`.
#[derive(Clone)]
pub struct TimeDistanceDisutility {
    travel_time: Arc<dyn TravelTime>,
    cost_per_second: f64,
    cost_per_meter: f64,
}

impl TimeDistanceDisutility {
    /// Negative marginal costs are clamped to zero to keep link costs non-negative.
    pub fn new(travel_time: Arc<dyn TravelTime>, cost_per_second: f64, cost_per_meter: f64) -> Self {
        Self {
            travel_time,
            cost_per_second: cost_per_second.max(0.0),
            cost_per_meter: cost_per_meter.max(0.0),
        }
    }
}

impl TravelDisutility for TimeDistanceDisutility {
    fn link_travel_disutility(
        &self,
        link: &Link,
        time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> f64 {
        let travel_time = self
            .travel_time
            .link_travel_time(link, time, traveler, vehicle);
        self.cost_per_second * travel_time + self.cost_per_meter * link.length
    }

    fn link_minimum_travel_disutility(&self, link: &Link) -> f64 {
        self.cost_per_second * link.free_flow_travel_time() + self.cost_per_meter * link.length
    }
}

//! Preprocess command handler.
//!
//! Runs the Euclidean and landmark preprocessing on a network and reports
//! what a router built from it would work with.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use roadrouter_lib::{
    FreeSpeedTravelTime, OnlyTimeDependentDisutility, Preprocess, PreprocessEuclidean,
    PreprocessLandmarks,
};

use crate::network_file::load_network;
use crate::output::{OutputFormat, PreprocessReport, ShortLink};

/// Arguments for the preprocess command.
#[derive(Debug, Clone)]
pub struct PreprocessCommandArgs {
    pub network: PathBuf,
    pub landmarks: usize,
}

/// Handle the preprocess subcommand.
pub fn handle_preprocess_command(args: &PreprocessCommandArgs, format: OutputFormat) -> Result<()> {
    let network = load_network(&args.network)?;

    let euclidean = PreprocessEuclidean
        .run(&network)
        .context("euclidean preprocessing failed")?;
    let disutility = Arc::new(OnlyTimeDependentDisutility::new(Arc::new(
        FreeSpeedTravelTime,
    )));
    let landmarks = PreprocessLandmarks::new(disutility)
        .with_landmark_count(args.landmarks)
        .run(&network)
        .context("landmark preprocessing failed")?;

    let report = PreprocessReport {
        nodes: network.node_count(),
        links: network.link_count(),
        max_freespeed: network.max_freespeed(),
        short_links: euclidean
            .warnings()
            .iter()
            .map(|warning| ShortLink {
                link: warning.link_name.clone(),
                length: warning.length,
                straight_line: warning.straight_line,
            })
            .collect(),
        landmarks: landmarks
            .landmarks()
            .iter()
            .map(|&node| network.node(node).name.clone())
            .collect(),
    };
    format.render_preprocess(&report)
}

//! Output formatting for command results.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use roadrouter_lib::{Network, Path, RouteAlgorithm};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// One JSON document.
    Json,
}

/// A computed route with external identifiers resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub algorithm: RouteAlgorithm,
    pub from: String,
    pub to: String,
    pub departure_time: f64,
    pub nodes: Vec<String>,
    pub links: Vec<String>,
    pub travel_time: f64,
    pub travel_cost: f64,
}

impl RouteReport {
    pub fn new(
        network: &Network,
        algorithm: RouteAlgorithm,
        departure_time: f64,
        path: &Path,
    ) -> Self {
        let nodes: Vec<String> = path
            .node_names(network)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            algorithm,
            from: nodes.first().cloned().unwrap_or_default(),
            to: nodes.last().cloned().unwrap_or_default(),
            departure_time,
            links: path
                .link_names(network)
                .into_iter()
                .map(str::to_string)
                .collect(),
            nodes,
            travel_time: path.travel_time,
            travel_cost: path.travel_cost,
        }
    }
}

/// Summary of preprocessing a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessReport {
    pub nodes: usize,
    pub links: usize,
    pub max_freespeed: Option<f64>,
    pub short_links: Vec<ShortLink>,
    pub landmarks: Vec<String>,
}

/// Link shorter than the straight line between its nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortLink {
    pub link: String,
    pub length: f64,
    pub straight_line: f64,
}

impl OutputFormat {
    pub fn render_route(&self, report: &RouteReport) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Json => write_json(&mut out, report)?,
            OutputFormat::Text => write_route_text(&mut out, report)?,
        }
        Ok(())
    }

    pub fn render_preprocess(&self, report: &PreprocessReport) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Json => write_json(&mut out, report)?,
            OutputFormat::Text => write_preprocess_text(&mut out, report)?,
        }
        Ok(())
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write the text form of a route.
pub fn write_route_text<W: Write>(out: &mut W, report: &RouteReport) -> io::Result<()> {
    writeln!(
        out,
        "Route from {} to {} ({} links; algorithm: {}):",
        report.from,
        report.to,
        report.links.len(),
        report.algorithm
    )?;
    if let Some(first) = report.nodes.first() {
        writeln!(out, "+ {first}")?;
    }
    for (link, node) in report.links.iter().zip(report.nodes.iter().skip(1)) {
        writeln!(out, "  via {link} -> {node}")?;
    }
    writeln!(out)?;
    writeln!(out, "Travel time: {:.1}s", report.travel_time)?;
    writeln!(out, "Travel cost: {:.2}", report.travel_cost)
}

/// Write the text form of a preprocessing report.
pub fn write_preprocess_text<W: Write>(out: &mut W, report: &PreprocessReport) -> io::Result<()> {
    writeln!(out, "Network: {} nodes, {} links", report.nodes, report.links)?;
    match report.max_freespeed {
        Some(speed) => writeln!(out, "Max free speed: {speed:.2} m/s")?,
        None => writeln!(out, "Max free speed: n/a (no links)")?,
    }
    if report.short_links.is_empty() {
        writeln!(out, "Euclidean estimates are admissible.")?;
    } else {
        writeln!(
            out,
            "Warning: {} links are shorter than the distance between their nodes:",
            report.short_links.len()
        )?;
        for short in &report.short_links {
            writeln!(
                out,
                "- {} ({:.1}m < {:.1}m)",
                short.link, short.length, short.straight_line
            )?;
        }
    }
    writeln!(out, "Landmarks: {}", report.landmarks.join(", "))
}

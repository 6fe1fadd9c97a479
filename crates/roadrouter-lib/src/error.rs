use thiserror::Error;

/// Convenient result alias for the roadrouter library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Every variant is a configuration error raised before a query runs. A
/// query that cannot reach its target is not an error: it yields `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when preprocessing or routing is attempted on a network without nodes.
    #[error("network contains no nodes")]
    EmptyNetwork,

    /// Raised when two nodes share the same external identifier.
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    /// Raised when two links share the same external identifier.
    #[error("duplicate link id: {id}")]
    DuplicateLink { id: String },

    /// Raised when a node identifier cannot be resolved in the network.
    #[error("unknown node: {id}{}", format_did_you_mean(.suggestions))]
    UnknownNode {
        id: String,
        suggestions: Vec<String>,
    },

    /// Raised when a link identifier cannot be resolved in the network.
    #[error("unknown link: {id}{}", format_did_you_mean(.suggestions))]
    UnknownLink {
        id: String,
        suggestions: Vec<String>,
    },

    /// Raised when a node has a NaN or infinite coordinate.
    #[error("invalid coordinate for node {id}: ({x}, {y})")]
    InvalidNodeCoordinate { id: String, x: f64, y: f64 },

    /// Raised when a link carries a length or speed that cannot be routed on.
    #[error("invalid {attribute} for link {id}: {value}")]
    InvalidLinkAttribute {
        id: String,
        attribute: &'static str,
        value: f64,
    },

    /// Raised when the heuristic scaling factor is not a finite value >= 1.
    #[error("overdo factor must be finite and >= 1, got {value}")]
    InvalidOverdoFactor { value: f64 },

    /// Raised when landmark preprocessing is asked for zero landmarks.
    #[error("landmark count must be at least 1")]
    InvalidLandmarkCount,

    /// Raised when preprocessing data was computed for a different network.
    #[error(
        "preprocessing data was built for {expected_nodes} nodes/{expected_links} links \
         but the network has {actual_nodes} nodes/{actual_links} links"
    )]
    StalePreprocessData {
        expected_nodes: usize,
        expected_links: usize,
        actual_nodes: usize,
        actual_links: usize,
    },

    /// Raised when a routing algorithm name is not recognised.
    #[error("unknown routing algorithm: {name}{}", format_suggestions(.suggestions))]
    UnknownAlgorithm {
        name: String,
        suggestions: Vec<String>,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Expected one of: {}", quoted(suggestions))
    }
}

fn format_did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(". Did you mean '{only}'?"),
        _ => format!(". Did you mean one of: {}?", quoted(suggestions)),
    }
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}

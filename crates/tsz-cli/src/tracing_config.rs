//! Tracing setup for the `tsz` binary.
//!
//! Output format is picked with `TSZ_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`, handy for following one
//!   module resolution from start to end
//! - `json`: one JSON object per event
//!
//! ```bash
//! # Every lookup the resolver makes
//! TSZ_LOG=tsz_program::module_resolver=trace TSZ_LOG_FORMAT=tree tsz main.ts
//!
//! # Program construction and structure reuse
//! TSZ_LOG=tsz_program::program=debug tsz -p .
//! ```
//!
//! Nothing is installed unless `TSZ_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TSZ_LOG_FORMAT").unwrap_or_default())
    }
}

/// `TSZ_LOG` wins over `RUST_LOG`. Both use `RUST_LOG` directive syntax.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TSZ_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber. Output goes to stderr so `--listFiles`
/// on stdout stays clean.
pub fn init_tracing() {
    let has_tsz_log = std::env::var("TSZ_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_tsz_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

//! Analysis configuration
//!
//! All configuration the core consumes is carried in a single explicit value
//! passed into each pass at construction. There is no global mutable state:
//! two analyses with different configurations can run back to back (or in
//! separate worker processes) without interfering.

use serde::{Deserialize, Serialize};

/// Configuration for a single file analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Dotted namespace prefixes participating in alias resolution.
    ///
    /// A symbol takes part in alias tracking only when its leading dotted
    /// segment is one of these (e.g. `ns` tracks `ns.foo.Bar`).
    pub tracked_prefixes: Vec<String>,

    /// The zero-argument call that introduces an aliasing block when used
    /// as a whole top-level statement.
    pub alias_marker: String,

    /// Maximum allowed line length. Indentation diagnostics only enumerate
    /// expected columns below this limit.
    pub max_line_length: usize,

    /// When set, the indentation engine traces its stack for every checked
    /// line through `log::debug!`.
    pub debug_indentation: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            tracked_prefixes: Vec::new(),
            alias_marker: "goog.scope".to_string(),
            max_line_length: 80,
            debug_indentation: false,
        }
    }
}

impl CheckConfig {
    /// Create a configuration tracking the given namespace prefixes.
    pub fn with_tracked_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CheckConfig {
            tracked_prefixes: prefixes.into_iter().map(Into::into).collect(),
            ..CheckConfig::default()
        }
    }

    /// Whether the leading dotted segment of `symbol` is tracked.
    pub fn tracks(&self, symbol: &str) -> bool {
        let namespace = symbol.split('.').next().unwrap_or(symbol);
        self.tracked_prefixes.iter().any(|p| p == namespace)
    }

    /// The leading segment of the alias marker (`goog` for `goog.scope`),
    /// used to recognize module-style binding calls.
    pub(crate) fn marker_namespace(&self) -> &str {
        self.alias_marker
            .split('.')
            .next()
            .unwrap_or(&self.alias_marker)
    }
}

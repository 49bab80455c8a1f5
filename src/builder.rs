//! Analyzer builder for flexible configuration
//!
//! This module provides a builder pattern for creating analyzers without
//! assembling a [`Config`] by hand. Values are checked once, in `build`.

use crate::analyzer::Analyzer;
use crate::cancel::CancelToken;
use crate::config::{Config, DegreeScale, Strategy};
use crate::error::Result;

/// Builder for analyzer configuration.
///
/// # Examples
///
/// ```
/// use canopy::{AnalyzerBuilder, DegreeScale, Strategy};
///
/// let analyzer = AnalyzerBuilder::new()
///     .radius_ft(50.0)
///     .strategy(Strategy::SlidingWindow)
///     .degree_scale(DegreeScale::LatitudeCorrected)
///     .build()?;
/// assert_eq!(analyzer.config().search_radius_ft, 50.0);
/// # Ok::<(), canopy::CanopyError>(())
/// ```
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    config: Config,
    cancel: Option<CancelToken>,
}

impl AnalyzerBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn radius_ft(mut self, radius: f64) -> Self {
        self.config.search_radius_ft = radius;
        self
    }

    pub fn earth_radius_ft(mut self, radius: f64) -> Self {
        self.config.earth_radius_ft = radius;
        self
    }

    pub fn degree_scale(mut self, scale: DegreeScale) -> Self {
        self.config.degree_scale = scale;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Log every new maximum and tie while searching.
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.config.diagnostics = enabled;
        self
    }

    pub fn max_zones(mut self, max_zones: usize) -> Self {
        self.config.max_zones = max_zones;
        self
    }

    pub fn cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration and build the analyzer.
    pub fn build(self) -> Result<Analyzer> {
        let analyzer = Analyzer::new(self.config)?;
        Ok(match self.cancel {
            Some(token) => analyzer.with_cancellation(token),
            None => analyzer,
        })
    }
}

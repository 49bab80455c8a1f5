//! Search configuration.
//!
//! The configuration is serializable so a run can be described in JSON, or in
//! TOML with the `toml` feature, next to the dataset it is applied to.

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Earth radius used by the distance oracle, in feet.
pub const EARTH_RADIUS_FT: f64 = 20_888_000.0;

/// Degrees of arc per foot of ground distance used by the fixed scale.
///
/// One constant is applied to both axes. It slightly over-covers latitude
/// everywhere but under-covers longitude away from the equator; see
/// [`DegreeScale`].
pub const FT_DEGREES: f64 = 0.000_002_75;

/// How the search radius is converted into axis thresholds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DegreeScale {
    /// A single degrees-per-foot constant for both axes, typically
    /// [`FT_DEGREES`].
    ///
    /// Accepted accuracy trade-off: at higher latitudes a degree of longitude
    /// is shorter than this constant assumes, so the longitude window is too
    /// narrow and the zone grid can miss neighbours that lie mostly east or
    /// west of a point. A warning is logged when the dataset falls into that
    /// band.
    Fixed { degrees_per_foot: f64 },
    /// Exact latitude threshold and a longitude threshold widened for the
    /// highest absolute latitude found in the dataset.
    #[default]
    LatitudeCorrected,
}

impl DegreeScale {
    /// The fixed scale with the [`FT_DEGREES`] constant.
    pub const fn fixed() -> Self {
        DegreeScale::Fixed {
            degrees_per_foot: FT_DEGREES,
        }
    }
}

/// Which pruning strategy drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One window scan over every point sorted by latitude.
    SlidingWindow,
    /// Overlapping zone grid with a longitude window scan inside each zone.
    #[default]
    ZoneGrid,
}

/// Search configuration
///
/// # Example
///
/// ```rust
/// use canopy::{Config, Strategy};
///
/// let config = Config::default();
/// assert_eq!(config.search_radius_ft, 500.0);
///
/// let json = r#"{
///     "search_radius_ft": 50.0,
///     "strategy": "sliding_window",
///     "degree_scale": { "kind": "latitude_corrected" }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.strategy, Strategy::SlidingWindow);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Two points are neighbours when strictly closer than this, in feet
    #[serde(default = "Config::default_search_radius_ft")]
    pub search_radius_ft: f64,

    #[serde(default = "Config::default_earth_radius_ft")]
    pub earth_radius_ft: f64,

    #[serde(default)]
    pub degree_scale: DegreeScale,

    #[serde(default)]
    pub strategy: Strategy,

    /// Log progress whenever the running maximum changes
    #[serde(default)]
    pub diagnostics: bool,

    /// Upper bound on the number of zones a grid may allocate
    #[serde(default = "Config::default_max_zones")]
    pub max_zones: usize,
}

impl Config {
    const fn default_search_radius_ft() -> f64 {
        500.0
    }

    const fn default_earth_radius_ft() -> f64 {
        EARTH_RADIUS_FT
    }

    const fn default_max_zones() -> usize {
        1 << 24
    }

    /// Default configuration with a different search radius.
    pub fn with_radius(radius_ft: f64) -> Self {
        assert!(
            radius_ft.is_finite() && radius_ft > 0.0,
            "Search radius must be a positive, finite number of feet"
        );
        Self {
            search_radius_ft: radius_ft,
            ..Self::default()
        }
    }

    pub fn with_search_radius(mut self, radius_ft: f64) -> Self {
        assert!(
            radius_ft.is_finite() && radius_ft > 0.0,
            "Search radius must be a positive, finite number of feet"
        );
        self.search_radius_ft = radius_ft;
        self
    }

    pub fn with_earth_radius(mut self, radius_ft: f64) -> Self {
        self.earth_radius_ft = radius_ft;
        self
    }

    pub fn with_degree_scale(mut self, scale: DegreeScale) -> Self {
        self.degree_scale = scale;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_max_zones(mut self, max_zones: usize) -> Self {
        assert!(max_zones > 0, "Zone limit must be greater than zero");
        self.max_zones = max_zones;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.search_radius_ft.is_finite() || self.search_radius_ft <= 0.0 {
            return Err(format!(
                "Search radius must be positive and finite, got: {}",
                self.search_radius_ft
            ));
        }

        if !self.earth_radius_ft.is_finite() || self.earth_radius_ft <= 0.0 {
            return Err(format!(
                "Earth radius must be positive and finite, got: {}",
                self.earth_radius_ft
            ));
        }

        if self.search_radius_ft >= self.earth_radius_ft {
            return Err("Search radius must be smaller than the earth radius".to_string());
        }

        if let DegreeScale::Fixed { degrees_per_foot } = self.degree_scale
            && (!degrees_per_foot.is_finite() || degrees_per_foot <= 0.0)
        {
            return Err(format!(
                "Degrees per foot must be positive and finite, got: {}",
                degrees_per_foot
            ));
        }

        if self.max_zones == 0 {
            return Err("Zone limit must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_radius_ft: Self::default_search_radius_ft(),
            earth_radius_ft: Self::default_earth_radius_ft(),
            degree_scale: DegreeScale::default(),
            strategy: Strategy::default(),
            diagnostics: false,
            max_zones: Self::default_max_zones(),
        }
    }
}

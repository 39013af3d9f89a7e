//! Configuration module
//!
//! Configuration file:
//! - `%LOCALAPPDATA%\pegasus\heli-dash.hcl`       Windows
//! - `$HOME/.config/pegasus/heli-dash.hcl`   UNIX
//!
//! Every key is optional except `version`, missing ones take the values of the reference
//! dashboard (Madrid-centered map, H3 resolution 6).
//!
//! ```hcl
//! version = 1
//! title = "Hello Pegasus Dashboard"
//! resolution = 6
//! zoom = 7
//! opacity = 0.7
//! map_style = "carto-positron"
//! color_scale = "Viridis"
//! initial_day = "first"
//!
//! center {
//!   lat = 40.4168
//!   lon = -3.7038
//! }
//! ```
//!

use std::path::Path;

use eyre::Result;
use h3o::Resolution;
use pegasus_common::{ConfigFile, Versioned};
use serde::{Deserialize, Serialize};
use strum::{EnumString, VariantNames};
use tracing::{debug, trace};

use crate::cell::resolution;
use crate::error::Status;

/// Config filename
pub const CONFIG: &str = "heli-dash.hcl";

/// Current version
pub const CVERSION: usize = 1;

/// Which day the route view shows before any selection.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    PartialEq,
    Serialize,
    strum::Display,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InitialDay {
    /// Earliest day with activity
    #[default]
    First,
    /// Latest day with activity
    Last,
}

/// Map center
///
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Default for Center {
    /// Madrid
    fn default() -> Self {
        Center {
            lat: 40.4168,
            lon: -3.7038,
        }
    }
}

/// On-disk configuration of the dashboard
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DashConfig {
    /// File version
    pub version: usize,
    /// Page title
    pub title: String,
    /// H3 resolution used for the heatmap
    pub resolution: u8,
    /// Map zoom level
    pub zoom: u8,
    /// Heatmap cell opacity
    pub opacity: f64,
    /// Map tiles style
    pub map_style: String,
    /// Heatmap color scale
    pub color_scale: String,
    /// Initial day for the route view
    pub initial_day: InitialDay,
    /// Map center
    pub center: Center,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            version: CVERSION,
            title: "Hello Pegasus Dashboard".to_string(),
            resolution: 6,
            zoom: 7,
            opacity: 0.7,
            map_style: "carto-positron".to_string(),
            color_scale: "Viridis".to_string(),
            initial_day: InitialDay::First,
            center: Center::default(),
        }
    }
}

impl Versioned for DashConfig {
    fn version(&self) -> usize {
        self.version
    }
}

/// How the maps are displayed.
///
#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
    pub center: Center,
    pub zoom: u8,
    pub opacity: f64,
    pub style: String,
    pub color_scale: String,
}

/// Validated runtime settings derived from `DashConfig`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub title: String,
    pub resolution: Resolution,
    pub initial_day: InitialDay,
    pub view: MapView,
}

impl Default for Settings {
    fn default() -> Self {
        // The built-in configuration is always valid.
        //
        Settings {
            title: DashConfig::default().title,
            resolution: Resolution::Six,
            initial_day: InitialDay::First,
            view: MapView {
                center: Center::default(),
                zoom: 7,
                opacity: 0.7,
                style: "carto-positron".to_string(),
                color_scale: "Viridis".to_string(),
            },
        }
    }
}

impl TryFrom<DashConfig> for Settings {
    type Error = eyre::Report;

    fn try_from(cfg: DashConfig) -> Result<Self> {
        let resolution = resolution(cfg.resolution)?;
        if !(0.0..=1.0).contains(&cfg.opacity) {
            return Err(Status::BadOpacity(cfg.opacity).into());
        }
        Ok(Settings {
            title: cfg.title,
            resolution,
            initial_day: cfg.initial_day,
            view: MapView {
                center: cfg.center,
                zoom: cfg.zoom,
                opacity: cfg.opacity,
                style: cfg.map_style,
                color_scale: cfg.color_scale,
            },
        })
    }
}

/// Load the configuration, either the given file or the default one, then validate it.
///
/// Returns the raw configuration along with the settings derived from it.
///
#[tracing::instrument]
pub fn load_config(fname: Option<&Path>) -> Result<(DashConfig, Settings)> {
    let cfile = ConfigFile::<DashConfig>::load(fname, CONFIG, CVERSION)?;
    match cfile.source() {
        Some(src) => debug!("configuration from {src:?}"),
        None => trace!("built-in configuration"),
    }
    let cfg = cfile.into_inner();
    let settings = Settings::try_from(cfg.clone())?;
    Ok((cfg, settings))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration, defaults overridable from environment variables.

use std::str::FromStr;

use crate::material::Color;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Exploded view spread; 1.0 leaves parts in place.
    pub explode_factor: f64,
    /// Camera never sits closer to the fitted box than this (mm).
    pub min_fit_distance: f64,
    /// Margin applied to perspective fits.
    pub fit_padding: f64,
    /// Margin applied to the orthographic frustum.
    pub ortho_padding: f64,
    /// Gap between the model box and dimension lines (mm).
    pub dimension_clearance: f64,
    /// Stand-off of edge-banding strips from the panel edge (mm).
    pub edge_band_depth: f64,
    /// Vertical field of view of the perspective camera.
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Colour swapped in for selected meshes.
    pub highlight_color: Color,
}

impl ViewerConfig {
    /// Load configuration from `PANELVIEW_*` environment variables.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            explode_factor: env_or("PANELVIEW_EXPLODE_FACTOR", defaults.explode_factor),
            min_fit_distance: env_or("PANELVIEW_MIN_FIT_DISTANCE", defaults.min_fit_distance),
            fit_padding: env_or("PANELVIEW_FIT_PADDING", defaults.fit_padding),
            ortho_padding: env_or("PANELVIEW_ORTHO_PADDING", defaults.ortho_padding),
            dimension_clearance: env_or(
                "PANELVIEW_DIMENSION_CLEARANCE",
                defaults.dimension_clearance,
            ),
            edge_band_depth: env_or("PANELVIEW_EDGE_BAND_DEPTH", defaults.edge_band_depth),
            fov_degrees: env_or("PANELVIEW_FOV_DEGREES", defaults.fov_degrees),
            near: env_or("PANELVIEW_NEAR", defaults.near),
            far: env_or("PANELVIEW_FAR", defaults.far),
            highlight_color: std::env::var("PANELVIEW_HIGHLIGHT_COLOR")
                .ok()
                .and_then(|hex| Color::from_hex(&hex))
                .unwrap_or(defaults.highlight_color),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            explode_factor: 2.0,
            min_fit_distance: 100.0,
            fit_padding: 1.2,
            ortho_padding: 1.2,
            dimension_clearance: 40.0,
            edge_band_depth: 1.0,
            fov_degrees: 45.0,
            near: 1.0,
            far: 100_000.0,
            highlight_color: Color::rgb(1.0, 0.6, 0.1),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.explode_factor, 2.0);
        assert_eq!(config.min_fit_distance, 100.0);
        assert_eq!(config.ortho_padding, 1.2);
    }

    #[test]
    fn test_env_override_and_fallback() {
        std::env::set_var("PANELVIEW_TEST_NUMBER", "3.5");
        std::env::set_var("PANELVIEW_TEST_GARBAGE", "wide");
        assert_eq!(env_or("PANELVIEW_TEST_NUMBER", 1.0), 3.5);
        assert_eq!(env_or("PANELVIEW_TEST_GARBAGE", 1.0), 1.0);
        assert_eq!(env_or("PANELVIEW_TEST_UNSET", 7usize), 7);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render materials and the material colour palette.
//!
//! Colours are derived from a hash of the material name, so the same name
//! always gets the same colour. Materials are shared through `Arc`: every
//! mesh of one material holds the same allocation, which is what lets the
//! highlight swap restore a mesh's material by reference.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Linear RGBA colour, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// From hue (degrees), saturation and lightness
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Self::rgb(r + m, g + m, b + m)
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Same hue, scaled towards black
    pub fn darkened(&self, factor: f32) -> Self {
        let k = (1.0 - factor).clamp(0.0, 1.0);
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a,
        }
    }
}

/// Shading parameters of one mesh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderMaterial {
    pub name: String,
    pub color: Color,
    pub opacity: f32,
}

impl RenderMaterial {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            opacity: 1.0,
        }
    }
}

/// Colour of panels without a material name
pub const UNNAMED_COLOR: Color = Color::rgb(0.8, 0.78, 0.74);
/// Hardware
pub const FURNITURE_COLOR: Color = Color::rgb(0.62, 0.64, 0.68);
/// Profiles without a material name
pub const PROFILE_COLOR: Color = Color::rgb(0.75, 0.77, 0.8);

/// Deterministic colour for a material name
pub fn color_for_name(name: &str) -> Color {
    if name.is_empty() {
        return UNNAMED_COLOR;
    }
    let mut hasher = FxHasher::default();
    name.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash % 360) as f32;
    let saturation = 0.35 + ((hash >> 16) % 30) as f32 / 100.0;
    let lightness = 0.55 + ((hash >> 32) % 20) as f32 / 100.0;
    Color::from_hsl(hue, saturation, lightness)
}

/// Material name → colour map plus the shared material instances
#[derive(Debug, Default)]
pub struct MaterialPalette {
    colors: FxHashMap<String, Color>,
    panels: FxHashMap<String, Arc<RenderMaterial>>,
    edge_bands: FxHashMap<String, Arc<RenderMaterial>>,
    profiles: FxHashMap<String, Arc<RenderMaterial>>,
    furniture: Option<Arc<RenderMaterial>>,
}

impl MaterialPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour for `name`, assigned on first use
    pub fn color(&mut self, name: &str) -> Color {
        *self
            .colors
            .entry(name.to_string())
            .or_insert_with(|| color_for_name(name))
    }

    /// Assigned colour, if `name` has been seen
    pub fn assigned(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn colors(&self) -> &FxHashMap<String, Color> {
        &self.colors
    }

    pub fn panel_material(&mut self, name: &str) -> Arc<RenderMaterial> {
        if let Some(m) = self.panels.get(name) {
            return Arc::clone(m);
        }
        let material = Arc::new(RenderMaterial::new(name, self.color(name)));
        self.panels.insert(name.to_string(), Arc::clone(&material));
        material
    }

    /// Edge bands take a darker shade of their panel's colour
    pub fn edge_band_material(&mut self, name: &str) -> Arc<RenderMaterial> {
        if let Some(m) = self.edge_bands.get(name) {
            return Arc::clone(m);
        }
        let color = self.color(name).darkened(0.25);
        let material = Arc::new(RenderMaterial::new(name, color));
        self.edge_bands.insert(name.to_string(), Arc::clone(&material));
        material
    }

    pub fn profile_material(&mut self, name: Option<&str>) -> Arc<RenderMaterial> {
        let key = name.unwrap_or_default();
        if let Some(m) = self.profiles.get(key) {
            return Arc::clone(m);
        }
        let color = match name {
            Some(n) => self.color(n),
            None => PROFILE_COLOR,
        };
        let material = Arc::new(RenderMaterial::new(key, color));
        self.profiles.insert(key.to_string(), Arc::clone(&material));
        material
    }

    pub fn furniture_material(&mut self) -> Arc<RenderMaterial> {
        Arc::clone(
            self.furniture
                .get_or_insert_with(|| Arc::new(RenderMaterial::new("furniture", FURNITURE_COLOR))),
        )
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.panels.clear();
        self.edge_bands.clear();
        self.profiles.clear();
        self.furniture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_deterministic() {
        assert_eq!(color_for_name("ЛДСП Белый"), color_for_name("ЛДСП Белый"));
        assert_ne!(color_for_name("ЛДСП Белый"), color_for_name("Дуб"));
        assert_eq!(color_for_name(""), UNNAMED_COLOR);
    }

    #[test]
    fn test_palette_shares_materials() {
        let mut palette = MaterialPalette::new();
        let a = palette.panel_material("Дуб");
        let b = palette.panel_material("Дуб");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(palette.assigned("Дуб"), Some(a.color));
        assert!(palette.assigned("МДФ").is_none());

        let band = palette.edge_band_material("Дуб");
        assert!(band.color.r <= a.color.r);
        assert!(Arc::ptr_eq(&palette.furniture_material(), &palette.furniture_material()));
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert_eq!(c.to_hex(), "#ff8000");
        assert!(Color::from_hex("#ff80").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn test_hsl_primaries() {
        let red = Color::from_hsl(0.0, 1.0, 0.5);
        assert_eq!(red.to_hex(), "#ff0000");
        let blue = Color::from_hsl(240.0, 1.0, 0.5);
        assert_eq!(blue.to_hex(), "#0000ff");
    }
}

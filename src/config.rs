use serde::Deserialize;

use crate::color::{parse_color, Rgb};
use crate::error::{GridError, Result};

/// Smallest `max_size` (pixels) accepted; finer pitches make absurd lattices.
pub const MIN_CELL_SIZE: f32 = 1.0;

/// Everything the shaders and the update law are parameterised by.
///
/// Immutable for the life of a pipeline; a different configuration means a
/// new pipeline and a new grid.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GridConfig {
    pub front_color: String,
    pub back_color: String,
    /// Pointer distance (canvas pixels) at which cells reach `max_size`.
    pub proximity_range: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Seconds; used while a cell shrinks.
    pub ease_in_duration: f32,
    /// Seconds; used while a cell grows.
    pub ease_out_duration: f32,
    /// Size the backing store in device pixels instead of CSS pixels.
    pub high_dpi: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            front_color: "rgb(200,230,255)".to_string(),
            back_color: "rgb(10,10,20)".to_string(),
            proximity_range: 200.0,
            min_size: 0.0,
            max_size: 20.0,
            ease_in_duration: 0.2,
            ease_out_duration: 0.5,
            high_dpi: false,
        }
    }
}

/// Resolved colors, ready for `clear_color` / `uniform3f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub front: Rgb,
    pub back: Rgb,
}

impl GridConfig {
    /// Parses a camelCase JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<()> {
            Err(GridError::InvalidConfig { field, reason })
        }

        if !(self.proximity_range.is_finite() && self.proximity_range > 0.0) {
            return invalid("proximityRange", "must be a finite number greater than zero");
        }
        if !(self.max_size.is_finite() && self.max_size >= MIN_CELL_SIZE) {
            return invalid("maxSize", "must be a finite number of at least 1 pixel");
        }
        if !(self.min_size.is_finite() && self.min_size >= 0.0) {
            return invalid("minSize", "must be a finite, non-negative number");
        }
        if self.min_size > self.max_size {
            return invalid("minSize", "must not exceed maxSize");
        }
        if !(self.ease_in_duration.is_finite() && self.ease_in_duration >= 0.0) {
            return invalid("easeInDuration", "must be a finite, non-negative number");
        }
        if !(self.ease_out_duration.is_finite() && self.ease_out_duration >= 0.0) {
            return invalid("easeOutDuration", "must be a finite, non-negative number");
        }
        Ok(())
    }

    pub fn palette(&self) -> Palette {
        Palette {
            front: parse_color(&self.front_color),
            back: parse_color(&self.back_color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GridConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GridConfig::from_json(r#"{"maxSize": 32, "easeInDuration": 0.1}"#)
            .expect("config parses");
        assert_eq!(config.max_size, 32.0);
        assert_eq!(config.ease_in_duration, 0.1);
        assert_eq!(config.proximity_range, 200.0);
        assert_eq!(config.front_color, "rgb(200,230,255)");
    }

    #[test]
    fn rejects_inverted_size_range() {
        let err = GridConfig::from_json(r#"{"minSize": 30, "maxSize": 20}"#).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidConfig {
                field: "minSize",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_range() {
        let err = GridConfig::from_json(r#"{"proximityRange": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidConfig {
                field: "proximityRange",
                ..
            }
        ));
    }

    #[test]
    fn rejects_sub_pixel_max_size() {
        for json in [r#"{"maxSize": 1e-30}"#, r#"{"maxSize": 0.5}"#, r#"{"maxSize": 0}"#] {
            let err = GridConfig::from_json(json).unwrap_err();
            assert!(
                matches!(err, GridError::InvalidConfig { field: "maxSize", .. }),
                "{json}: {err}"
            );
        }
        GridConfig::from_json(r#"{"maxSize": 1}"#).expect("one pixel is accepted");
    }

    #[test]
    fn rejects_negative_duration() {
        let err = GridConfig::from_json(r#"{"easeOutDuration": -1}"#).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidConfig {
                field: "easeOutDuration",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_syntax_error() {
        assert!(matches!(
            GridConfig::from_json("{maxSize: 20"),
            Err(GridError::ConfigSyntax(_))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{"cellColour": "red"}"#),
            Err(GridError::ConfigSyntax(_))
        ));
    }

    #[test]
    fn palette_falls_back_to_black() {
        let config = GridConfig {
            front_color: "#ffffff".into(),
            back_color: "not a color".into(),
            ..GridConfig::default()
        };
        let palette = config.palette();
        assert_eq!(palette.front, [1.0, 1.0, 1.0]);
        assert_eq!(palette.back, [0.0, 0.0, 0.0]);
    }
}

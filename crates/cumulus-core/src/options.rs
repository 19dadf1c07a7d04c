//! Configuration options for cumulus.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::NoiseParameters;
use crate::noise::PermutationTable;
use crate::params::{RayMarchParams, ShadingFeatures};

/// Everything needed to build and drive one volume renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Noise field generation.
    pub noise: NoiseParameters,

    /// Seed for a shuffled permutation table. `None` uses the classic table.
    pub seed: Option<u64>,

    /// Initial ray-march parameters.
    pub march: RayMarchParams,

    /// Shader variant features.
    pub features: ShadingFeatures,

    /// Background color behind the volume.
    pub background_color: Vec3,

    /// Cosmetic spin of the box in radians per second.
    pub spin_speed: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self::cloud()
    }
}

impl Options {
    /// Soft, rounded cloud: spherical falloff, gentle opacity, shaded.
    #[must_use]
    pub fn cloud() -> Self {
        Self {
            noise: NoiseParameters::cloud(128),
            seed: None,
            march: RayMarchParams::default(),
            features: ShadingFeatures {
                shaded: true,
                jitter: true,
            },
            background_color: Vec3::new(0.2, 0.25, 0.35),
            spin_speed: 0.2,
        }
    }

    /// Raw noise rendered as a hard-edged solid.
    #[must_use]
    pub fn perlin() -> Self {
        Self {
            noise: NoiseParameters::perlin(128),
            seed: None,
            march: RayMarchParams {
                threshold: 0.6,
                opacity: 1.0,
                range: 0.0,
                steps: 200,
                base_color: Vec3::new(0.85, 0.8, 0.7),
            },
            features: ShadingFeatures {
                shaded: true,
                jitter: false,
            },
            background_color: Vec3::new(0.1, 0.1, 0.1),
            spin_speed: 0.2,
        }
    }

    /// Permutation table selected by `seed`.
    #[must_use]
    pub fn permutation_table(&self) -> PermutationTable {
        match self.seed {
            Some(seed) => PermutationTable::from_seed(seed),
            None => PermutationTable::classic(),
        }
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: Self = serde_json::from_str(json)?;
        options.march = options.march.clamped();
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("loading options from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Serializes options to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CumulusError;

    #[test]
    fn test_json_round_trip() {
        let options = Options::perlin();
        let json = options.to_json().unwrap();
        assert_eq!(Options::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = Options::from_json(r#"{ "spin_speed": 0.0, "seed": 9 }"#).unwrap();
        assert_eq!(options.spin_speed, 0.0);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.noise, Options::cloud().noise);
    }

    #[test]
    fn test_json_params_are_clamped() {
        let json = r#"{ "march": { "threshold": 3.0, "opacity": 0.5, "range": 0.1,
            "steps": 0, "base_color": [1.0, 1.0, 1.0] } }"#;
        let options = Options::from_json(json).unwrap();
        assert_eq!(options.march.threshold, 1.0);
        assert_eq!(options.march.steps, 1);
    }

    #[test]
    fn test_bad_json_is_error() {
        let err = Options::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CumulusError::JsonError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Options::load("/nonexistent/cumulus/options.json").unwrap_err();
        assert!(matches!(err, CumulusError::IoError(_)));
    }

    #[test]
    fn test_seed_selects_table() {
        let mut options = Options::cloud();
        assert_eq!(options.permutation_table(), PermutationTable::classic());
        options.seed = Some(3);
        assert_eq!(options.permutation_table(), PermutationTable::from_seed(3));
    }
}

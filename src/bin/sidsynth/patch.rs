//! Patch files
//!
//! A patch is a TOML file with the engine parameters in engineering units
//! plus the values the ring-mod, filter-LFO and glide switches flip to:
//!
//! ```toml
//! name = "acid arp"
//! tempo = 132.0
//!
//! [parameters]
//! attack = 0.01
//! release = 0.2
//! cutoff = 2400.0
//! resonance = 0.6
//! ring_mod_feedback = 0.4
//!
//! [presets]
//! ring_mod_rate = 0.2
//! lfo_rate = 0.5
//! lfo_depth = 0.8
//! portamento = 0.05
//! ```
//!
//! Every field is optional.

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use serde::Deserialize;
use std::{fs, path::Path};

use sidsynth::{synth::EngineParameters, EngineConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Patch {
    pub name: String,
    pub tempo: f32,
    pub max_voices: usize,
    pub parameters: EngineParameters,
    pub presets: SwitchPresets,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            tempo: 120.0,
            max_voices: 16,
            parameters: EngineParameters {
                attack: 0.005,
                decay: 0.15,
                sustain: 0.6,
                release: 0.12,
                cutoff: 3_000.0,
                resonance: 0.5,
                ..Default::default()
            },
            presets: SwitchPresets::default(),
        }
    }
}

/// Values the UI switches toggle between zero and.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SwitchPresets {
    pub ring_mod_rate: f32,
    pub lfo_rate: f32,
    pub lfo_depth: f32,
    pub portamento: f32,
}

impl Default for SwitchPresets {
    fn default() -> Self {
        Self {
            ring_mod_rate: 0.1,
            lfo_rate: 0.5,
            lfo_depth: 0.7,
            portamento: 0.06,
        }
    }
}

impl Patch {
    pub fn load(path: &Path) -> EyreResult<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read patch {}", path.display()))?;
        Self::parse(&text).wrap_err_with(|| format!("invalid patch {}", path.display()))
    }

    pub fn parse(text: &str) -> EyreResult<Self> {
        let mut patch: Patch = toml::from_str(text)?;
        patch.parameters = patch.parameters.sanitized();
        Ok(patch)
    }

    pub fn engine_config(&self, sample_rate: f32, channels: usize) -> EngineConfig {
        EngineConfig {
            sample_rate,
            tempo: self.tempo,
            max_voices: self.max_voices,
            channels,
        }
        .sanitized()
    }
}

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cavern_skirmish_system_combat::{CalibrationConfig, CombatConfig};
use serde::Deserialize;

/// Settings read from an optional TOML file.
///
/// ```toml
/// [combat]
/// elf_attack_power = 3
/// require_no_elf_losses = false
/// max_rounds = 10000
///
/// [calibration]
/// start_power = 3
/// max_power = 200
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) combat: CombatConfig,
    pub(crate) calibration: CalibrationConfig,
}

impl FileConfig {
    /// Loads the file when a path is given and falls back to defaults otherwise.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(?config, path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CombatOverrides {
    pub(crate) elf_attack_power: Option<u32>,
    pub(crate) require_no_elf_losses: bool,
    pub(crate) max_rounds: Option<u32>,
}

impl CombatOverrides {
    pub(crate) fn apply(self, mut config: CombatConfig) -> CombatConfig {
        if let Some(power) = self.elf_attack_power {
            config.elf_attack_power = power;
        }
        if self.require_no_elf_losses {
            config.require_no_elf_losses = true;
        }
        if let Some(max_rounds) = self.max_rounds {
            config.max_rounds = max_rounds;
        }
        config
    }
}

/// Calibration values that take precedence over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CalibrationOverrides {
    pub(crate) start_power: Option<u32>,
    pub(crate) max_power: Option<u32>,
    pub(crate) max_rounds: Option<u32>,
}

impl CalibrationOverrides {
    pub(crate) fn apply(self, mut config: CalibrationConfig) -> CalibrationConfig {
        if let Some(start_power) = self.start_power {
            config.start_power = start_power;
        }
        if let Some(max_power) = self.max_power {
            config.max_power = max_power;
        }
        if let Some(max_rounds) = self.max_rounds {
            config.max_rounds = max_rounds;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = FileConfig::parse("[combat]\nelf_attack_power = 9\n").expect("valid toml");

        assert_eq!(config.combat.elf_attack_power, 9);
        assert_eq!(config.combat.max_rounds, CombatConfig::default().max_rounds);
        assert_eq!(config.calibration, CalibrationConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[combat]\nelf_power = 9\n").is_err());
        assert!(FileConfig::parse("[arena]\n").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig::parse(
            "[combat]\nelf_attack_power = 9\nmax_rounds = 40\n\n[calibration]\nmax_power = 50\n",
        )
        .expect("valid toml");

        let combat = CombatOverrides {
            elf_attack_power: Some(14),
            require_no_elf_losses: true,
            max_rounds: None,
        }
        .apply(file.combat);
        let calibration = CalibrationOverrides {
            start_power: Some(5),
            ..CalibrationOverrides::default()
        }
        .apply(file.calibration);

        assert_eq!(combat.elf_attack_power, 14);
        assert!(combat.require_no_elf_losses);
        assert_eq!(combat.max_rounds, 40);
        assert_eq!(calibration.start_power, 5);
        assert_eq!(calibration.max_power, 50);
    }

    #[test]
    fn missing_path_yields_defaults() {
        assert_eq!(FileConfig::load(None).expect("defaults"), FileConfig::default());
    }
}

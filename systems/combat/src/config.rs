use cavern_skirmish_core::DEFAULT_ELF_ATTACK_POWER;
use serde::{Deserialize, Serialize};

/// Rounds a single combat may last before it is declared a stalemate.
pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

/// Lowest elf attack power the calibration sweep tries by default.
pub const DEFAULT_CALIBRATION_START_POWER: u32 = 3;

/// Highest elf attack power the calibration sweep tries by default.
pub const DEFAULT_CALIBRATION_MAX_POWER: u32 = 200;

/// Parameters for a single combat run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombatConfig {
    /// Attack power every elf fights with.
    pub elf_attack_power: u32,
    /// Stop as soon as any elf dies.
    pub require_no_elf_losses: bool,
    /// Completed rounds after which the run is abandoned.
    pub max_rounds: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            elf_attack_power: DEFAULT_ELF_ATTACK_POWER,
            require_no_elf_losses: false,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Bounds of the sweep that searches for the weakest flawless elf army.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    /// First attack power tried.
    pub start_power: u32,
    /// Last attack power tried before giving up.
    pub max_power: u32,
    /// Round limit applied to every attempt.
    pub max_rounds: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            start_power: DEFAULT_CALIBRATION_START_POWER,
            max_power: DEFAULT_CALIBRATION_MAX_POWER,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl CalibrationConfig {
    /// Combat parameters for one attempt of the sweep.
    #[must_use]
    pub fn attempt(&self, elf_attack_power: u32) -> CombatConfig {
        CombatConfig {
            elf_attack_power,
            require_no_elf_losses: true,
            max_rounds: self.max_rounds,
        }
    }
}

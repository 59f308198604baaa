#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure calculations that turn the final unit roster into a combat report.

use cavern_skirmish_core::{CombatReport, Faction, UnitView};

/// Multiplies the completed rounds by the surviving hit point total.
#[must_use]
pub fn score(completed_rounds: u32, surviving_hit_points: u32) -> u64 {
    u64::from(completed_rounds) * u64::from(surviving_hit_points)
}

/// Sums the hit points of every living unit.
#[must_use]
pub fn surviving_hit_points(units: &UnitView) -> u32 {
    units
        .living()
        .fold(0_u32, |total, unit| total.saturating_add(unit.hit_points))
}

/// Faction that still has living units once the other one was wiped out.
///
/// Returns `None` while both factions are represented or when nobody is left.
#[must_use]
pub fn surviving_faction(units: &UnitView) -> Option<Faction> {
    match (units.has_living(Faction::Elf), units.has_living(Faction::Goblin)) {
        (true, false) => Some(Faction::Elf),
        (false, true) => Some(Faction::Goblin),
        _ => None,
    }
}

/// Builds the report published when combat stops.
#[must_use]
pub fn report(
    completed_rounds: u32,
    units: &UnitView,
    elf_died: bool,
    elf_attack_power: u32,
) -> CombatReport {
    let surviving_hit_point_total = surviving_hit_points(units);
    CombatReport {
        completed_rounds,
        surviving_faction: surviving_faction(units),
        surviving_hit_point_total,
        outcome_score: score(completed_rounds, surviving_hit_point_total),
        elf_died,
        elf_attack_power,
    }
}

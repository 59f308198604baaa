use cavern_skirmish_core::Faction;
use cavern_skirmish_system_combat::{
    calibrate_elf_attack_power, run_combat, CalibrationConfig, CombatConfig,
};

const MIXED_SKIRMISH: &str = "\
#######
#.G...#
#...EG#
#.#.#G#
#..G#E#
#.....#
#######
";

const ELVES_HOLD: &str = "\
#######
#G..#E#
#E#E.E#
#G.##.#
#...#E#
#...E.#
#######
";

const CROWDED_ELVES: &str = "\
#######
#E..EG#
#.#G.E#
#E.##E#
#G..#.#
#..E#.#
#######
";

const GOBLIN_COLUMN: &str = "\
#######
#E.G#.#
#.#G..#
#G.#.G#
#G..#.#
#...E.#
#######
";

const WALLED_CORRIDORS: &str = "\
#######
#.E...#
#.#..G#
#.###.#
#E#G#G#
#...#G#
#######
";

const OPEN_HALL: &str = "\
#########
#G......#
#.E.#...#
#..##..G#
#...##..#
#...#...#
#.G...G.#
#.....G.#
#########
";

fn assert_outcome(grid: &str, rounds: u32, hit_points: u32, faction: Faction) {
    let report = run_combat(grid, &CombatConfig::default()).expect("combat finishes");

    assert_eq!(report.completed_rounds, rounds);
    assert_eq!(report.surviving_hit_point_total, hit_points);
    assert_eq!(report.surviving_faction, Some(faction));
    assert_eq!(report.outcome_score, u64::from(rounds) * u64::from(hit_points));
}

#[test]
fn mixed_skirmish_ends_with_goblins_standing() {
    assert_outcome(MIXED_SKIRMISH, 47, 590, Faction::Goblin);
}

#[test]
fn elves_hold_their_ground() {
    assert_outcome(ELVES_HOLD, 37, 982, Faction::Elf);
}

#[test]
fn crowded_elves_win_after_46_rounds() {
    assert_outcome(CROWDED_ELVES, 46, 859, Faction::Elf);
}

#[test]
fn goblin_column_overwhelms_the_elves() {
    assert_outcome(GOBLIN_COLUMN, 35, 793, Faction::Goblin);
}

#[test]
fn walled_corridors_favour_the_goblins() {
    assert_outcome(WALLED_CORRIDORS, 54, 536, Faction::Goblin);
}

#[test]
fn open_hall_favours_the_goblins() {
    assert_outcome(OPEN_HALL, 20, 937, Faction::Goblin);
}

#[test]
fn calibration_finds_the_weakest_flawless_power() {
    let cases = [
        (MIXED_SKIRMISH, 15, 4_988),
        (ELVES_HOLD, 4, 29_064),
        (CROWDED_ELVES, 4, 31_284),
        (GOBLIN_COLUMN, 15, 3_478),
        (WALLED_CORRIDORS, 12, 6_474),
        (OPEN_HALL, 34, 1_140),
    ];

    for (grid, power, outcome) in cases {
        let calibration =
            calibrate_elf_attack_power(grid, &CalibrationConfig::default()).expect("calibrates");

        assert_eq!(calibration.elf_attack_power, power);
        assert_eq!(calibration.report.elf_attack_power, power);
        assert_eq!(calibration.report.outcome_score, outcome);
        assert_eq!(calibration.report.surviving_faction, Some(Faction::Elf));
        assert!(!calibration.report.elf_died);
    }
}

#[test]
fn calibration_respects_the_start_power() {
    let config = CalibrationConfig {
        start_power: 20,
        ..CalibrationConfig::default()
    };

    let calibration = calibrate_elf_attack_power(MIXED_SKIRMISH, &config).expect("calibrates");

    assert_eq!(calibration.elf_attack_power, 20);
    assert!(!calibration.report.elf_died);
}

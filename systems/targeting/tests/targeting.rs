use cavern_skirmish_core::{Action, CellCoord, UnitId};
use cavern_skirmish_system_targeting::{select_attack, TargetSelector};
use cavern_skirmish_world::{query, World};

fn select_for(world: &World, unit: u32) -> Action {
    let mut selector = TargetSelector::new();
    selector
        .select(
            UnitId::new(unit),
            query::cavern(world),
            query::occupancy_view(world),
            &query::unit_view(world),
        )
        .expect("consistent world")
}

#[test]
fn equidistant_cells_in_one_row_prefer_the_left_column() {
    let world = World::from_grid_text("#######\n#G.E.G#\n#######", 3).expect("valid grid");

    assert_eq!(
        select_for(&world, 1),
        Action::Move {
            to: CellCoord::new(2, 1),
        }
    );
}

#[test]
fn equidistant_cells_in_different_rows_prefer_the_upper_row() {
    let world = World::from_grid_text(
        "#####\n#.G.#\n#...#\n#.E.#\n#...#\n#.G.#\n#####",
        3,
    )
    .expect("valid grid");

    assert_eq!(
        select_for(&world, 1),
        Action::Move {
            to: CellCoord::new(2, 2),
        }
    );
}

#[test]
fn chosen_cell_decides_the_direction_of_the_first_step() {
    // Four in-range cells sit three steps away; (1,2) comes first in reading
    // order, so the elf heads left rather than toward the goblin on the right.
    let world = World::from_grid_text(
        "#######\n#..E..#\n#.....#\n#G...G#\n#######",
        3,
    )
    .expect("valid grid");

    assert_eq!(
        select_for(&world, 0),
        Action::Move {
            to: CellCoord::new(2, 1),
        }
    );
}

#[test]
fn adjacent_enemy_is_attacked_instead_of_moving() {
    let world = World::from_grid_text("######\n#.EG.#\n#..G.#\n######", 3).expect("valid grid");

    assert_eq!(
        select_for(&world, 0),
        Action::Attack {
            target: UnitId::new(1),
        }
    );

    let view = query::unit_view(&world);
    let elf = view.get(UnitId::new(0)).expect("elf");
    assert_eq!(
        select_attack(elf, query::cavern(&world), query::occupancy_view(&world), &view),
        Some(UnitId::new(1))
    );
}

#[test]
fn allies_blocking_the_corridor_are_routed_around() {
    let world = World::from_grid_text(
        "#######\n#E.EG.#\n#.###.#\n#.....#\n#######",
        3,
    )
    .expect("valid grid");

    assert_eq!(
        select_for(&world, 0),
        Action::Move {
            to: CellCoord::new(1, 2),
        }
    );
}

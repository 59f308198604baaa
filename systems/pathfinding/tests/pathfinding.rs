use cavern_skirmish_core::{CellCoord, UnitId};
use cavern_skirmish_system_pathfinding::PathFinder;
use cavern_skirmish_world::{query, Cavern, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn occupied_cells_block_the_search_but_not_the_source() {
    let world = World::from_grid_text("#######\n#E.G..#\n#######", 3).expect("valid grid");
    let cavern = query::cavern(&world);
    let occupancy = query::occupancy_view(&world);
    let mut finder = PathFinder::new();

    let field = finder
        .shortest_distances(cavern, occupancy, CellCoord::new(1, 1))
        .expect("open source");

    assert_eq!(field.distance(CellCoord::new(1, 1)), Some(0));
    assert_eq!(field.distance(CellCoord::new(2, 1)), Some(1));
    assert_eq!(field.distance(CellCoord::new(3, 1)), None);
    assert_eq!(field.distance(CellCoord::new(4, 1)), None);
}

#[test]
fn distances_are_symmetric_on_random_caverns() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x15_2018);
    let mut forward = PathFinder::new();
    let mut backward = PathFinder::new();

    for _ in 0..24 {
        let text = random_cavern(&mut rng, 9, 7);
        let parsed = Cavern::parse(&text).expect("generated grid is valid");
        let cavern = &parsed.cavern;
        let cells: Vec<Option<UnitId>> = vec![None; (cavern.columns() * cavern.rows()) as usize];
        let occupancy = cavern_skirmish_core::OccupancyView::new(
            &cells,
            cavern.columns(),
            cavern.rows(),
        );
        let open: Vec<CellCoord> = cavern.open_cells().collect();

        for &a in &open {
            let from_a: Vec<(CellCoord, u32)> = forward
                .shortest_distances(cavern, occupancy, a)
                .expect("open source")
                .reachable()
                .collect();

            for (b, distance) in from_a {
                let back = backward
                    .shortest_distances(cavern, occupancy, b)
                    .expect("open source")
                    .distance(a);
                assert_eq!(back, Some(distance), "asymmetric distance between {a:?} and {b:?}");
            }
        }
    }
}

#[test]
fn distances_never_undercut_manhattan_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut finder = PathFinder::new();

    for _ in 0..16 {
        let text = random_cavern(&mut rng, 12, 8);
        let parsed = Cavern::parse(&text).expect("generated grid is valid");
        let cavern = &parsed.cavern;
        let cells: Vec<Option<UnitId>> = vec![None; (cavern.columns() * cavern.rows()) as usize];
        let occupancy = cavern_skirmish_core::OccupancyView::new(
            &cells,
            cavern.columns(),
            cavern.rows(),
        );

        let Some(source) = cavern.open_cells().next() else {
            continue;
        };
        let field = finder
            .shortest_distances(cavern, occupancy, source)
            .expect("open source");

        for (cell, distance) in field.reachable() {
            assert!(distance >= source.manhattan_distance(cell));
            assert!(cavern.is_open(cell));
        }
    }
}

fn random_cavern(rng: &mut ChaCha8Rng, columns: u32, rows: u32) -> String {
    let mut text = String::new();
    for row in 0..rows {
        for column in 0..columns {
            let border = row == 0 || column == 0 || row == rows - 1 || column == columns - 1;
            let wall = border || rng.gen_bool(0.3);
            text.push(if wall { '#' } else { '.' });
        }
        text.push('\n');
    }
    text
}

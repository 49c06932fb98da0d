use path_defence_core::{ArenaBalance, PathPolicy};
use path_defence_system_path_generation::PathGeneration;
use proptest::prelude::*;

fn winding(arena: ArenaBalance, turn_probability: f64) -> PathGeneration {
    PathGeneration::new(arena, PathPolicy::Branching { turn_probability })
}

fn arena_strategy() -> impl Strategy<Value = ArenaBalance> {
    (2u32..30, 1u32..20).prop_map(|(columns, rows)| ArenaBalance {
        width: columns as f32 * 40.0,
        height: rows as f32 * 40.0,
        cell_size: 40.0,
    })
}

proptest! {
    #[test]
    fn winding_path_advances_left_to_right(
        arena in arena_strategy(),
        turn_probability in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let path = winding(arena, turn_probability)
            .generate(seed)
            .expect("valid arena");
        let waypoints = path.waypoints();

        prop_assert!((path.spawn().x() - 0.0).abs() < f32::EPSILON);
        prop_assert!((path.base().x() - arena.width).abs() < f32::EPSILON);
        prop_assert!(waypoints.len() <= arena.columns() as usize * 2 + 2);

        for segment in waypoints.windows(2) {
            let (from, to) = (segment[0], segment[1]);
            prop_assert!(to.x() >= from.x(), "x must never decrease");
            let horizontal = (from.y() - to.y()).abs() < f32::EPSILON;
            let vertical = (from.x() - to.x()).abs() < f32::EPSILON;
            prop_assert!(horizontal || vertical, "segments are axis aligned");
        }

        for point in waypoints {
            prop_assert!(point.y() > 0.0 && point.y() < arena.height);
        }
    }

    #[test]
    fn same_seed_yields_same_path(
        arena in arena_strategy(),
        turn_probability in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let generator = winding(arena, turn_probability);
        prop_assert_eq!(generator.generate(seed), generator.generate(seed));
    }
}

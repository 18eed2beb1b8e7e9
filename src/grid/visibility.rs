//! Line of sight over elevation and intervening terrain
//!
//! A sight line is traced with [`HexCoord::line_to`]; each ambiguous step is
//! settled by the configured [`AmbiguityPolicy`]. The endpoints never block
//! their own line. Every hex between them is checked against the ceiling
//! interpolated between the endpoints, and their obstruction is summed
//! against the configured threshold.

use crate::core::config::AmbiguityPolicy;
use crate::grid::hex::{HexCoord, LineStep};
use crate::grid::map::Grid;

/// Obstruction of a coordinate; absent hexes obstruct nothing
fn obstruction(grid: &Grid, coord: HexCoord) -> u32 {
    grid.get_hex(coord).map_or(0, |hex| hex.intervening_factor())
}

fn ceiling(grid: &Grid, coord: HexCoord) -> i32 {
    grid.get_hex(coord).map_or(0, |hex| hex.ceiling())
}

/// Pick one hex of an ambiguous step. The first option wins ties.
fn resolve_ambiguous(grid: &Grid, first: HexCoord, second: HexCoord) -> HexCoord {
    let (a, b) = (obstruction(grid, first), obstruction(grid, second));
    let take_second = match grid.config().ambiguity_policy {
        AmbiguityPolicy::MostObstructed => b > a,
        AmbiguityPolicy::LeastObstructed => b < a,
    };
    if take_second {
        second
    } else {
        first
    }
}

/// The sight line from `from` to `to` with every ambiguous step settled,
/// endpoints included
pub fn resolve_sight_line(grid: &Grid, from: HexCoord, to: HexCoord) -> Vec<HexCoord> {
    from.line_to(&to)
        .into_iter()
        .map(|step| match step {
            LineStep::Unambiguous(coord) => coord,
            LineStep::Ambiguous(first, second) => resolve_ambiguous(grid, first, second),
        })
        .collect()
}

/// The hexes strictly between the endpoints of a resolved line
pub fn intervening(line: &[HexCoord]) -> &[HexCoord] {
    if line.len() <= 2 {
        return &[];
    }
    &line[1..line.len() - 1]
}

/// Expected sight height at step `i` of `n`, rounded half away from zero
fn interpolate(start: i32, end: i32, i: usize, n: usize) -> i32 {
    let t = i as f64 / n as f64;
    (f64::from(start) + f64::from(end - start) * t).round() as i32
}

/// Check a resolved line for blocking elevation or accumulated terrain
pub fn is_line_clear(grid: &Grid, line: &[HexCoord]) -> bool {
    let (Some(&first), Some(&last)) = (line.first(), line.last()) else {
        return true;
    };
    let n = line.len() - 1;
    let (start_ceiling, end_ceiling) = (ceiling(grid, first), ceiling(grid, last));
    let threshold = grid.config().sight_obstruction_threshold;

    let mut accumulated = 0;
    for (i, coord) in line.iter().enumerate().take(n).skip(1) {
        let Some(hex) = grid.get_hex(*coord) else {
            continue;
        };

        let expected = interpolate(start_ceiling, end_ceiling, i, n);
        if hex.level > expected {
            tracing::trace!("Sight {} -> {} blocked by level at {}", first, last, coord);
            return false;
        }

        accumulated += hex.intervening_factor();
        if accumulated >= threshold {
            tracing::trace!("Sight {} -> {} blocked by terrain at {}", first, last, coord);
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::grid::map::Hex;
    use crate::grid::terrain::Terrain;

    fn coord(q: i32, r: i32) -> HexCoord {
        HexCoord::new(q, r)
    }

    #[test]
    fn test_interpolate_rounding() {
        assert_eq!(interpolate(0, 0, 1, 2), 0);
        assert_eq!(interpolate(0, 3, 1, 2), 2); // 1.5 rounds up
        assert_eq!(interpolate(0, -3, 1, 2), -2); // away from zero
        assert_eq!(interpolate(2, 5, 2, 3), 4);
    }

    #[test]
    fn test_intervening_excludes_endpoints() {
        let line = vec![coord(1, 1), coord(2, 1), coord(3, 1)];
        assert_eq!(intervening(&line), &[coord(2, 1)]);
        assert!(intervening(&line[..2]).is_empty());
        assert!(intervening(&[]).is_empty());
    }

    #[test]
    fn test_flat_open_line_is_clear() {
        let grid = Grid::filled(8, 8);
        let line = resolve_sight_line(&grid, coord(1, 1), coord(7, 4));
        assert!(is_line_clear(&grid, &line));
    }

    #[test]
    fn test_level_blocks() {
        let mut grid = Grid::filled(5, 5);
        grid.set_level(coord(2, 1), 5).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 1));
        assert!(!is_line_clear(&grid, &line));
    }

    #[test]
    fn test_high_endpoints_see_over_a_rise() {
        let mut grid = Grid::filled(5, 5);
        grid.set_level(coord(1, 1), 2).unwrap();
        grid.set_level(coord(2, 1), 2).unwrap();
        grid.set_level(coord(3, 1), 2).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 1));
        assert!(is_line_clear(&grid, &line));
    }

    #[test]
    fn test_terrain_accumulates_to_threshold() {
        let mut grid = Grid::filled(6, 6);
        grid.add_terrain(coord(2, 1), Terrain::LightWoods).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(5, 1));
        assert!(is_line_clear(&grid, &line));

        grid.add_terrain(coord(3, 1), Terrain::HeavyWoods).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(5, 1));
        assert!(!is_line_clear(&grid, &line));
    }

    #[test]
    fn test_endpoint_terrain_never_blocks() {
        let mut grid = Grid::filled(5, 5);
        grid.add_terrain(coord(1, 1), Terrain::Building).unwrap();
        grid.add_terrain(coord(3, 1), Terrain::Building).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 1));
        assert!(is_line_clear(&grid, &line));
    }

    #[test]
    fn test_absent_hexes_are_skipped() {
        let mut grid = Grid::new(5, 5);
        grid.add_hex(Hex::new(coord(1, 1))).unwrap();
        grid.add_hex(Hex::new(coord(4, 1))).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(4, 1));
        assert_eq!(line.len(), 4);
        assert!(is_line_clear(&grid, &line));
    }

    #[test]
    fn test_ambiguity_takes_most_obstructed() {
        let mut grid = Grid::filled(5, 5);
        grid.add_terrain(coord(2, 1), Terrain::HeavyWoods).unwrap();

        // (1,1) -> (3,3) runs along the edge of (1,2) and (2,1)
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 3));
        assert_eq!(line[1], coord(2, 1));

        grid.add_terrain(coord(1, 2), Terrain::Building).unwrap();
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 3));
        assert_eq!(line[1], coord(1, 2));
    }

    #[test]
    fn test_ambiguity_tie_takes_first_option() {
        let grid = Grid::filled(5, 5);
        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 3));
        assert_eq!(line, vec![coord(1, 1), coord(1, 2), coord(2, 2), coord(2, 3), coord(3, 3)]);
    }

    #[test]
    fn test_least_obstructed_policy() {
        let config = EngineConfig {
            ambiguity_policy: AmbiguityPolicy::LeastObstructed,
            ..EngineConfig::default()
        };
        let mut grid = Grid::with_config(5, 5, config).unwrap();
        for q in 1..=5 {
            for r in 1..=5 {
                grid.add_hex(Hex::new(coord(q, r))).unwrap();
            }
        }
        grid.add_terrain(coord(1, 2), Terrain::Building).unwrap();

        let line = resolve_sight_line(&grid, coord(1, 1), coord(3, 3));
        assert_eq!(line[1], coord(2, 1));
        assert!(is_line_clear(&grid, &line));
    }
}

//! Hex Probe
//!
//! Loads a map file and answers one movement or sight query, printing JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use hex_tactics::core::error::Result;
use hex_tactics::core::EngineConfig;
use hex_tactics::grid::{Facing, Grid, HexCoord, HexCoordSet, MapFile, MovementMode, OrientedPosition};
use serde::Serialize;

/// Hex Probe - query paths, reach and line of sight on a map file
#[derive(Parser, Debug)]
#[command(name = "hexprobe")]
#[command(about = "Run movement and line-of-sight queries against a hex map")]
struct Cli {
    /// Map file (.json or .toml)
    #[arg(long)]
    map: std::path::PathBuf,

    /// Engine config (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    query: Query,
}

#[derive(Subcommand, Debug)]
enum Query {
    /// Cheapest path between two positions
    Path(MoveArgs),
    /// Path covering the most hexes within the budget
    Longest(MoveArgs),
    /// Every hex reachable within the budget
    Reach {
        /// Start position as q,r,facing (facing 0-5)
        #[arg(long, value_parser = parse_position)]
        from: OrientedPosition,

        #[arg(long, value_enum, default_value_t = Mode::Walk)]
        mode: Mode,

        #[arg(long)]
        budget: u32,

        /// Occupied hex as q,r (repeatable)
        #[arg(long, value_parser = parse_coord)]
        prohibit: Vec<HexCoord>,
    },
    /// Line of sight between two hexes
    Sight {
        #[arg(long, value_parser = parse_coord)]
        from: HexCoord,

        #[arg(long, value_parser = parse_coord)]
        to: HexCoord,
    },
}

#[derive(Args, Debug)]
struct MoveArgs {
    /// Start position as q,r,facing (facing 0-5)
    #[arg(long, value_parser = parse_position)]
    from: OrientedPosition,

    /// Target position as q,r,facing (facing 0-5)
    #[arg(long, value_parser = parse_position)]
    to: OrientedPosition,

    #[arg(long, value_enum, default_value_t = Mode::Walk)]
    mode: Mode,

    #[arg(long)]
    budget: u32,

    /// Occupied hex as q,r (repeatable)
    #[arg(long, value_parser = parse_coord)]
    prohibit: Vec<HexCoord>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Walk,
    Run,
    Jump,
}

impl From<Mode> for MovementMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Walk => MovementMode::Walk,
            Mode::Run => MovementMode::Run,
            Mode::Jump => MovementMode::Jump,
        }
    }
}

fn parse_numbers(s: &str) -> std::result::Result<Vec<i32>, String> {
    s.split(',')
        .map(|part| part.trim().parse::<i32>().map_err(|e| format!("'{}': {}", part, e)))
        .collect()
}

fn parse_coord(s: &str) -> std::result::Result<HexCoord, String> {
    match parse_numbers(s)?.as_slice() {
        [q, r] => Ok(HexCoord::new(*q, *r)),
        _ => Err(format!("expected q,r but got '{}'", s)),
    }
}

fn parse_position(s: &str) -> std::result::Result<OrientedPosition, String> {
    match parse_numbers(s)?.as_slice() {
        [q, r, facing] if (0..6).contains(facing) => {
            Ok(OrientedPosition::new(HexCoord::new(*q, *r), Facing::from_index(*facing)))
        }
        _ => Err(format!("expected q,r,facing with facing 0-5 but got '{}'", s)),
    }
}

#[derive(Serialize)]
struct ReachEntry {
    coordinate: HexCoord,
    cost: u32,
}

#[derive(Serialize)]
struct SightResult {
    visible: bool,
    intervening: Vec<HexCoord>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_move(grid: &Grid, args: &MoveArgs, longest: bool) -> Result<()> {
    let prohibited: HexCoordSet = args.prohibit.iter().copied().collect();
    let mode = MovementMode::from(args.mode);
    let path = if longest {
        grid.find_longest_path(args.from, args.to, mode, args.budget, &prohibited)?
    } else {
        grid.find_path(args.from, args.to, mode, args.budget, &prohibited)?
    };

    match path {
        Some(path) => {
            tracing::info!(
                "Path found: cost {}, {} hexes, {} turns",
                path.cost(),
                path.hexes_traveled(),
                path.turn_count()
            );
            print_json(&path.export())
        }
        None => {
            tracing::info!("No path within budget {}", args.budget);
            print_json(&serde_json::Value::Null)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let grid = MapFile::load(&cli.map)?.into_grid(config)?;
    tracing::info!("Loaded {}x{} map with {} hexes", grid.width(), grid.height(), grid.len());

    match &cli.query {
        Query::Path(args) => run_move(&grid, args, false),
        Query::Longest(args) => run_move(&grid, args, true),
        Query::Reach {
            from,
            mode,
            budget,
            prohibit,
        } => {
            let prohibited: HexCoordSet = prohibit.iter().copied().collect();
            let reached: Vec<ReachEntry> = grid
                .reachable(*from, MovementMode::from(*mode), *budget, &prohibited)
                .into_iter()
                .map(|(coordinate, cost)| ReachEntry { coordinate, cost })
                .collect();
            print_json(&reached)
        }
        Query::Sight { from, to } => {
            let result = SightResult {
                visible: grid.has_line_of_sight(*from, *to),
                intervening: grid.hexes_along_sight(*from, *to).iter().map(|h| h.coord).collect(),
            };
            print_json(&result)
        }
    }
}

//! # Warren Preview Tool
//!
//! Builds one floor from command-line parameters or a JSON configuration
//! file and prints it as ASCII, for eyeballing generator output.

use clap::Parser;
use log::info;
use std::fs;
use warren::{
    config::{FLOOR_HEIGHT, FLOOR_WIDTH},
    generation::utils,
    FloorData, FloorFactory, GeneratedFloor, Position, Structure, TileKind, WarrenResult,
};

/// Command line arguments for the floor preview tool.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Seed-deterministic roguelike floor generation preview")]
#[command(version)]
struct Args {
    /// Random seed for floor generation
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Structure template, e.g. medium-large, small, ring, cross, beetle
    #[arg(long, default_value = "medium-large")]
    structure: Structure,

    /// Path to a JSON FloorData file; overrides --structure
    #[arg(long)]
    config: Option<String>,

    /// Party members to place, leader included
    #[arg(long, default_value_t = 4)]
    party_size: usize,

    /// Number of floors to generate from consecutive seeds
    #[arg(long, default_value_t = 1)]
    count: u64,
}

fn main() -> WarrenResult<()> {
    env_logger::init();
    let args = Args::parse();

    let data = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => FloorData::new(args.structure),
    };

    info!("generating {} floor(s) from seed {}", args.count, args.seed);
    let factory = FloorFactory::new();
    for seed in args.seed..args.seed + args.count {
        let mut rng = utils::create_rng(seed);
        let generated = factory.build(&data, args.party_size, &mut rng)?;
        println!("seed {seed} ({:?})", data.structure);
        print_floor(&generated);
        println!();
    }
    Ok(())
}

fn print_floor(generated: &GeneratedFloor) {
    let floor = &generated.floor;
    let spawns = &generated.spawns;

    for y in 0..FLOOR_HEIGHT {
        let mut row = String::with_capacity(FLOOR_WIDTH as usize);
        for x in 0..FLOOR_WIDTH {
            let pos = Position::new(x, y);
            row.push(glyph(generated, pos, floor.kind(pos)));
        }
        println!("{row}");
    }
    println!(
        "rooms: {}  traps: {}  items: {}  enemies: {}  stairs: ({}, {})",
        floor.room_exits.len(),
        spawns.traps.len(),
        spawns.items.len() + spawns.buried_items.len(),
        spawns.enemies.len(),
        spawns.stairs.x,
        spawns.stairs.y,
    );
}

fn glyph(generated: &GeneratedFloor, pos: Position, kind: TileKind) -> char {
    let spawns = &generated.spawns;
    if spawns.party.first() == Some(&pos) {
        return '@';
    }
    if spawns.party.contains(&pos) {
        return 'a';
    }
    if spawns.enemies.iter().any(|enemy| enemy.pos == pos) {
        return 'E';
    }
    if pos == spawns.stairs {
        return '>';
    }
    if spawns.traps.iter().any(|&(trap_pos, _)| trap_pos == pos) {
        return '^';
    }
    if spawns.items.contains(&pos) {
        return '$';
    }
    match kind {
        TileKind::Wall => '#',
        TileKind::Secondary => '~',
        TileKind::Ground => '.',
    }
}

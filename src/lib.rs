//! # Warren
//!
//! Seed-deterministic procedural generation of single dungeon floors for a
//! tile-based roguelike.
//!
//! ## Architecture Overview
//!
//! One floor build is one synchronous call chain driven by an injected,
//! seeded random source:
//!
//! - **Floor Model**: the fixed-size mutable tile grid and per-tile state
//! - **Grid/Cell**: a transient geometric partition used only during generation
//! - **Structure Templates**: per-topology grid sizing and forced wiring
//! - **Layout Passes**: room placement, hallway carving, merging, extra hallways
//! - **Secondary Terrain**: organic river and lake growth over wall tiles
//! - **Validation**: cell-graph reachability, with full regeneration on failure
//! - **Spawner**: stairs, traps, items, and character placement
//!
//! The library owns no ambient state: generators take [`FloorData`] and a
//! `&mut StdRng` as plain arguments, and identical configuration plus an
//! identical seed always reproduce an identical floor.

pub mod floor;
pub mod generation;

// Core module re-exports
pub use floor::*;
pub use generation::*;

/// Core error type for the Warren generator.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// FloorData cannot be generated from as given
    #[error("Invalid floor configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Floor geometry constants.
pub mod config {
    /// Floor width in tiles
    pub const FLOOR_WIDTH: i32 = 56;

    /// Floor height in tiles
    pub const FLOOR_HEIGHT: i32 = 32;

    /// Full regeneration attempts before a build is abandoned
    pub const MAX_BUILD_ATTEMPTS: u32 = 10;

    /// Margin kept clear of secondary terrain on every floor edge
    pub const SECONDARY_MARGIN: i32 = 2;
}

//! Top-level floor build orchestration.
//!
//! [`FloorFactory`] composes the grid plan, the layout passes, secondary
//! terrain, validation, finalization, and the spawner into one call. A
//! build attempt that fails validation is discarded completely and retried
//! with fresh randomness from the same stream; there is no partial retry.

use crate::config::MAX_BUILD_ATTEMPTS;
use crate::generation::{layout, spawner, terrain, validate};
use crate::generation::grid::Grid;
use crate::{FloorData, Floor, Spawns, WarrenError, WarrenResult};
use log::{debug, warn};
use rand::rngs::StdRng;

/// A finished, validated floor with everything placed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFloor {
    pub floor: Floor,
    pub spawns: Spawns,
}

/// Builds complete floors from [`FloorData`] and a seeded random source.
///
/// # Examples
///
/// ```
/// use warren::{generation::utils, FloorData, FloorFactory, Structure};
///
/// let data = FloorData::new(Structure::MediumLarge);
/// let mut rng = utils::create_rng(42);
/// let generated = FloorFactory::new().build(&data, 4, &mut rng).unwrap();
/// assert!(generated.floor.is_walkable(generated.spawns.stairs));
/// ```
#[derive(Debug, Clone)]
pub struct FloorFactory {
    max_attempts: u32,
}

impl Default for FloorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorFactory {
    /// Creates a factory with the default regeneration bound.
    pub fn new() -> Self {
        Self { max_attempts: MAX_BUILD_ATTEMPTS }
    }

    /// Creates a factory with a custom regeneration bound.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Builds one floor.
    ///
    /// Structurally invalid attempts are discarded and retried up to the
    /// attempt bound; configurations that can never generate fail fast
    /// with [`WarrenError::InvalidConfig`].
    pub fn build(
        &self,
        data: &FloorData,
        party_size: usize,
        rng: &mut StdRng,
    ) -> WarrenResult<GeneratedFloor> {
        validate_config(data)?;

        for attempt in 1..=self.max_attempts {
            if let Some(generated) = self.try_build(data, party_size, rng)? {
                debug!("floor built on attempt {attempt} ({:?})", data.structure);
                return Ok(generated);
            }
            warn!(
                "floor failed validation, regenerating (attempt {attempt}/{})",
                self.max_attempts
            );
        }
        Err(WarrenError::GenerationFailed(format!(
            "no valid floor for {:?} after {} attempts",
            data.structure, self.max_attempts
        )))
    }

    /// One full generation attempt. `Ok(None)` means the attempt was
    /// structurally invalid and should be retried.
    fn try_build(
        &self,
        data: &FloorData,
        party_size: usize,
        rng: &mut StdRng,
    ) -> WarrenResult<Option<GeneratedFloor>> {
        let plan = data.structure.plan(rng).ok_or_else(|| {
            WarrenError::InvalidConfig(format!(
                "structure {:?} cannot generate a playable floor",
                data.structure
            ))
        })?;

        let mut floor = Floor::new();
        let mut grid = match plan.boundaries {
            Some((xs, ys)) => Grid::with_boundaries(xs, ys, plan.playable_width),
            None => Grid::new(plan.grid_w, plan.grid_h, plan.playable_width),
        };
        for &(gx, gy) in &plan.invalid_cells {
            grid.cell_mut(gx, gy).valid = false;
        }

        if plan.forced_rooms.is_empty() {
            layout::assign_rooms(&mut grid, data, rng);
        } else {
            for &(gx, gy) in &plan.forced_rooms {
                grid.cell_mut(gx, gy).is_room = true;
            }
        }
        layout::create_rooms(&mut floor, &mut grid, data, rng);

        for &(gx, gy, direction) in &plan.forced_connections {
            grid.connect(gx, gy, direction);
        }
        if plan.run_connect_walk {
            layout::connect_cells(&mut grid, data, rng);
        }
        layout::create_hallways(&mut floor, &grid, rng);

        if plan.run_merge_join {
            layout::merge_rooms(&mut floor, &mut grid, rng);
            layout::join_isolated_rooms(&mut floor, &mut grid, rng);
        }
        if !plan.forced_merge.is_empty() {
            layout::merge_forced(&mut floor, &mut grid, &plan.forced_merge);
        }
        layout::create_extra_hallways(&mut floor, &grid, data, rng);

        if data.secondary_used {
            terrain::generate_secondary(&mut floor, data, rng);
        }

        if !validate::validate_connectivity(&grid) {
            return Ok(None);
        }

        floor.finalize_rooms();
        let Some(spawns) = spawner::place_spawns(&mut floor, data, party_size, rng) else {
            return Ok(None);
        };
        floor.update_tile_masks();

        Ok(Some(GeneratedFloor { floor, spawns }))
    }
}

/// Builds one floor from a numeric seed; the plain-function entry point.
pub fn generate_floor(
    data: &FloorData,
    seed: u64,
    party_size: usize,
) -> WarrenResult<GeneratedFloor> {
    let mut rng = super::utils::create_rng(seed);
    FloorFactory::new().build(data, party_size, &mut rng)
}

/// Rejects configurations that could never produce a floor, before any
/// randomness is consumed.
fn validate_config(data: &FloorData) -> WarrenResult<()> {
    if !data.structure.is_generable() {
        return Err(WarrenError::InvalidConfig(format!(
            "structure {:?} cannot generate a playable floor",
            data.structure
        )));
    }
    let trap_weight: u32 = data.trap_table.iter().map(|entry| entry.weight).sum();
    if data.trap_density > 0 && trap_weight == 0 {
        return Err(WarrenError::InvalidConfig(
            "trap density requires a weighted trap table".to_string(),
        ));
    }
    let monster_weight: u32 = data.monster_table.iter().map(|entry| entry.weight).sum();
    if data.initial_enemy_density > 0 && monster_weight == 0 {
        return Err(WarrenError::InvalidConfig(
            "enemy density requires a weighted monster table".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::Structure;

    #[test]
    fn test_build_produces_a_floor_with_stairs() {
        let data = FloorData::for_testing(Structure::MediumLarge);
        let mut rng = utils::create_rng(1234);
        let generated = FloorFactory::new().build(&data, 4, &mut rng).unwrap();

        assert!(generated.floor.tile(generated.spawns.stairs).unwrap().stairs);
        assert_eq!(generated.floor.stairs, generated.spawns.stairs);
        assert_eq!(generated.spawns.party.len(), 4);
    }

    #[test]
    fn test_generate_floor_matches_factory_output() {
        let data = FloorData::for_testing(Structure::SmallMedium);
        let from_helper = generate_floor(&data, 77, 2).unwrap();
        let mut rng = utils::create_rng(77);
        let from_factory = FloorFactory::new().build(&data, 2, &mut rng).unwrap();
        assert_eq!(from_helper, from_factory);
    }

    #[test]
    fn test_unimplemented_structures_fail_fast() {
        let data = FloorData::for_testing(Structure::SingleMonsterHouse);
        let result = generate_floor(&data, 5, 4);
        assert!(matches!(result, Err(WarrenError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_weight_tables_are_rejected() {
        let mut data = FloorData::for_testing(Structure::MediumLarge);
        for entry in &mut data.trap_table {
            entry.weight = 0;
        }
        let result = generate_floor(&data, 5, 4);
        assert!(matches!(result, Err(WarrenError::InvalidConfig(_))));
    }

    #[test]
    fn test_all_generable_structures_build() {
        for structure in [
            Structure::MediumLarge,
            Structure::Small,
            Structure::Ring,
            Structure::Crossroads,
            Structure::Line,
            Structure::Cross,
            Structure::SmallMedium,
            Structure::Beetle,
            Structure::Medium,
            Structure::MediumLarge12,
            Structure::MediumLarge13,
            Structure::MediumLarge14,
            Structure::MediumLarge15,
        ] {
            let data = FloorData::for_testing(structure);
            let generated = generate_floor(&data, 99, 2);
            assert!(generated.is_ok(), "structure {structure:?} failed: {generated:?}");
        }
    }
}

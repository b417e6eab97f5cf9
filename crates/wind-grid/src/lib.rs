//! Grid and interpolation utilities for wind fields.
//!
//! Pure functions shared by the provider adapters (lattice construction), the
//! fusion engine (field assembly and validation) and the particle simulator
//! (bilinear sampling).
//!
//! ## Coordinate conventions
//!
//! Grids are row-major with row 0 at the southern edge and column 0 at the
//! western edge. Spacing is derived from a resolution in kilometres, with the
//! longitude step widened by `1 / cos(avgLat)` so cells stay roughly square on
//! the ground.

pub mod assemble;
pub mod grid;
pub mod interpolate;
pub mod stats;
pub mod validate;

pub use assemble::assemble_field;
pub use grid::{
    coarsen_resolution, generate_grid, grid_dimensions, grid_steps, GridDimensions, GridNode,
    GridSteps, KM_PER_DEGREE,
};
pub use interpolate::{bilinear_interpolate, ScalarGrid, VectorGrid};
pub use stats::{calculate_wind_stats, WindStats};
pub use validate::{validate_field, IssueSeverity, ValidationIssue, ValidationReport};

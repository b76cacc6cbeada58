//! # group-draw: Monte Carlo for Constrained Group Draws
//!
//! Estimates how often each team lands in the same group as a chosen team
//! when a tournament draw must respect per-group confederation quotas.
//!
//! ## Key Features
//!
//! - **Three draw strategies**: sequential first fit, lookahead validation and
//!   uniform rejection sampling with per-pot restart (the default)
//! - **Reproducible**: seeded sequential runs, or rayon-parallel runs with
//!   per-trial seeds that do not depend on the thread count
//! - **Validated rosters**: pot sizes, confederation totals and pre-placements
//!   are checked before any trial runs; rosters load from TOML
//! - **Small analytics**: Shrove Tuesday calendar distribution, Apollo
//!   name/mission correlation, and extreme-value storm return periods
//!
//! ## Quick Start
//!
//! ```rust
//! use group_draw::draw::engine::{run_draw_simulation, DrawConfig};
//! use group_draw::draw::world_cup::world_cup_2018;
//!
//! let roster = world_cup_2018().expect("built-in roster is valid");
//! let config = DrawConfig {
//!     trials: 1_000,
//!     seed: 42,
//!     picked: Some("England".to_string()),
//!     ..Default::default()
//! };
//!
//! let report = run_draw_simulation(&roster, &config).expect("valid configuration");
//! assert_eq!(report.percent_for("England"), Some(100.0));
//! println!("{}", report);
//! ```

// Module declarations
pub mod analytics;
pub mod config;
pub mod draw;
pub mod error;
pub mod logging;
pub mod math_utils;
pub mod rng;

// Re-export commonly used types for convenience
pub use draw::engine::{run_draw_simulation, DrawConfig};
pub use draw::strategy::DrawStrategy;
pub use error::{DrawError, DrawResult};

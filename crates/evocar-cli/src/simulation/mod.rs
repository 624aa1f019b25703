//! A minimal lane-following driving simulation used as the fitness source for training.
//!
//! - [`Track`] - a sine-shaped lane with checkpoints
//! - [`Car`] - a kinematic car steered by an agent's network through ray sensors
//! - [`TrackEvaluator`] - evaluates a whole population on a track

pub use self::{
    car::{Car, SENSOR_COUNT},
    evaluator::TrackEvaluator,
    track::Track,
};

pub mod car;
mod evaluator;
mod track;

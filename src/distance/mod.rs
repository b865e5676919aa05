//! Travel distances between VRPTW locations.
//!
//! Travel time equals distance throughout the crate.

mod matrix;

pub use matrix::DistanceMatrix;

//! Math utilities for the rover.
//!
//! This module provides the wheel geometry used to turn encoder edges into
//! linear speed.

pub mod geometry;

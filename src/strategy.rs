//! Pacing strategies.
//!
//! A strategy shapes effort along the course by scaling each stretch's
//! equivalent factor before course-wide normalization, so any strategy still
//! lands on the plan's total time. Only even effort (`Flat`) is defined; a
//! `Linear` plan runs flat until its blending formula is specified.

use log::warn;

use crate::plan::{PacingStrategyKind, Plan};

/// Where a stretch sits on the course, as fractions of total distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoursePosition {
    pub start_fraction: f64,
    pub end_fraction: f64,
}

/// Shapes relative effort across the course.
pub trait PacingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Multiplier on the stretch's equivalent factor. 1.0 leaves terrain
    /// response unchanged.
    fn effort_multiplier(&self, position: CoursePosition) -> f64;
}

/// Even effort: pace varies only with terrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatStrategy;

impl PacingStrategy for FlatStrategy {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn effort_multiplier(&self, _position: CoursePosition) -> f64 {
        1.0
    }
}

/// Strategy implementing the plan's `pacing_strategy`.
pub fn strategy_for(plan: &Plan) -> Box<dyn PacingStrategy> {
    match plan.pacing_strategy {
        PacingStrategyKind::Flat => Box::new(FlatStrategy),
        PacingStrategyKind::Linear => {
            // TODO: define the linear blend of pacing_linear_percent once the
            // intended progression (start vs finish bias) is agreed.
            warn!(
                "[Strategy] Linear pacing ({}%) has no defined computation, using flat",
                plan.pacing_linear_percent
            );
            Box::new(FlatStrategy)
        }
    }
}

//! Core constants for the turn and evocation engines.

/// Time units (aut) consumed by one action at normal speed.
pub const BASELINE_DELAY: i32 = 10;

/// Ceiling for the gourmand ramp-up counter, in aut.
pub const GOURMAND_MAX: i32 = 200 * BASELINE_DELAY;

/// Maximum piety a patron tracks.
pub const MAX_PIETY: i32 = 200;

/// Default line-of-sight radius in cells.
pub const LOS_RADIUS: i32 = 8;

/// Horror levels at which the cowardice messages escalate.
pub const HORROR_LVL_EXTREME: i32 = 3;
pub const HORROR_LVL_OVERWHELMING: i32 = 5;

/// Petrifying countdown value below which the stiffening warning fires.
pub const PETRIFY_WARNING_AUT: i32 = 15;

/// Maximum trainable evocations skill level.
pub const MAX_SKILL_LEVEL: i32 = 27;


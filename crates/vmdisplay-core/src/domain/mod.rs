//! Pure geometry entities shared by the display and input sides of the
//! bridge. No OS dependencies.

pub mod geometry;

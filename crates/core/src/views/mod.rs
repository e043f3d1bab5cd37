//! View models for the two modes of the board.
//!
//! These hold the behaviour of the staff desk and the public display (validation, banners,
//! the looped queue, the ticker) independent of how they are rendered.

pub mod display;
pub mod staff;

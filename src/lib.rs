//! Interaction core for the galaxy map: viewport transforms, per-frame
//! sprite hit testing, modal turn-notice sequencing, and input routing.
//!
//! The crate is renderer-agnostic. The application shell owns the model
//! and the paint loop; it rebuilds sprite hit regions each frame, feeds
//! platform events into [`input::InputRouter`], and acts on the returned
//! [`input::RouterEvent`]s.

pub mod geom;
pub mod hit_test;
pub mod input;
pub mod keybindings;
pub mod model;
pub mod overlay;
pub mod sprite;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testutil;

//! Client-side chat utilities for Southmain.
//!
//! The centerpiece is the join banner scheduler, which rotates "user joined"
//! notifications with a burst cooldown. Around it sit the typing indicator,
//! analytics reporting, profile cards, voice drops and the realtime feed.

// layers
pub mod domain;
pub mod error;
pub mod infrastructure;

// features
pub mod analytics;
pub mod feed;
pub mod join_banner;
pub mod profile_card;
pub mod typing;
pub mod voice;

// command-line front end
pub mod cli;

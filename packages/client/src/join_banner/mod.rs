//! Join notification banner.
//!
//! Serializes a bursty stream of join events into a rate-limited rotation
//! showing at most one entry at a time.

mod queue;
mod runner;
mod scheduler;

pub use queue::JoinQueue;
pub use runner::JoinBanner;
pub use scheduler::{
    BURST_CEILING, BannerTimings, COOLDOWN_DURATION, HIDE_DELAY, JoinBannerScheduler,
    QUEUE_CAPACITY, ROTATION_INTERVAL, SchedulerState, TimerKind,
};

//! Command-line front end used by the `southmain-client` binary.

mod commands;
mod formatter;
mod ui;

pub use commands::{
    parse_input_line, run_banner_prompt, run_profile, run_track, run_voice_drop, run_watch,
};
pub use formatter::BannerFormatter;

//! UI utilities for the interactive prompt.

use std::io::Write;

pub const PROMPT: &str = "join> ";

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

//! Output formatting for the command-line front end.

use southmain_shared::time::timestamp_to_rfc3339;

use crate::domain::{JoinEvent, PersonaCard};

/// Formatter for banner, typing and profile card output
pub struct BannerFormatter;

impl BannerFormatter {
    /// Format a banner change
    ///
    /// # Arguments
    ///
    /// * `entry` - The entry now displayed, or `None` when the banner is hidden
    pub fn format_banner(entry: Option<&JoinEvent>) -> String {
        match entry {
            Some(event) => format!(
                "\n+ {} joined at {}\n",
                event.username,
                timestamp_to_rfc3339(event.joined_at.value())
            ),
            None => "\n(banner hidden)\n".to_string(),
        }
    }

    /// Format a typing indicator change
    pub fn format_typing(visible: bool) -> String {
        if visible {
            "\n... someone is typing\n".to_string()
        } else {
            "\n(nobody is typing)\n".to_string()
        }
    }

    /// Format a persona profile card
    pub fn format_persona_card(card: &PersonaCard) -> String {
        let mut output = String::new();
        output.push_str("============================================================\n");
        output.push_str(&format!(
            "{}\n",
            card.name.as_deref().or(card.id.as_deref()).unwrap_or("(unnamed)")
        ));
        if let Some(bio) = &card.bio {
            output.push_str(&format!("{}\n", bio));
        }
        if let Some(avatar_url) = &card.avatar_url {
            output.push_str(&format!("avatar: {}\n", avatar_url));
        }
        let mut extra: Vec<_> = card.extra.iter().collect();
        extra.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in extra {
            output.push_str(&format!("{}: {}\n", key, value));
        }
        output.push_str("============================================================\n");
        output
    }
}

//! Menu config from environment: layout settings and log file.
//!
//! MENU_COLUMNS_MAX, MENU_BUTTONS_MAX, MENU_TEXT_MAX and MENU_COLUMN_SPACING override the layout
//! defaults; out-of-range values are clamped. Unparsable values fall back to the default.

use menu_tree::LayoutSettings;
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfig {
    pub layout: LayoutSettings,
    pub log_file: Option<String>,
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl MenuConfig {
    pub fn from_env() -> Self {
        let defaults = LayoutSettings::default();
        let layout = LayoutSettings {
            columns_max_count: env_usize("MENU_COLUMNS_MAX", defaults.columns_max_count),
            buttons_max_count: env_usize("MENU_BUTTONS_MAX", defaults.buttons_max_count),
            text_summary_max_length: env_usize("MENU_TEXT_MAX", defaults.text_summary_max_length),
            space_between_columns: env_usize("MENU_COLUMN_SPACING", defaults.space_between_columns),
        }
        .validate();
        Self {
            layout,
            log_file: env::var("LOG_FILE").ok(),
        }
    }
}

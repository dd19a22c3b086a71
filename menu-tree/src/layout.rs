//! Button layout and pagination.
//!
//! [`page_rows`] packs one page of child buttons into rows under the column, width and group
//! constraints; [`navigation_row`] adds the first/previous/next/last controls when children span
//! more than one page.

use menu_core::{Button, Keyboard};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

use crate::command::offset_command;

/// Emoji sequences: flags, keycaps, and pictographs with optional variation selectors, skin tones and ZWJ joins.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x{1F1E6}-\x{1F1FF}]{2}|[0-9#*]\x{FE0F}?\x{20E3}|\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]*(?:\x{200D}\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]*)*",
    )
    .unwrap()
});

/// Bounds of one layout setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub default: usize,
    pub min: usize,
    pub max: usize,
    pub step: usize,
}

impl Limit {
    fn clamp(&self, name: &str, value: usize) -> usize {
        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            warn!(setting = name, value, clamped, "Layout setting out of range, clamped");
        }
        clamped
    }
}

/// Defaults and bounds of every layout setting.
#[derive(Debug, Clone, Copy)]
pub struct LayoutLimits {
    pub columns_max_count: Limit,
    pub buttons_max_count: Limit,
    pub text_summary_max_length: Limit,
    pub space_between_columns: Limit,
}

pub const LAYOUT_LIMITS: LayoutLimits = LayoutLimits {
    columns_max_count: Limit {
        default: 0,
        min: 0,
        max: 10,
        step: 1,
    },
    buttons_max_count: Limit {
        default: 24,
        min: 1,
        max: 100,
        step: 1,
    },
    text_summary_max_length: Limit {
        default: 0,
        min: 0,
        max: 100,
        step: 1,
    },
    space_between_columns: Limit {
        default: 1,
        min: 1,
        max: 10,
        step: 1,
    },
};

/// Layout settings of a menu. Held by the root and used for every node it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Buttons per row; 0 = unbounded.
    pub columns_max_count: usize,
    /// Child buttons per page.
    pub buttons_max_count: usize,
    /// Max visual width of a row; 0 = unbounded.
    pub text_summary_max_length: usize,
    pub space_between_columns: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            columns_max_count: LAYOUT_LIMITS.columns_max_count.default,
            buttons_max_count: LAYOUT_LIMITS.buttons_max_count.default,
            text_summary_max_length: LAYOUT_LIMITS.text_summary_max_length.default,
            space_between_columns: LAYOUT_LIMITS.space_between_columns.default,
        }
    }
}

impl LayoutSettings {
    /// Returns a copy with every value clamped into [`LAYOUT_LIMITS`].
    pub fn validate(self) -> Self {
        let limits = LAYOUT_LIMITS;
        Self {
            columns_max_count: limits
                .columns_max_count
                .clamp("columns_max_count", self.columns_max_count),
            buttons_max_count: limits
                .buttons_max_count
                .clamp("buttons_max_count", self.buttons_max_count),
            text_summary_max_length: limits
                .text_summary_max_length
                .clamp("text_summary_max_length", self.text_summary_max_length),
            space_between_columns: limits
                .space_between_columns
                .clamp("space_between_columns", self.space_between_columns),
        }
    }

    fn page_size(&self) -> usize {
        self.buttons_max_count.max(1)
    }
}

/// A child button plus the group tag that drives row breaks.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub button: Button,
    pub group: String,
}

/// Approximate on-screen width of a label: characters, with each emoji sequence counted as 2, scaled by 1.2.
pub fn visual_length(label: &str) -> usize {
    let mut count = label.chars().count();
    for m in EMOJI_RE.find_iter(label) {
        count = count - m.as_str().chars().count() + 2;
    }
    (count as f64 * 1.2).round() as usize
}

/// Clamps a stored offset so that it always points into the children; 0 when there are none.
pub fn effective_offset(total: usize, offset: usize, settings: &LayoutSettings) -> usize {
    let page = settings.page_size();
    if total == 0 {
        0
    } else if offset < total {
        offset
    } else {
        (total - 1) / page * page
    }
}

/// Lays out the page `[offset, offset + page)` of `entries` into rows.
pub fn page_rows(entries: &[LayoutEntry], offset: usize, settings: &LayoutSettings) -> Keyboard {
    let page = settings.page_size();
    let offset = effective_offset(entries.len(), offset, settings);
    let end = offset.saturating_add(page).min(entries.len());

    let mut rows = Vec::new();
    let mut row: Vec<Button> = Vec::new();
    let mut group_current = "";
    let mut label_max = 0;
    for entry in &entries[offset..end] {
        let label_len = visual_length(&entry.button.label);
        if entry.group != group_current {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                label_max = 0;
            }
            group_current = entry.group.as_str();
        }
        label_max = label_max.max(label_len);
        let text_max = settings.text_summary_max_length;
        if text_max > 0
            && !row.is_empty()
            && (row.len() + 1) * label_max + row.len() * settings.space_between_columns > text_max
        {
            rows.push(std::mem::take(&mut row));
            label_max = label_len;
        }
        row.push(entry.button.clone());
        if settings.columns_max_count > 0 && row.len() == settings.columns_max_count {
            rows.push(std::mem::take(&mut row));
            label_max = 0;
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

/// Page navigation controls for `command`, or an empty row when everything fits on one page.
pub fn navigation_row(
    command: &str,
    total: usize,
    offset: usize,
    settings: &LayoutSettings,
) -> Vec<Button> {
    let page = settings.page_size();
    let mut row = Vec::new();
    if total <= page {
        return row;
    }
    let offset = effective_offset(total, offset, settings);
    let page_of = |offset: usize| offset / page + 1;

    if offset > 0 {
        if offset / page > 1 {
            row.push(Button::new("#1 <<", command));
        }
        let previous = offset.saturating_sub(page);
        row.push(Button::new(
            format!("#{} <", page_of(previous)),
            offset_command(command, previous),
        ));
    }
    if offset.saturating_add(page) < total {
        let next = offset + page;
        row.push(Button::new(
            format!("> #{}", page_of(next)),
            offset_command(command, next),
        ));
        if (total - offset) / page > 1 {
            let last = if total % page == 0 {
                total - page
            } else {
                total / page * page
            };
            row.push(Button::new(
                format!(">> #{}", page_of(last)),
                offset_command(command, last),
            ));
        }
    }
    row
}

//! Build-time description of a whole menu: the root plus its structured sections.

use crate::layout::LayoutSettings;
use crate::structured::SectionSpec;
use crate::text::Text;

/// Declarative menu structure consumed by [`crate::Menu::new`].
///
/// ```ignore
/// let structure = MenuStructure::new("start", "Main Menu")
///     .text("This is the main menu")
///     .section("configuration", SectionSpec::object("Configuration").field(..))
///     .section("items", SectionSpec::array("Items").field(..));
/// ```
pub struct MenuStructure {
    pub(crate) id: String,
    pub(crate) label: Text,
    pub(crate) text: Option<Text>,
    pub(crate) layout: LayoutSettings,
    pub(crate) sections: Vec<(String, SectionSpec)>,
}

impl MenuStructure {
    /// `id` is the root command without prefix, and the scope of every session key.
    pub fn new(id: impl Into<String>, label: impl Into<Text>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            text: None,
            layout: LayoutSettings::default(),
            sections: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<Text>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    /// Adds a section stored under `key`; its command is `/<key>`.
    pub fn section(mut self, key: impl Into<String>, spec: SectionSpec) -> Self {
        self.sections.push((key.into(), spec));
        self
    }
}

//! Stylesheet compiler configuration.

/// Options for a [`super::StylesheetParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylesheetOptions {
    /// Keep the `content` property of rules that also remove their
    /// elements. Off by default: removal discards every other property.
    pub keep_content_on_remove: bool,
    /// Report skipped rules through
    /// [`extcss_common::warning::warn_once`] in addition to collecting them
    /// in [`super::ParsedStylesheet::warnings`]. On by default.
    pub report_warnings: bool,
}

impl Default for StylesheetOptions {
    fn default() -> Self {
        Self {
            keep_content_on_remove: false,
            report_warnings: true,
        }
    }
}

//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Green theme shared by every view

/// Header, status bar and focused borders
pub const PRIMARY: Color = Color::Rgb(76, 175, 80);
/// Selected card
pub const ACCENT: Color = Color::Rgb(165, 214, 167);
/// Body text on light backgrounds
pub const TEXT: Color = Color::Rgb(51, 51, 51);
/// Secondary card lines and empty field hints
pub const PLACEHOLDER: Color = Color::Rgb(136, 136, 136);
/// Actions that cannot be used right now
pub const DISABLED: Color = Color::Rgb(204, 204, 204);
/// Modal editor background
pub const MODAL_BG: Color = Color::Rgb(244, 246, 245);
/// Unselected segment of the status selector
pub const SEGMENT_BG: Color = Color::Rgb(200, 230, 201);
/// Selected segment of the status selector
pub const SEGMENT_ACTIVE: Color = Color::Rgb(46, 125, 50);
/// Destructive dialogs and errors
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

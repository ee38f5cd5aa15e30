mod quiz;
mod summary;

use ratatui::style::{Color, Modifier, Style};

pub use quiz::render_quiz;
pub use summary::{correctness_text, stats_lines, stats_table};

/// Colors used by the quiz screens.
pub struct Palette;

impl Palette {
    pub const ACCENT: Color = Color::Rgb(212, 163, 115);
    pub const GOOD: Color = Color::Rgb(144, 190, 109);
    pub const BAD: Color = Color::Rgb(188, 108, 37);
    pub const MUTED: Color = Color::Rgb(128, 128, 128);

    #[must_use]
    pub fn title_style() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor_style() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn good_style() -> Style {
        Style::default().fg(Self::GOOD)
    }

    #[must_use]
    pub fn bad_style() -> Style {
        Style::default().fg(Self::BAD)
    }

    #[must_use]
    pub fn help_style() -> Style {
        Style::default().fg(Self::MUTED)
    }
}

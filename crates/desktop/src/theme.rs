use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use smilebooth_core::scoring::domain::score_result::SmileBand;

/// The kiosk always runs dark: it sits in a booth under event lighting.
pub fn kiosk_theme() -> Theme {
    Theme::custom("SmileBooth", kiosk_palette())
}

fn kiosk_palette() -> Palette {
    Palette {
        background: color!(0x14, 0x14, 0x18),
        text: color!(0xf2, 0xf2, 0xf2),
        primary: color!(0xff, 0x7a, 0x45),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

/// Fill colour of the smile bar for a band.
pub fn band_color(band: SmileBand, theme: &Theme) -> Color {
    let palette = theme.palette();
    match band {
        SmileBand::High => palette.success,
        SmileBand::Mid => palette.warning,
        SmileBand::Low => palette.danger,
    }
}

/// Secondary text, e.g. leaderboard scores.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.65,
        ..theme.palette().text
    }
}

/// Raised panels (result card, leaderboard column).
pub fn surface_color(theme: &Theme) -> Color {
    let bg = theme.palette().background;
    Color {
        r: (bg.r + 0.05).min(1.0),
        g: (bg.g + 0.05).min(1.0),
        b: (bg.b + 0.06).min(1.0),
        a: 1.0,
    }
}

/// Track behind the smile bar fill.
pub fn track_color(theme: &Theme) -> Color {
    Color {
        a: 0.12,
        ..theme.palette().text
    }
}

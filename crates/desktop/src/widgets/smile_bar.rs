use std::time::Duration;

use iced::border::Border;
use iced::widget::{container, Space};
use iced::{Color, Element, Length, Theme};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

use smilebooth_core::scoring::domain::score_result::{bar_fill, SmileBand};

use crate::app::Message;
use crate::theme::{band_color, track_color};

const BAR_WIDTH: f32 = 320.0;
const BAR_HEIGHT: f32 = 18.0;
const CORNER_RADIUS: f32 = 9.0;
const FILL_DURATION: Duration = Duration::from_millis(600);

/// Horizontal bar filled to the smile percentage, coloured by band. The
/// fill eases from its previous width when the score changes.
pub fn smile_bar<'a>(smile_percentage: f64, theme: &Theme) -> Element<'a, Message> {
    let fill_color = band_color(SmileBand::from_percentage(smile_percentage), theme);
    let track = track_color(theme);

    AnimationBuilder::new(bar_fill(smile_percentage), move |fill: f32| {
        build_bar(fill.clamp(0.0, 1.0), fill_color, track)
    })
    .animation(Easing::EASE_OUT.with_duration(FILL_DURATION))
    .into()
}

fn build_bar<'a>(fill: f32, fill_color: Color, track: Color) -> Element<'a, Message> {
    let filled = container(Space::new())
        .width(Length::Fixed(BAR_WIDTH * fill))
        .height(BAR_HEIGHT)
        .style(move |_theme: &Theme| rounded(fill_color));

    container(filled)
        .width(BAR_WIDTH)
        .height(BAR_HEIGHT)
        .style(move |_theme: &Theme| rounded(track))
        .into()
}

fn rounded(color: Color) -> container::Style {
    container::Style {
        background: Some(color.into()),
        border: Border {
            radius: CORNER_RADIUS.into(),
            ..Border::default()
        },
        ..container::Style::default()
    }
}

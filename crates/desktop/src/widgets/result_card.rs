use iced::border::Border;
use iced::widget::{column, container, image, text, Space};
use iced::{Alignment, Element, Font, Length, Theme};

use smilebooth_core::scoring::domain::score_result::ScoreResult;

use crate::app::Message;
use crate::theme::{muted_color, surface_color};
use crate::widgets::smile_bar::smile_bar;

const PHOTO_SIZE: f32 = 220.0;
const CORNER_RADIUS: f32 = 16.0;

/// Name, score, smile percentage and bar for the latest submission, with
/// the service's copy of the photo once it has been downloaded.
pub fn result_card<'a>(
    result: &ScoreResult,
    photo: Option<&image::Handle>,
    theme: &Theme,
) -> Element<'a, Message> {
    let muted = muted_color(theme);
    let surface = surface_color(theme);

    let mut col = column![].align_x(Alignment::Center).spacing(0);

    if let Some(handle) = photo {
        col = col
            .push(
                image(handle.clone())
                    .width(PHOTO_SIZE)
                    .height(PHOTO_SIZE)
                    .border_radius(CORNER_RADIUS - 4.0),
            )
            .push(Space::new().height(16));
    }

    col = col
        .push(text(result.name.clone()).size(28.0).font(Font {
            weight: iced::font::Weight::Bold,
            ..Font::DEFAULT
        }))
        .push(Space::new().height(6))
        .push(text(format!("Score: {}", result.score_label())).size(20.0))
        .push(Space::new().height(12))
        .push(smile_bar(result.smile_percentage, theme))
        .push(Space::new().height(8))
        .push(
            text(format!("Smile Percentage: {}", result.smile_label()))
                .size(16.0)
                .color(muted),
        );

    container(col)
        .padding([24, 32])
        .width(Length::Shrink)
        .style(move |_theme: &Theme| container::Style {
            background: Some(surface.into()),
            border: Border {
                radius: CORNER_RADIUS.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

use std::collections::HashMap;

use iced::border::Border;
use iced::widget::{column, container, image, row, text, Space};
use iced::{Alignment, Element, Font, Length, Theme};

use smilebooth_core::scoring::domain::leaderboard::Leaderboard;

use crate::app::Message;
use crate::theme::{muted_color, surface_color};

const PANEL_WIDTH: f32 = 300.0;
const THUMB_SIZE: f32 = 56.0;

pub fn leaderboard_panel<'a>(
    board: &Leaderboard,
    thumbnails: &HashMap<String, image::Handle>,
    theme: &Theme,
) -> Element<'a, Message> {
    let muted = muted_color(theme);
    let surface = surface_color(theme);

    let mut col = column![
        text("Leaderboard").size(24.0).font(Font {
            weight: iced::font::Weight::Bold,
            ..Font::DEFAULT
        }),
        Space::new().height(12),
    ]
    .spacing(10);

    if board.is_empty() {
        col = col.push(text("No scores yet").size(15.0).color(muted));
    }

    for (rank, entry) in board.ranked() {
        let thumb: Element<'a, Message> = match thumbnails.get(&entry.image_url) {
            Some(handle) => image(handle.clone())
                .width(THUMB_SIZE)
                .height(THUMB_SIZE)
                .border_radius(8.0)
                .into(),
            None => Space::new().width(THUMB_SIZE).height(THUMB_SIZE).into(),
        };
        col = col.push(
            row![
                thumb,
                column![
                    text(Leaderboard::heading(rank, entry)).size(18.0),
                    text(entry.score_label()).size(14.0).color(muted),
                ]
                .spacing(2),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );
    }

    container(col)
        .padding(20)
        .width(PANEL_WIDTH)
        .height(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(surface.into()),
            border: Border {
                radius: 16.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        })
        .into()
}

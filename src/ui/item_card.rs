use iced::widget::{button, column, container, image, row, text, Space};
use iced::{ContentFit, Element, Length};

use listing_studio::state::{Item, Operation, Status};

use super::suggestions;
use crate::Message;

const CARD_WIDTH: f32 = 280.0;
const PREVIEW_SIZE: f32 = 256.0;

pub fn view<'a>(item: &'a Item, preview: Option<&image::Handle>) -> Element<'a, Message> {
    let id = item.id();

    let picture: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(PREVIEW_SIZE))
            .height(Length::Fixed(PREVIEW_SIZE))
            .content_fit(ContentFit::Contain)
            .into(),
        None => Space::new(Length::Fixed(PREVIEW_SIZE), Length::Fixed(PREVIEW_SIZE)).into(),
    };

    let enhance_status = item.status(Operation::Enhance);
    let validate_status = item.status(Operation::Validate);

    let actions = row![
        button("Enhance")
            .on_press_maybe((enhance_status != Status::InProgress).then_some(Message::Enhance(id))),
        button("Validate")
            .on_press_maybe((validate_status != Status::InProgress).then_some(Message::Validate(id))),
        button("Export")
            .on_press(Message::Export(id))
            .style(button::secondary),
        button("Remove")
            .on_press(Message::RemoveItem(id))
            .style(button::danger),
    ]
    .spacing(6);

    let mut card = column![
        picture,
        text(item.name()).size(16),
        status_line("Enhance", item, Operation::Enhance),
        status_line("Validate", item, Operation::Validate),
        actions,
    ]
    .spacing(8);

    if !item.suggestions().is_empty() {
        card = card.push(suggestions::view(item));
    }

    container(card)
        .width(Length::Fixed(CARD_WIDTH))
        .padding(12)
        .style(container::rounded_box)
        .into()
}

fn status_line<'a>(label: &'a str, item: &'a Item, operation: Operation) -> Element<'a, Message> {
    let progress = item.progress(operation);

    let status = text(progress.status.label()).size(13).style(match progress.status {
        Status::Done => text::success,
        Status::Failed => text::danger,
        Status::NotStarted | Status::InProgress => text::default,
    });

    let mut line = row![text(format!("{label}:")).size(13), status].spacing(6);

    // Keep the reason visible until the next success clears it
    if let Some(failure) = &progress.last_failure {
        line = line.push(text(failure.to_string()).size(12).style(text::danger));
    }
    line.into()
}

/// Suggestion panel shown under an item card
use iced::widget::{button, column, container, row, text, Column};
use iced::Element;

use listing_studio::state::{Category, Item, Priority, Suggestion, SuggestionSummary};

use crate::Message;

pub fn view<'a>(item: &'a Item) -> Element<'a, Message> {
    let summary = SuggestionSummary::from_suggestions(item.suggestions());

    let entries = item
        .suggestions()
        .iter()
        .fold(Column::new().spacing(8), |col, suggestion| col.push(entry(suggestion)));

    column![
        text("Suggestions").size(15),
        entries,
        text(format!(
            "{} of {} implemented, {} high / {} medium / {} low",
            summary.implemented, summary.total, summary.high, summary.medium, summary.low
        ))
        .size(12)
        .style(text::secondary),
    ]
    .spacing(8)
    .into()
}

fn entry<'a>(suggestion: &'a Suggestion) -> Element<'a, Message> {
    let priority = text(suggestion.priority().label()).size(12).style(match suggestion.priority() {
        Priority::High => text::danger,
        Priority::Medium => text::primary,
        Priority::Low => text::secondary,
    });

    let category = text(suggestion.category().label()).size(12).style(match suggestion.category() {
        Category::Success | Category::Enhancement => text::success,
        Category::Warning => text::danger,
        Category::Improvement => text::primary,
    });

    let action: Element<'a, Message> = if suggestion.is_implemented() {
        text("Implemented").size(12).style(text::success).into()
    } else {
        button(text("Implement").size(12))
            .on_press(Message::ImplementSuggestion(suggestion.id()))
            .style(button::secondary)
            .into()
    };

    container(
        column![
            row![category, priority].spacing(8),
            text(suggestion.title()).size(14),
            text(suggestion.description()).size(12),
            action,
        ]
        .spacing(4),
    )
    .padding(8)
    .style(container::bordered_box)
    .into()
}

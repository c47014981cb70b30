/// UI module
///
/// This module handles the widgets drawn for the item grid:
/// - One card per item with its preview and actions (item_card.rs)
/// - The suggestion list under each card (suggestions.rs)
use iced::widget::image;
use iced::Element;
use iced_aw::Wrap;
use std::collections::HashMap;

use listing_studio::state::{ItemId, ItemStore};

use crate::Message;

pub mod item_card;
pub mod suggestions;

/// Cards for every item in store order, wrapped into rows
pub fn item_grid<'a>(
    store: &'a ItemStore,
    previews: &'a HashMap<ItemId, image::Handle>,
) -> Element<'a, Message> {
    let cards: Vec<Element<'a, Message>> = store
        .iter()
        .map(|item| item_card::view(item, previews.get(&item.id())))
        .collect();

    Wrap::with_elements(cards)
        .spacing(16.0)
        .line_spacing(16.0)
        .into()
}

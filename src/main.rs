use iced::widget::{button, checkbox, column, container, image, row, scrollable, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use listing_studio::config::StudioConfig;
use listing_studio::export;
use listing_studio::processing::{self, Request, Settled, SettledBatch};
use listing_studio::services::Collaborators;
use listing_studio::state::{ItemId, ItemStore, Operation, SuggestionId};
use listing_studio::upload::{self, UploadLimits, UploadReport};

mod ui;

/// Main application state
struct Studio {
    /// Every image under management
    store: ItemStore,
    collaborators: Collaborators,
    limits: UploadLimits,
    /// Applies to the next enhance, single or batch
    remove_background: bool,
    /// One handle per item so iced keeps its decoded texture between frames
    previews: HashMap<ItemId, image::Handle>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    ImportImages,
    ImportFolder,
    ImportComplete(UploadReport),
    RemoveItem(ItemId),
    ToggleRemoveBackground(bool),
    Enhance(ItemId),
    Validate(ItemId),
    OperationSettled(Settled),
    EnhanceAll,
    ValidateAll,
    BatchSettled(SettledBatch),
    ImplementSuggestion(SuggestionId),
    Export(ItemId),
    ExportComplete(Result<PathBuf, String>),
}

impl Studio {
    fn new(config: StudioConfig, collaborators: Collaborators) -> (Self, Task<Message>) {
        let limits = config.upload_limits();
        info!(max_upload_bytes = limits.max_bytes, "listing studio ready");

        (
            Studio {
                store: ItemStore::new(),
                collaborators,
                limits,
                remove_background: false,
                previews: HashMap::new(),
                status: "Ready. Import product images to begin.".to_string(),
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImportImages => {
                let Some(paths) = FileDialog::new()
                    .set_title("Select Product Images")
                    .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif", "bmp"])
                    .pick_files()
                else {
                    return Task::none();
                };

                self.status = format!("Importing {} files...", paths.len());
                Task::perform(
                    upload::import_paths(paths, self.limits),
                    Message::ImportComplete,
                )
            }
            Message::ImportFolder => {
                let Some(folder) = FileDialog::new()
                    .set_title("Select Folder with Product Images")
                    .pick_folder()
                else {
                    return Task::none();
                };

                self.status = format!("Importing from {}...", folder.display());
                Task::perform(
                    upload::import_folder(folder, self.limits),
                    Message::ImportComplete,
                )
            }
            Message::ImportComplete(report) => {
                let accepted = report.accepted.len();
                for file in report.accepted {
                    let id = self.store.add(file);
                    self.refresh_preview(id);
                }

                self.status = match report.rejected.first() {
                    None => format!("Imported {accepted} images."),
                    Some(first) => format!(
                        "Imported {accepted} images, rejected {} ({first}).",
                        report.rejected.len()
                    ),
                };
                Task::none()
            }
            Message::RemoveItem(id) => {
                if let Some(item) = self.store.remove(id) {
                    self.previews.remove(&id);
                    self.status = format!("Removed {}.", item.name());
                }
                Task::none()
            }
            Message::ToggleRemoveBackground(enabled) => {
                self.remove_background = enabled;
                Task::none()
            }
            Message::Enhance(id) => self.start(id, Request::enhance(self.remove_background)),
            Message::Validate(id) => self.start(id, Request::validate()),
            Message::OperationSettled(settled) => {
                let id = settled.item;
                let operation = settled.request.operation;
                let Some(status) = processing::commit(&mut self.store, settled) else {
                    return Task::none();
                };

                if operation == Operation::Enhance {
                    self.refresh_preview(id);
                }
                if let Some(item) = self.store.get(id) {
                    self.status = format!("{} {}: {}.", capitalize(operation), item.name(), status.label());
                }
                Task::none()
            }
            Message::EnhanceAll => self.start_batch(Request::enhance(self.remove_background)),
            Message::ValidateAll => self.start_batch(Request::validate()),
            Message::BatchSettled(settled) => {
                let operation = settled.request.operation;
                let ids: Vec<ItemId> = settled.settled.iter().map(|s| s.item).collect();
                let summary = processing::commit_all(&mut self.store, settled);

                if operation == Operation::Enhance {
                    for id in ids {
                        self.refresh_preview(id);
                    }
                }
                self.status = format!(
                    "{} all finished: {} succeeded, {} failed, {} skipped.",
                    capitalize(operation),
                    summary.succeeded,
                    summary.failed,
                    summary.skipped
                );
                Task::none()
            }
            Message::ImplementSuggestion(id) => {
                if let Err(err) = self.store.mark_implemented(id) {
                    warn!(error = %err, "cannot mark suggestion implemented");
                    self.status = err.to_string();
                }
                Task::none()
            }
            Message::Export(id) => {
                let Some(item) = self.store.get(id).cloned() else {
                    return Task::none();
                };
                let Some(folder) = FileDialog::new()
                    .set_title("Export To Folder")
                    .pick_folder()
                else {
                    return Task::none();
                };

                Task::perform(
                    async move { export::export(item, folder).await.map_err(|e| e.to_string()) },
                    Message::ExportComplete,
                )
            }
            Message::ExportComplete(result) => {
                self.status = match result {
                    Ok(path) => format!("Exported to {}.", path.display()),
                    Err(err) => {
                        warn!(error = %err, "export failed");
                        format!("Export failed: {err}")
                    }
                };
                Task::none()
            }
        }
    }

    /// Claim one item and hand the collaborator call to the runtime
    fn start(&mut self, id: ItemId, request: Request) -> Task<Message> {
        match processing::begin(&mut self.store, id, request) {
            Ok(dispatch) => {
                let collaborators = self.collaborators.clone();
                Task::perform(
                    async move { processing::execute(dispatch, &collaborators).await },
                    Message::OperationSettled,
                )
            }
            Err(err) => {
                self.status = err.to_string();
                Task::none()
            }
        }
    }

    fn start_batch(&mut self, request: Request) -> Task<Message> {
        let batch = processing::dispatch_all(&mut self.store, request);
        if batch.is_empty() {
            self.status = format!("Nothing to {}.", request.operation);
            return Task::none();
        }

        self.status = format!(
            "Running {} on {} images...",
            request.operation,
            batch.dispatches.len()
        );
        Task::perform(
            processing::settle_all(batch, self.collaborators.clone()),
            Message::BatchSettled,
        )
    }

    fn refresh_preview(&mut self, id: ItemId) {
        if let Some(item) = self.store.get(id) {
            let handle = image::Handle::from_bytes(item.display_content().bytes().clone());
            self.previews.insert(id, handle);
        }
    }

    fn view(&self) -> Element<Message> {
        let has_items = !self.store.is_empty();

        let toolbar = row![
            button("Import Images").on_press(Message::ImportImages).padding(10),
            button("Import Folder").on_press(Message::ImportFolder).padding(10),
            checkbox("Remove background", self.remove_background)
                .on_toggle(Message::ToggleRemoveBackground),
            button("Enhance All")
                .on_press_maybe(
                    (has_items && !processing::all_enhanced(&self.store)).then_some(Message::EnhanceAll),
                )
                .padding(10),
            button("Validate All")
                .on_press_maybe(
                    (has_items && !processing::all_validated(&self.store)).then_some(Message::ValidateAll),
                )
                .padding(10),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let body: Element<Message> = if has_items {
            scrollable(ui::item_grid(&self.store, &self.previews))
                .height(Length::Fill)
                .into()
        } else {
            container(text("No images yet.").size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into()
        };

        let content: Column<Message> = column![
            text("Listing Studio").size(32),
            toolbar,
            body,
            text(&self.status).size(14),
        ]
        .spacing(16)
        .padding(24);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn capitalize(operation: Operation) -> &'static str {
    match operation {
        Operation::Enhance => "Enhance",
        Operation::Validate => "Validate",
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("listing_studio=info")),
        )
        .init();

    let config = StudioConfig::load().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to default settings");
        StudioConfig::default()
    });

    let collaborators = match Collaborators::from_config(&config) {
        Ok(collaborators) => collaborators,
        Err(err) => {
            error!(error = %err, "cannot start without an HTTP client");
            std::process::exit(1);
        }
    };

    iced::application("Listing Studio", Studio::update, Studio::view)
        .theme(Studio::theme)
        .centered()
        .run_with(move || Studio::new(config, collaborators))
}

/// Export of finished images
///
/// Writes an item's display image (the enhanced JPEG when there is one,
/// otherwise the original upload) into a folder, next to a JSON sidecar
/// holding its suggestions.
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::state::data::Item;
use crate::state::suggestion::{Suggestion, SuggestionSummary};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize suggestions: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("export task failed: {0}")]
    Task(String),
}

#[derive(Serialize)]
struct Sidecar<'a> {
    name: &'a str,
    enhanced: bool,
    accepted_at: String,
    summary: SuggestionSummary,
    suggestions: &'a [Suggestion],
}

/// File stem used for exports: lowercased, whitespace runs become `-`
pub fn slug(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let slug = stem
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}

/// First stem under `folder` whose image and sidecar are both unused
///
/// Items sharing a name get `-2`, `-3`, ... instead of overwriting.
fn free_stem(folder: &Path, slug: &str, extension: &str) -> String {
    let taken = |stem: &str| {
        folder.join(format!("{stem}.{extension}")).exists()
            || folder.join(format!("{stem}.suggestions.json")).exists()
    };

    if !taken(slug) {
        return slug.to_string();
    }
    (2u32..)
        .map(|n| format!("{slug}-{n}"))
        .find(|stem| !taken(stem))
        .unwrap_or_else(|| slug.to_string())
}

/// Write the item into `folder`, returning the image path
pub fn export_item(item: &Item, folder: &Path) -> Result<PathBuf, ExportError> {
    let extension = if item.derived().is_some() {
        "jpg"
    } else {
        ImageFormat::from_mime_type(item.mime())
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("jpg")
    };
    let stem = free_stem(folder, &slug(item.name()), extension);

    let image_path = folder.join(format!("{stem}.{extension}"));
    write(&image_path, item.display_content().bytes())?;

    let sidecar = Sidecar {
        name: item.name(),
        enhanced: item.derived().is_some(),
        accepted_at: item.accepted_at().to_rfc3339(),
        summary: SuggestionSummary::from_suggestions(item.suggestions()),
        suggestions: item.suggestions(),
    };
    let sidecar_path = folder.join(format!("{stem}.suggestions.json"));
    write(&sidecar_path, &serde_json::to_vec_pretty(&sidecar)?)?;

    info!(item = %item.id(), path = %image_path.display(), "item exported");
    Ok(image_path)
}

/// Export off the UI thread
pub async fn export(item: Item, folder: PathBuf) -> Result<PathBuf, ExportError> {
    tokio::task::spawn_blocking(move || export_item(&item, &folder))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
}

fn write(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

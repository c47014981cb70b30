/// Test fixtures shared by the unit tests.
use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::CollaboratorError;
use crate::services::{Collaborators, Enhancer, Validator};
use crate::state::data::ContentHandle;
use crate::upload::AcceptedFile;

pub(crate) fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([200, 10, 10]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub(crate) fn accepted(name: &str) -> AcceptedFile {
    AcceptedFile {
        name: name.to_string(),
        mime: "image/png",
        content: ContentHandle::new(png_bytes()),
    }
}

/// An item whose bytes steer the fakes, e.g. `b"fail-enhance"`
pub(crate) fn accepted_raw(name: &str, bytes: &'static [u8]) -> AcceptedFile {
    AcceptedFile {
        name: name.to_string(),
        mime: "image/png",
        content: ContentHandle::new(Bytes::from_static(bytes)),
    }
}

/// Fails for sources starting with `fail-enhance` or `fail-both`, or for
/// everything once `fail_all` is set
#[derive(Default)]
pub(crate) struct FakeEnhancer {
    pub calls: AtomicUsize,
    pub fail_all: AtomicBool,
}

#[async_trait]
impl Enhancer for FakeEnhancer {
    async fn enhance(&self, bytes: Bytes, remove_background: bool) -> Result<Bytes, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_all.load(Ordering::SeqCst)
            || bytes.starts_with(b"fail-enhance")
            || bytes.starts_with(b"fail-both")
        {
            return Err(CollaboratorError::rejected("fake enhancer", 500, "scripted failure"));
        }
        let prefix: &[u8] = if remove_background { b"cutout:" } else { b"enhanced:" };
        Ok(Bytes::from([prefix, &bytes[..]].concat()))
    }
}

/// Fails for sources starting with `fail-validate` or `fail-both`
#[derive(Default)]
pub(crate) struct FakeValidator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Validator for FakeValidator {
    async fn validate(&self, bytes: Bytes) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if bytes.starts_with(b"fail-validate") || bytes.starts_with(b"fail-both") {
            return Err(CollaboratorError::unparseable("fake validator", "scripted failure"));
        }
        Ok(format!("Looks compliant ({} bytes)", bytes.len()))
    }
}

pub(crate) fn fakes() -> (Collaborators, Arc<FakeEnhancer>, Arc<FakeValidator>) {
    let enhancer = Arc::new(FakeEnhancer::default());
    let validator = Arc::new(FakeValidator::default());
    let collaborators = Collaborators::new(enhancer.clone(), validator.clone());
    (collaborators, enhancer, validator)
}

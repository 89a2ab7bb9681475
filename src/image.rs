use crate::error::{Result, ToolError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// One of the three ways a caller may point at an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
    Path(PathBuf),
}

/// What actually goes over the wire. Local paths never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireImage {
    Url(String),
    Base64(String),
}

impl ImageSource {
    /// Picks the single populated source for `slot`. Empty strings count as
    /// absent; more than one populated field is rejected.
    pub fn select(
        slot: &str,
        url: Option<&str>,
        base64: Option<&str>,
        path: Option<&str>,
    ) -> Result<Option<Self>> {
        let url = non_empty(url);
        let base64 = non_empty(base64);
        let path = non_empty(path);

        let populated = [url.is_some(), base64.is_some(), path.is_some()]
            .into_iter()
            .filter(|present| *present)
            .count();
        if populated > 1 {
            return Err(ToolError::validation(format!(
                "specify exactly one image source: only one of {slot}_url, {slot}_base64, or {slot}_path may be set"
            )));
        }

        Ok(match (url, base64, path) {
            (Some(url), _, _) => Some(ImageSource::Url(url.to_string())),
            (_, Some(base64), _) => Some(ImageSource::Base64(base64.to_string())),
            (_, _, Some(path)) => Some(ImageSource::Path(PathBuf::from(path))),
            _ => None,
        })
    }

    pub fn into_wire(self) -> Result<WireImage> {
        match self {
            ImageSource::Url(url) => Ok(WireImage::Url(url)),
            ImageSource::Base64(base64) => Ok(WireImage::Base64(base64)),
            ImageSource::Path(path) => load_image_path_to_base64(&path).map(WireImage::Base64),
        }
    }
}

impl WireImage {
    /// Inserts `<slot>_url` or `<slot>_base64` into a request payload.
    pub fn write_into(self, slot: &str, payload: &mut Map<String, Value>) {
        match self {
            WireImage::Url(url) => {
                payload.insert(format!("{slot}_url"), json!(url));
            }
            WireImage::Base64(base64) => {
                payload.insert(format!("{slot}_base64"), json!(base64));
            }
        }
    }
}

/// Normalizes a mandatory image slot into its wire form.
pub fn normalize(
    slot: &str,
    url: Option<&str>,
    base64: Option<&str>,
    path: Option<&str>,
) -> Result<WireImage> {
    normalize_selected(slot, ImageSource::select(slot, url, base64, path)?)
}

/// Second half of [`normalize`], for callers that validate several slots
/// before touching the filesystem.
pub fn normalize_selected(slot: &str, source: Option<ImageSource>) -> Result<WireImage> {
    let Some(source) = source else {
        return Err(ToolError::validation(format!(
            "specify exactly one image source: one of {slot}_url, {slot}_base64, or {slot}_path is required"
        )));
    };
    source.into_wire()
}

/// Reads a local image and returns its contents as standard base64.
pub fn load_image_path_to_base64(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|err| ToolError::FileNotFound {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(ToolError::validation(format!(
            "path is not a file: {}",
            path.display()
        )));
    }
    let bytes = fs::read(path).map_err(|err| ToolError::FileNotFound {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded local image");
    Ok(STANDARD.encode(bytes))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

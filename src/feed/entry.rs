//! Feed entry model and destination filename derivation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// Filename used when a source URL has no usable path segment.
pub const FALLBACK_FILENAME: &str = "download.bin";

/// One downloadable firmware artifact as described by the feed.
///
/// Only [`binary_url`](Self::binary_url) is interpreted by the download
/// pipeline. The remaining fields are pass-through metadata; fields not known
/// here are kept verbatim in [`extra`](Self::extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Absolute URL of the firmware binary.
    #[serde(rename = "fw_binary_url")]
    pub binary_url: String,

    /// Size of the binary in bytes, as advertised by the feed.
    #[serde(rename = "fw_filesize", default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,

    /// Firmware type discriminator (gateway vs. device image).
    #[serde(rename = "fw_type", default, skip_serializing_if = "Option::is_none")]
    pub fw_type: Option<u32>,

    #[serde(rename = "fw_file_version_LSB", default, skip_serializing_if = "Option::is_none")]
    pub file_version_lsb: Option<u64>,

    #[serde(rename = "fw_file_version_MSB", default, skip_serializing_if = "Option::is_none")]
    pub file_version_msb: Option<u64>,

    #[serde(rename = "fw_image_type", default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<u32>,

    #[serde(rename = "fw_manufacturer_id", default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<u32>,

    #[serde(rename = "fw_major_version", default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u32>,

    #[serde(rename = "fw_minor_version", default, skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<u32>,

    #[serde(rename = "fw_hotfix_version", default, skip_serializing_if = "Option::is_none")]
    pub hotfix_version: Option<u32>,

    #[serde(rename = "fw_build_version", default, skip_serializing_if = "Option::is_none")]
    pub build_version: Option<u32>,

    #[serde(rename = "fw_req_major_version", default, skip_serializing_if = "Option::is_none")]
    pub req_major_version: Option<u32>,

    #[serde(rename = "fw_req_minor_version", default, skip_serializing_if = "Option::is_none")]
    pub req_minor_version: Option<u32>,

    #[serde(rename = "fw_req_hotfix_version", default, skip_serializing_if = "Option::is_none")]
    pub req_hotfix_version: Option<u32>,

    #[serde(rename = "fw_update_prio", default, skip_serializing_if = "Option::is_none")]
    pub update_prio: Option<u32>,

    /// Link to the human-readable release notes.
    #[serde(rename = "fw_weblink_relnote", default, skip_serializing_if = "Option::is_none")]
    pub release_notes_url: Option<String>,

    /// Feed fields not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FeedEntry {
    /// Creates an entry with only a source URL set.
    #[must_use]
    pub fn new(binary_url: impl Into<String>) -> Self {
        Self {
            binary_url: binary_url.into(),
            filesize: None,
            fw_type: None,
            file_version_lsb: None,
            file_version_msb: None,
            image_type: None,
            manufacturer_id: None,
            major_version: None,
            minor_version: None,
            hotfix_version: None,
            build_version: None,
            req_major_version: None,
            req_minor_version: None,
            req_hotfix_version: None,
            update_prio: None,
            release_notes_url: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Returns the local filename for this entry: the final path segment of
    /// its source URL.
    ///
    /// Query strings and fragments are not part of the name. A trailing slash
    /// falls back to the last non-empty segment, and a URL with no usable
    /// segment at all yields [`FALLBACK_FILENAME`]. The result is never empty.
    #[must_use]
    pub fn filename(&self) -> String {
        filename_from_url(&self.binary_url)
    }

    /// Returns the path this entry is written to under `destination_dir`.
    #[must_use]
    pub fn destination_path(&self, destination_dir: &Path) -> PathBuf {
        destination_dir.join(self.filename())
    }

    /// Renders `major.minor.hotfix` when the feed provides a major version.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        let major = self.major_version?;
        Some(format!(
            "{major}.{}.{}",
            self.minor_version.unwrap_or(0),
            self.hotfix_version.unwrap_or(0)
        ))
    }
}

fn filename_from_url(raw: &str) -> String {
    let candidate = match Url::parse(raw) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(str::to_string),
        Err(_) => {
            let without_query = raw.split(['?', '#']).next().unwrap_or(raw);
            without_query
                .split('/')
                .rfind(|s| !s.is_empty())
                .map(str::to_string)
        }
    };

    match candidate {
        Some(name) if name != "." && name != ".." => name,
        _ => FALLBACK_FILENAME.to_string(),
    }
}

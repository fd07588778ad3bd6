//! Upload storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_dir() -> String {
    "uploads".to_string()
}

/// 100 MiB.
const fn default_max_video_bytes() -> usize {
    100 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadsConfig {
    /// Root directory for uploaded files, served at `/uploads`.
    #[serde(default = "default_dir")]
    pub dir: String,

    #[serde(default = "default_max_video_bytes")]
    pub max_video_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            max_video_bytes: default_max_video_bytes(),
        }
    }
}

impl UploadsConfig {
    pub fn videos_dir(&self) -> PathBuf {
        PathBuf::from(&self.dir).join("videos")
    }
}

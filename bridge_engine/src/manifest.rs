use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const HOST_NAME: &str = "post2mpv";
pub const HOST_DESCRIPTION: &str = "post2mpv native bridge (post2mpv-bridge)";
pub const EXTENSION_ID: &str = "post2mpv@netnom.uk";

/// Native messaging host manifest, as read by the browser to launch the bridge.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostManifest {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub host_type: String,
    pub allowed_extensions: Vec<String>,
}

impl HostManifest {
    /// Manifest for the bridge executable at `executable`.
    pub fn new(executable: PathBuf) -> Self {
        Self {
            name: HOST_NAME.to_string(),
            description: HOST_DESCRIPTION.to_string(),
            path: executable,
            host_type: "stdio".to_string(),
            allowed_extensions: vec![EXTENSION_ID.to_string()],
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

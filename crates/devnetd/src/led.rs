//! LED blink counter indicator.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use devnet_common::{DevNetError, DevNetResult, Indicator, IndicatorCode};

/// Default location read by the LED manager.
pub const DEFAULT_LED_CONFIG_PATH: &str = "/var/tmp/ledmanager/config/ledconfig.json";

#[derive(Debug, Serialize)]
struct LedBlinkCount {
    #[serde(rename = "BlinkCounter")]
    blink_counter: u32,
}

/// Publishes connectivity codes as a blink count file for the LED manager.
#[derive(Debug, Clone)]
pub struct LedIndicator {
    path: PathBuf,
}

impl LedIndicator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, code: IndicatorCode) -> DevNetResult<()> {
        let path = self.path.display().to_string();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DevNetError::io(&path, e))?;
        }

        let body = serde_json::to_vec(&LedBlinkCount {
            blink_counter: code.code(),
        })
        .map_err(|e| DevNetError::json("led blink count", e))?;

        fs::write(&self.path, body).map_err(|e| DevNetError::io(&path, e))
    }
}

impl Default for LedIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_LED_CONFIG_PATH)
    }
}

impl Indicator for LedIndicator {
    fn signal(&self, code: IndicatorCode) {
        match self.write(code) {
            Ok(()) => debug!("Set blink counter {} in {}", code.code(), self.path.display()),
            Err(e) => warn!("Failed to update LED blink counter: {}", e),
        }
    }
}

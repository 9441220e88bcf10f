/*!
Document serialization: JSON and YAML rendering plus file output.
*/

use crate::{
    error::{SchemaError, SchemaResult},
    specification::ApiSpec,
};
use std::path::Path;
use tracing::debug;

impl ApiSpec {
    /// Render the document as compact JSON
    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render the document as pretty-printed JSON
    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the document as YAML
    pub fn to_yaml(&self) -> SchemaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the document to a file, choosing the format from the
    /// extension: `.yaml`/`.yml` renders YAML, `.json` renders JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SchemaResult<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let content = match extension.as_str() {
            "yaml" | "yml" => self.to_yaml()?,
            "json" => self.to_json_pretty()?,
            other => {
                return Err(SchemaError::export_error(format!(
                    "unsupported extension: {:?}",
                    other
                )))
            }
        };

        std::fs::write(path, content)?;
        debug!(path = %path.display(), "specification written");
        Ok(())
    }
}

// Template archive writing pretty-printed JSON files
use crate::application::template_archive::TemplateArchive;
use crate::domain::error::{LifecycleError, Result};
use crate::domain::template::TemplateDescription;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileArchive {
    path: PathBuf,
}

impl JsonFileArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Four-space indented JSON
fn render(template: &TemplateDescription) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    template.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

impl TemplateArchive for JsonFileArchive {
    fn store(&self, template: &TemplateDescription) -> Result<PathBuf> {
        let document = render(template).map_err(|e| LifecycleError::Archive(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LifecycleError::Archive(format!("{}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.path, document)
            .map_err(|e| LifecycleError::Archive(format!("{}: {}", self.path.display(), e)))?;

        tracing::info!(
            "Template {} written to {}",
            template.template_id,
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

// Durable storage for template documents (audit side channel)
use crate::domain::error::Result;
use crate::domain::template::TemplateDescription;
use std::path::PathBuf;

pub trait TemplateArchive: Send + Sync {
    /// Persist the document and return where it was written
    fn store(&self, template: &TemplateDescription) -> Result<PathBuf>;
}

use common::{
    context::Context,
    entities::file::{UploadFile, UploadTarget},
    error::{self, ServiceError},
};

use crate::service::upload::DropZone;

pub const ACCEPTED_EXTENSION: &str = ".xlsx";
pub const FOOTER: &str =
    "Требуется: .xlsx (openxml). Данные кешируются на стороне API до перезагрузки контейнера.";

pub fn label(target: UploadTarget) -> &'static str {
    match target {
        UploadTarget::HyperV => "Загрузить Hyper‑V (hyper-v.xlsx)",
        UploadTarget::Exchange => "Загрузить Exchange (mail.xlsx)",
        UploadTarget::S3 => "Загрузить S3 (s3.xlsx)",
        UploadTarget::BinMapping => "Загрузить BIN‑mapping (несколько .xlsx)",
    }
}

/// The extension is a hint for the file picker; nothing is refused on it.
pub fn is_accepted(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(ACCEPTED_EXTENSION)
}

/// The ingestion page: one widget per upload target.
pub struct UploadPage {
    zones: Vec<DropZone>,
}

impl Default for UploadPage {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPage {
    pub fn new() -> Self {
        let zones = UploadTarget::ALL
            .iter()
            .map(|target| DropZone::new(*target, label(*target)))
            .collect();

        Self { zones }
    }

    pub fn zones(&self) -> &[DropZone] {
        &self.zones
    }

    pub fn zone(&self, target: UploadTarget) -> Option<&DropZone> {
        self.zones.iter().find(|zone| zone.target() == target)
    }

    pub async fn select_files(
        &mut self,
        context: &Context,
        target: UploadTarget,
        files: Vec<UploadFile>,
    ) -> error::Result<()> {
        for file in files.iter().filter(|file| !is_accepted(&file.name)) {
            log::warn!("{} does not look like an {} file", file.name, ACCEPTED_EXTENSION);
        }

        let Some(zone) = self.zones.iter_mut().find(|zone| zone.target() == target) else {
            return Err(ServiceError::local(anyhow::anyhow!(
                "No upload widget for {}",
                target
            )));
        };

        zone.on_files(context, files).await
    }
}

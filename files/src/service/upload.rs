use std::fmt;

use common::{
    api::file::{upload_multiple, upload_single},
    context::Context,
    entities::file::{UploadFile, UploadTarget},
    error::{self, ServiceError},
};

pub const DONE_MESSAGE: &str = "Готово";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Done,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Done => "done",
            UploadStatus::Error => "error",
        };
        f.write_str(status)
    }
}

/// One upload widget. `Done` and `Error` hold until the next selection,
/// which always passes through `Uploading`.
#[derive(Debug, Clone)]
pub struct DropZone {
    target: UploadTarget,
    label: &'static str,
    status: UploadStatus,
    message: String,
}

impl DropZone {
    pub fn new(target: UploadTarget, label: &'static str) -> Self {
        Self {
            target,
            label,
            status: UploadStatus::Idle,
            message: String::new(),
        }
    }

    pub fn target(&self) -> UploadTarget {
        self.target
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn multiple(&self) -> bool {
        self.target.accepts_batch()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn begin(&mut self) -> error::Result<()> {
        if self.status == UploadStatus::Uploading {
            return Err(ServiceError::local(anyhow::anyhow!(
                "An upload to {} is already in progress",
                self.target
            )));
        }

        self.status = UploadStatus::Uploading;
        self.message.clear();
        Ok(())
    }

    pub fn finish(&mut self, result: &error::Result<()>) {
        if self.status != UploadStatus::Uploading {
            log::warn!("Ignoring upload result for idle widget {}", self.target);
            return;
        }

        match result {
            Ok(()) => {
                self.status = UploadStatus::Done;
                self.message = DONE_MESSAGE.to_string();
            }
            Err(err) => {
                self.status = UploadStatus::Error;
                self.message = err.user_message();
            }
        }
    }

    /// Handles a file selection. An empty selection changes nothing; a
    /// single-file widget sends only the first file.
    pub async fn on_files(&mut self, context: &Context, files: Vec<UploadFile>) -> error::Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        self.begin()?;

        let result = if self.multiple() {
            upload_multiple(context, self.target, files).await
        } else {
            let count = files.len();
            let mut files = files.into_iter();
            match files.next() {
                Some(file) => {
                    if count > 1 {
                        log::warn!("{} takes one file, ignoring {} more", self.target, count - 1);
                    }
                    upload_single(context, self.target, file).await
                }
                None => Ok(()),
            }
        };

        if let Err(err) = &result {
            log::error!("Upload to {} failed: {}", self.target, err);
        }

        self.finish(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use common::context::test_context::{Reply, TestBackend};
    use common::error::FALLBACK_MESSAGE;
    use serde_json::json;

    use super::*;

    fn xlsx(name: &str) -> UploadFile {
        UploadFile::new(name, name.as_bytes().to_vec())
    }

    #[test]
    fn finish_without_begin_is_ignored() {
        let mut zone = DropZone::new(UploadTarget::S3, "S3");
        zone.finish(&Ok(()));

        assert_eq!(zone.status(), UploadStatus::Idle);
        assert!(zone.message().is_empty());
    }

    #[test]
    fn second_begin_is_refused_while_uploading() {
        let mut zone = DropZone::new(UploadTarget::S3, "S3");
        zone.begin().unwrap();

        assert!(zone.begin().is_err());
        assert_eq!(zone.status(), UploadStatus::Uploading);
    }

    #[test]
    fn terminal_states_reenter_uploading() {
        let mut zone = DropZone::new(UploadTarget::Exchange, "Exchange");

        zone.begin().unwrap();
        zone.finish(&Err(ServiceError::Rejected {
            code: 400,
            detail: None,
        }));
        assert_eq!(zone.status(), UploadStatus::Error);
        assert_eq!(zone.message(), FALLBACK_MESSAGE);

        zone.begin().unwrap();
        assert_eq!(zone.status(), UploadStatus::Uploading);
        assert!(zone.message().is_empty());

        zone.finish(&Ok(()));
        assert_eq!(zone.status(), UploadStatus::Done);
        assert_eq!(zone.message(), DONE_MESSAGE);
    }

    #[actix_web::test]
    async fn test_selection_drives_widget_to_done() {
        let backend = TestBackend::builder()
            .route("POST", "/api/upload/hyperv", Reply::json(200, json!({ "status": "ok" })))
            .start()
            .await
            .unwrap();
        let context = backend.context().unwrap();
        let mut zone = DropZone::new(UploadTarget::HyperV, "Hyper-V");

        zone.on_files(&context, vec![xlsx("hyper-v.xlsx"), xlsx("extra.xlsx")])
            .await
            .unwrap();

        assert_eq!(zone.status(), UploadStatus::Done);
        assert_eq!(zone.message(), DONE_MESSAGE);

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].parts.len(), 1);
        assert_eq!(requests[0].parts[0].file_name.as_deref(), Some("hyper-v.xlsx"));
    }

    #[actix_web::test]
    async fn test_rejection_shows_backend_detail() {
        let backend = TestBackend::builder()
            .route(
                "POST",
                "/api/upload/bin-mapping",
                Reply::json(500, json!({ "detail": "bad file" })),
            )
            .start()
            .await
            .unwrap();
        let context = backend.context().unwrap();
        let mut zone = DropZone::new(UploadTarget::BinMapping, "BIN");

        let result = zone
            .on_files(&context, vec![xlsx("a.xlsx"), xlsx("b.xlsx")])
            .await;

        assert!(result.is_err());
        assert_eq!(zone.status(), UploadStatus::Error);
        assert_eq!(zone.message(), "bad file");
        assert_eq!(backend.requests()[0].parts.len(), 2);
    }

    #[actix_web::test]
    async fn test_empty_selection_keeps_state() {
        let backend = TestBackend::builder().start().await.unwrap();
        let context = backend.context().unwrap();
        let mut zone = DropZone::new(UploadTarget::S3, "S3");

        zone.on_files(&context, vec![]).await.unwrap();

        assert_eq!(zone.status(), UploadStatus::Idle);
        assert!(backend.requests().is_empty());
    }
}

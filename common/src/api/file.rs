use reqwest::multipart::{Form, Part};

use crate::{
    api::diagnostic,
    context::Context,
    entities::file::{UploadFile, UploadTarget},
    error::{self, ServiceError},
    services::API_PREFIX,
};

pub fn upload_path(target: UploadTarget) -> String {
    format!("/{}/upload/{}", API_PREFIX, target.as_str())
}

fn file_part(file: UploadFile) -> Part {
    Part::bytes(file.bytes).file_name(file.name)
}

/// Sends exactly one file in a part named `file`.
pub async fn upload_single(
    context: &Context,
    target: UploadTarget,
    file: UploadFile,
) -> error::Result<()> {
    if target.accepts_batch() {
        return Err(ServiceError::local(anyhow::anyhow!(
            "Upload target {} expects a batch of files",
            target
        )));
    }

    log::info!("Uploading {} ({} bytes) to {}", file.name, file.bytes.len(), target);

    let form = Form::new().part("file", file_part(file));
    send_upload(context, target, form).await
}

/// Sends the whole batch in one request, one `files` part per file, in order.
pub async fn upload_multiple(
    context: &Context,
    target: UploadTarget,
    files: Vec<UploadFile>,
) -> error::Result<()> {
    if files.is_empty() {
        return Err(ServiceError::local(anyhow::anyhow!(
            "At least one file is required"
        )));
    }

    if !target.accepts_batch() {
        return Err(ServiceError::local(anyhow::anyhow!(
            "Upload target {} expects a single file",
            target
        )));
    }

    log::info!("Uploading batch of {} files to {}", files.len(), target);

    let form = files
        .into_iter()
        .fold(Form::new(), |form, file| form.part("files", file_part(file)));
    send_upload(context, target, form).await
}

async fn send_upload(context: &Context, target: UploadTarget, form: Form) -> error::Result<()> {
    let response = context
        .make_request()
        .post(upload_path(target))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        log::info!("Upload to {} accepted", target);
        return Ok(());
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = diagnostic(&body);

    log::warn!(
        "Upload to {} rejected with {}: {}",
        target,
        status,
        detail.as_deref().unwrap_or("no diagnostic")
    );

    Err(ServiceError::Rejected {
        code: status.as_u16(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        context::test_context::{Reply, TestBackend, TestBackendBuilder},
        error::FALLBACK_MESSAGE,
    };

    fn accepting_backend() -> TestBackendBuilder {
        UploadTarget::ALL
            .iter()
            .fold(TestBackend::builder(), |builder, target| {
                builder.route(
                    "POST",
                    &upload_path(*target),
                    Reply::json(200, json!({ "status": "ok" })),
                )
            })
    }

    #[actix_web::test]
    async fn test_upload_single_sends_one_file_part() {
        let backend = accepting_backend().start().await.unwrap();
        let context = backend.context().unwrap();

        let targets = [UploadTarget::HyperV, UploadTarget::Exchange, UploadTarget::S3];
        for target in targets {
            let file = UploadFile::new(format!("{}.xlsx", target), target.as_str().as_bytes().to_vec());
            upload_single(&context, target, file).await.unwrap();
        }

        let requests = backend.requests();
        assert_eq!(requests.len(), 3);
        for (request, target) in requests.iter().zip(targets) {
            assert_eq!(request.method, "POST");
            assert_eq!(request.path, upload_path(target));
            assert_eq!(request.parts.len(), 1);

            let part = &request.parts[0];
            assert_eq!(part.name, "file");
            assert_eq!(part.file_name.as_deref(), Some(format!("{}.xlsx", target).as_str()));
            assert_eq!(part.bytes, target.as_str().as_bytes());
        }

        backend.stop().await;
    }

    #[actix_web::test]
    async fn test_upload_multiple_keeps_order() {
        let backend = accepting_backend().start().await.unwrap();
        let context = backend.context().unwrap();

        let files = vec![
            UploadFile::new("b.xlsx", b"second-by-name".to_vec()),
            UploadFile::new("a.xlsx", b"first-by-name".to_vec()),
            UploadFile::new("a.xlsx", b"same name again".to_vec()),
        ];
        upload_multiple(&context, UploadTarget::BinMapping, files.clone())
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/api/upload/bin-mapping");

        let parts = &requests[0].parts;
        assert_eq!(parts.len(), files.len());
        for (part, file) in parts.iter().zip(&files) {
            assert_eq!(part.name, "files");
            assert_eq!(part.file_name.as_deref(), Some(file.name.as_str()));
            assert_eq!(part.bytes, file.bytes);
        }
    }

    #[actix_web::test]
    async fn test_rejected_upload_surfaces_detail() {
        let backend = UploadTarget::ALL
            .iter()
            .fold(TestBackend::builder(), |builder, target| {
                builder.route(
                    "POST",
                    &upload_path(*target),
                    Reply::json(500, json!({ "detail": "bad file" })),
                )
            })
            .start()
            .await
            .unwrap();
        let context = backend.context().unwrap();

        for target in [UploadTarget::HyperV, UploadTarget::Exchange, UploadTarget::S3] {
            let err = upload_single(&context, target, UploadFile::new("x.xlsx", vec![0]))
                .await
                .unwrap_err();
            assert_eq!(err.code(), Some(500));
            assert_eq!(err.user_message(), "bad file");
        }

        let err = upload_multiple(
            &context,
            UploadTarget::BinMapping,
            vec![UploadFile::new("x.xlsx", vec![0])],
        )
        .await
        .unwrap_err();
        assert_eq!(err.user_message(), "bad file");
    }

    #[actix_web::test]
    async fn test_rejected_upload_without_detail_falls_back() {
        let backend = TestBackend::builder()
            .route("POST", "/api/upload/s3", Reply::text(500, "Internal Server Error"))
            .route("POST", "/api/upload/exchange", Reply::json(500, json!({ "error": "x" })))
            .start()
            .await
            .unwrap();
        let context = backend.context().unwrap();

        for target in [UploadTarget::S3, UploadTarget::Exchange] {
            let err = upload_single(&context, target, UploadFile::new("x.xlsx", vec![0]))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Rejected { code: 500, detail: None }));
            assert_eq!(err.user_message(), FALLBACK_MESSAGE);
        }
    }

    #[actix_web::test]
    async fn test_empty_batch_is_refused_locally() {
        let backend = accepting_backend().start().await.unwrap();
        let context = backend.context().unwrap();

        let err = upload_multiple(&context, UploadTarget::BinMapping, vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Local(_)));
        assert!(backend.requests().is_empty());
    }

    #[actix_web::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let context = Context::with_base_url(format!("http://{}", addr)).unwrap();
        let err = upload_single(&context, UploadTarget::HyperV, UploadFile::new("h.xlsx", vec![1]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Transport(_)));
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }
}

//! In-process stand-in for the ingestion backend. Serves canned replies per
//! route and records every request it receives, multipart parts included.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_multipart::{Multipart, MultipartError};
use actix_web::{
    dev::ServerHandle,
    http::{header, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer,
};
use futures::StreamExt;
use serde_json::json;

use crate::{context::Context, entities::report::XLSX_MEDIA_TYPE, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub parts: Vec<RecordedPart>,
}

#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
            delay: None,
        }
    }

    pub fn spreadsheet(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: XLSX_MEDIA_TYPE,
            body,
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct BackendState {
    routes: HashMap<(String, String), Reply>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

#[derive(Default)]
pub struct TestBackendBuilder {
    routes: HashMap<(String, String), Reply>,
}

impl TestBackendBuilder {
    pub fn route(mut self, method: &str, path: &str, reply: Reply) -> Self {
        self.routes
            .insert((method.to_uppercase(), path.to_string()), reply);
        self
    }

    /// Binds an ephemeral port on localhost. Must run inside an actix system,
    /// e.g. an `#[actix_web::test]`.
    pub async fn start(self) -> std::io::Result<TestBackend> {
        let state = Arc::new(BackendState {
            routes: self.routes,
            recorded: Mutex::new(vec![]),
        });

        let data = web::Data::new(Arc::clone(&state));
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(serve))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))?;

        let Some(addr) = server.addrs().first().copied() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "test backend did not bind",
            ));
        };

        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Ok(TestBackend {
            base_url: format!("http://{}", addr),
            state,
            handle,
        })
    }
}

pub struct TestBackend {
    base_url: String,
    state: Arc<BackendState>,
    handle: ServerHandle,
}

impl TestBackend {
    pub fn builder() -> TestBackendBuilder {
        TestBackendBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> error::Result<Context> {
        Context::with_base_url(self.base_url.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.state.recorded.lock() {
            Ok(recorded) => recorded.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn serve(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<Arc<BackendState>>,
) -> HttpResponse {
    let parts = match read_parts(&req, payload).await {
        Ok(parts) => parts,
        Err(err) => {
            return HttpResponse::BadRequest().json(json!({ "detail": err.to_string() }))
        }
    };

    let key = (req.method().as_str().to_string(), req.path().to_string());
    let request = RecordedRequest {
        method: key.0.clone(),
        path: key.1.clone(),
        parts,
    };
    match state.recorded.lock() {
        Ok(mut recorded) => recorded.push(request),
        Err(poisoned) => poisoned.into_inner().push(request),
    }

    let Some(reply) = state.routes.get(&key).cloned() else {
        return HttpResponse::NotFound().json(json!({ "detail": "Not Found" }));
    };

    if let Some(delay) = reply.delay {
        actix_web::rt::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type(reply.content_type)
        .body(reply.body)
}

async fn read_parts(
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<Vec<RecordedPart>, MultipartError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        return Ok(vec![]);
    }

    let mut multipart = Multipart::new(req.headers(), payload);
    let mut parts = vec![];

    while let Some(item) = multipart.next().await {
        let mut field = item?;
        let name = field.name().to_string();
        let file_name = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let mut bytes = vec![];
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        parts.push(RecordedPart {
            name,
            file_name,
            bytes,
        });
    }

    Ok(parts)
}

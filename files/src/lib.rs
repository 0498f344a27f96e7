pub mod handlers;
pub mod service;

pub use handlers::upload::UploadPage;
pub use service::file::{save_artifact, DirectorySink, DownloadSink};
pub use service::upload::{DropZone, UploadStatus};

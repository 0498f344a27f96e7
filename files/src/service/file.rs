use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use common::{entities::report::ExportArtifact, error};
use tempfile::NamedTempFile;

/// Somewhere an export can be handed to the user as a download.
///
/// A download goes through a transient object reference: it is created from
/// the artifact, used once to trigger the save, then revoked.
pub trait DownloadSink {
    type ObjectUrl;

    fn create_object_url(&self, artifact: &ExportArtifact) -> error::Result<Self::ObjectUrl>;

    fn trigger_download(&self, url: &Self::ObjectUrl, file_name: &str) -> error::Result<PathBuf>;

    fn revoke_object_url(&self, url: Self::ObjectUrl);
}

/// Saves `artifact` under its suggested name. Once the object reference has
/// been created it is revoked exactly once, whether or not the save worked.
pub fn save_artifact<S: DownloadSink>(sink: &S, artifact: &ExportArtifact) -> error::Result<PathBuf> {
    let url = sink.create_object_url(artifact)?;
    let saved = sink.trigger_download(&url, &artifact.file_name);
    sink.revoke_object_url(url);
    saved
}

/// Payload staged next to its destination until the download is triggered.
pub struct StagedDownload {
    file: NamedTempFile,
    media_type: &'static str,
}

impl StagedDownload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    type ObjectUrl = StagedDownload;

    fn create_object_url(&self, artifact: &ExportArtifact) -> error::Result<StagedDownload> {
        fs::create_dir_all(&self.dir)?;

        let mut file = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        file.write_all(&artifact.bytes)?;
        file.flush()?;

        log::debug!(
            "Staged {} bytes of {} at {}",
            artifact.bytes.len(),
            artifact.media_type,
            file.path().display()
        );

        Ok(StagedDownload {
            file,
            media_type: artifact.media_type,
        })
    }

    fn trigger_download(&self, url: &StagedDownload, file_name: &str) -> error::Result<PathBuf> {
        let target = self.dir.join(file_name);

        // The workbook only appears under its final name once fully written.
        let mut partial = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        io::copy(&mut File::open(url.path())?, &mut partial)?;
        partial.as_file().sync_all()?;
        partial.persist(&target).map_err(|err| err.error)?;

        log::info!("Saved {} as {}", url.media_type, target.display());

        Ok(target)
    }

    fn revoke_object_url(&self, url: StagedDownload) {
        let path = url.path().to_path_buf();
        if let Err(err) = url.file.close() {
            log::warn!("Could not remove staged download {}: {}", path.display(), err);
        }
    }
}

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{self, ServiceError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    #[serde(rename = "hyperv")]
    HyperV,
    #[serde(rename = "exchange")]
    Exchange,
    #[serde(rename = "s3")]
    S3,
    #[serde(rename = "bin-mapping")]
    BinMapping,
}

impl UploadTarget {
    pub const ALL: [UploadTarget; 4] = [
        UploadTarget::HyperV,
        UploadTarget::Exchange,
        UploadTarget::S3,
        UploadTarget::BinMapping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadTarget::HyperV => "hyperv",
            UploadTarget::Exchange => "exchange",
            UploadTarget::S3 => "s3",
            UploadTarget::BinMapping => "bin-mapping",
        }
    }

    /// Only the BIN mapping endpoint takes several files in one request.
    pub fn accepts_batch(&self) -> bool {
        matches!(self, UploadTarget::BinMapping)
    }

    /// Multipart field name the endpoint reads its files from.
    pub fn field_name(&self) -> &'static str {
        if self.accepts_batch() {
            "files"
        } else {
            "file"
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadTarget {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hyperv" | "hyper-v" => Ok(UploadTarget::HyperV),
            "exchange" => Ok(UploadTarget::Exchange),
            "s3" => Ok(UploadTarget::S3),
            "bin-mapping" | "binmapping" => Ok(UploadTarget::BinMapping),
            _ => Err(anyhow::anyhow!(
                "Upload target invalid value. Accepted values are: hyperv, exchange, s3, bin-mapping"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> error::Result<Self> {
        let path = path.as_ref();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return Err(ServiceError::local(anyhow::anyhow!(
                "Path {} has no file name",
                path.display()
            )));
        };

        let bytes = tokio::fs::read(path).await?;

        Ok(Self::new(name, bytes))
    }
}

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::FootprintError;

/// Where a dataset file lives: over HTTP(S) or on the local disk.
///
/// The published index and tiles are remote, but every location accepted
/// here may also be a plain path or a `file://` URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    pub fn parse(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Remote(url)),
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("Invalid file URL: {}", location))?;
                Ok(Source::Local(path))
            }
            // Anything else (including Windows drive letters parsed as schemes) is a path
            _ => Ok(Source::Local(PathBuf::from(location))),
        }
    }

    fn path(&self) -> &str {
        match self {
            Source::Remote(url) => url.path(),
            Source::Local(path) => path.to_str().unwrap_or_default(),
        }
    }

    /// Gzip is inferred from the extension, the dataset publishes `.csv.gz` tiles.
    pub fn is_gzip(&self) -> bool {
        self.path().ends_with(".gz")
    }

    /// Open the source for buffered reading, decompressing when needed.
    /// Remote bodies are streamed, not loaded into memory.
    pub fn open(&self, client: &Client) -> Result<Box<dyn BufRead>> {
        let raw: Box<dyn Read> = match self {
            Source::Remote(url) => {
                let response = client
                    .get(url.clone())
                    .send()
                    .with_context(|| format!("Failed to send request to {}", url))?;

                if !response.status().is_success() {
                    return Err(FootprintError::HttpStatus {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    }
                    .into());
                }
                Box::new(response)
            }
            Source::Local(path) => Box::new(
                File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?,
            ),
        };

        if self.is_gzip() {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(raw))))
        } else {
            Ok(Box::new(BufReader::new(raw)))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Local(path.to_path_buf())
    }
}

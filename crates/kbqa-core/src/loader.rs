//! Reads uploaded text files from disk into [`Document`]s.
//!
//! Files that are not valid UTF-8 are decoded lossily here so the retrieval
//! engine only ever sees well-formed text.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Document;

const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Debug, Clone)]
pub struct DocumentLoader {
    extensions: Vec<String>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self { extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect() }
    }
}

impl DocumentLoader {
    pub fn new() -> Self { Self::default() }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { extensions: extensions.into_iter().map(Into::into).collect() }
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<Document>> {
        self.load_directory_limited(data_dir, usize::MAX)
    }

    /// Like [`load_directory`](Self::load_directory) but reads at most `limit` files
    /// (sorted by path).
    pub fn load_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Document>> {
        if !data_dir.is_dir() {
            return Err(Error::NotFound(format!("document directory {}", data_dir.display())));
        }
        let mut files = self.list_files(data_dir);
        if files.is_empty() {
            info!(dir = %data_dir.display(), "no text files found");
            return Ok(vec![]);
        }
        if files.len() > limit {
            files.truncate(limit);
            info!(limit, "limited to first files");
        }
        let mut documents = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(n = file_index + 1, of = files.len(), path = %file_path.display(), "loading file");
            documents.push(self.load_file(file_path)?);
        }
        info!(files = documents.len(), dir = %data_dir.display(), "loaded documents");
        Ok(documents)
    }

    /// One file as a document; the id is the file stem, the title the file name.
    pub fn load_file(&self, file_path: &Path) -> Result<Document> {
        let text = read_file_content(file_path)?;
        let id = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string_lossy().to_string());
        let title = file_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());
        Ok(Document::new(id, text).with_title(title))
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            })
            .collect();
        files.sort();
        files
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(file_path).map_err(|e| Error::io(file_path, e))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use crate::error::MercalliError;
use crate::layer::data_provider::PersistentCacheController;

/// Function to modify the default file path of the cache.
pub type FileCachePathModifier = dyn Fn(&str) -> String + Send + Sync;

/// Modifier that removes query parameters from the file path.
///
/// Use it when the URLs contain access tokens that should not end up in the file
/// system. Can be used as a [`FileCachePathModifier`].
pub fn remove_parameters_modifier(path: &str) -> String {
    path.split('?').next().unwrap_or(path).to_owned()
}

/// Stores the cached data as a set of files in the specified folder. File names are
/// generated from the URLs of the entries.
///
/// Currently, there is no eviction mechanism.
pub struct FileCacheController {
    folder_path: PathBuf,
    file_path_modifier: Option<Box<FileCachePathModifier>>,
}

impl PersistentCacheController<str, Bytes> for FileCacheController {
    fn get(&self, key: &str) -> Option<Bytes> {
        let file_path = self.get_file_path(key);
        if let Ok(bytes) = std::fs::read(file_path) {
            Some(bytes.into())
        } else {
            None
        }
    }

    fn insert(&self, key: &str, data: &Bytes) -> Result<(), MercalliError> {
        let file_path = self.get_file_path(key);
        match file_path.parent() {
            Some(folder) => match ensure_folder_exists(folder) {
                Ok(()) => {
                    debug!("Saving entry {key} to the cache file {file_path:?}");
                    std::fs::write(&file_path, data)?;
                    Ok(())
                }
                Err(err) => {
                    debug!(
                        "Failed to add {key} entry to the cache {file_path:?} - failed to create \
                         folder: {err:?}"
                    );
                    Err(err.into())
                }
            },
            None => {
                debug!("Failed to add {key} entry to the cache {file_path:?} - no parent folder");
                Err(MercalliError::Io)
            }
        }
    }
}

impl FileCacheController {
    /// Creates a new instance storing the cache in the given directory.
    ///
    /// The directory is created if it does not exist. Inside it, each entry is stored
    /// in a nested folder structure based on the URL of the entry, after the optional
    /// `file_path_modifier` is applied to it.
    pub fn new(
        path: impl AsRef<Path>,
        file_path_modifier: Option<Box<FileCachePathModifier>>,
    ) -> Result<Self, MercalliError> {
        ensure_folder_exists(path.as_ref())?;
        Ok(Self {
            folder_path: path.as_ref().into(),
            file_path_modifier,
        })
    }

    fn get_file_path(&self, url: &str) -> PathBuf {
        let stripped = if let Some(v) = url.strip_prefix("http://") {
            v
        } else if let Some(v) = url.strip_prefix("https://") {
            v
        } else {
            url
        };

        let path = if let Some(modifier) = &self.file_path_modifier {
            modifier(stripped)
        } else {
            stripped.to_string()
        };

        self.folder_path.join(Path::new(&path))
    }
}

fn ensure_folder_exists(folder_path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(folder_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_roundtrip() {
        let folder = tempfile::TempDir::new().unwrap();
        let cache = FileCacheController::new(folder.path(), None).unwrap();

        let url = "https://example.com/tiles/1/2/3.png";
        assert!(cache.get(url).is_none());

        let data = Bytes::from_static(b"tile bytes");
        cache.insert(url, &data).unwrap();
        assert_eq!(cache.get(url), Some(data));

        assert!(folder
            .path()
            .join("example.com/tiles/1/2/3.png")
            .exists());
    }

    #[test]
    fn modifier_strips_query_parameters() {
        let folder = tempfile::TempDir::new().unwrap();
        let cache = FileCacheController::new(
            folder.path(),
            Some(Box::new(remove_parameters_modifier)),
        )
        .unwrap();

        let url = "https://example.com/tiles/1/2/3.png?access_token=secret";
        cache.insert(url, &Bytes::from_static(b"tile bytes")).unwrap();

        assert!(folder.path().join("example.com/tiles/1/2/3.png").exists());
        assert!(cache.get(url).is_some());
        assert!(cache.get("https://example.com/tiles/1/2/3.png?access_token=other").is_some());
    }
}

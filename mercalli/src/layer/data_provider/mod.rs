//! Providers that load layer data from external sources.

pub mod file_cache;

use std::future::Future;

use bytes::Bytes;

use crate::error::MercalliError;
use crate::render::DecodedImage;

/// Function that converts a data key into the URL the data can be downloaded from.
pub trait UrlSource<Key>: (Fn(&Key) -> String) + Send + Sync {}
impl<Key, T: Fn(&Key) -> String + Send + Sync> UrlSource<Key> for T {}

/// Loads data of type `Data` by a key.
pub trait DataProvider<Key, Data>: Send + Sync {
    /// Loads the data item with the given key.
    fn load(&self, key: &Key) -> impl Future<Output = Result<Data, MercalliError>> + Send;
}

/// Stores data loaded from external sources between application runs.
pub trait PersistentCacheController<Key: ?Sized, Data>: Send + Sync {
    /// Returns the stored data for the key, if any.
    fn get(&self, key: &Key) -> Option<Data>;

    /// Stores the data for the key.
    fn insert(&self, key: &Key, data: &Data) -> Result<(), MercalliError>;
}

/// Loads images over HTTP and uses a persistent cache to save them locally.
pub struct UrlImageProvider<Key> {
    url_source: Box<dyn UrlSource<Key>>,
    cache: Option<Box<dyn PersistentCacheController<str, Bytes>>>,
    client: reqwest::Client,
    offline_mode: bool,
}

impl<Key> UrlImageProvider<Key> {
    /// Creates a new instance without a persistent cache.
    pub fn new(url_source: impl UrlSource<Key> + 'static) -> Self {
        Self {
            url_source: Box::new(url_source),
            cache: None,
            client: new_http_client(),
            offline_mode: false,
        }
    }

    /// Creates a new instance with a persistent cache.
    pub fn new_cached(
        url_source: impl UrlSource<Key> + 'static,
        cache: impl PersistentCacheController<str, Bytes> + 'static,
    ) -> Self {
        Self {
            url_source: Box::new(url_source),
            cache: Some(Box::new(cache)),
            client: new_http_client(),
            offline_mode: false,
        }
    }

    /// If offline mode is enabled, the provider will not attempt to download data from
    /// the network, and will only use its cache as the source of data.
    pub fn set_offline_mode(&mut self, enabled: bool) {
        if enabled && self.cache.is_none() {
            log::warn!(
                "Offline mode for url image provider is enabled, but no persistent cache is \
                 configured. No data will be available for this provider."
            );
        }

        self.offline_mode = enabled;
    }

    fn check_offline_mode(&self) -> Result<(), MercalliError> {
        if self.offline_mode {
            Err(MercalliError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn load_bytes(&self, url: &str) -> Result<Bytes, MercalliError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            log::info!("Failed to load {url}: {}", response.status());
            return Err(MercalliError::Io);
        }

        Ok(response.bytes().await?)
    }
}

impl<Key: Send + Sync> DataProvider<Key, DecodedImage> for UrlImageProvider<Key> {
    async fn load(&self, key: &Key) -> Result<DecodedImage, MercalliError> {
        let url = (self.url_source)(key);

        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(&url) {
                return DecodedImage::new(&data);
            }
        }

        self.check_offline_mode()?;

        log::info!("Loading {url}");
        let data = self.load_bytes(&url).await?;

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.insert(&url, &data) {
                log::warn!("Failed to write persistent cache entry: {error:?}");
            }
        }

        DecodedImage::new(&data)
    }
}

fn new_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("mercalli/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to initialize http client")
}

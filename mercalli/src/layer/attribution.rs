/// Attribution of the layer data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    text: String,
    url: Option<String>,
}

impl Attribution {
    /// Creates a new attribution.
    pub fn new(text: String, url: Option<String>) -> Self {
        Self { text, url }
    }

    /// Text to be displayed over the map.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// Web page of the data source.
    pub fn get_url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

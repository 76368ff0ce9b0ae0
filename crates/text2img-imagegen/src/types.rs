/// Raw image returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Encoded image bytes as delivered by the provider
    pub data: Vec<u8>,
    /// File extension including the dot (e.g. ".jpg")
    pub extension: &'static str,
}

impl GeneratedImage {
    pub fn jpg(data: Vec<u8>) -> Self {
        Self { data, extension: ".jpg" }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self { data, extension: ".png" }
    }
}

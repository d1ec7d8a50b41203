use serde::Deserialize;

/// Root of the legacy XML search API
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "subtitle", default)]
    pub subtitles: Vec<Subtitle>,
}

/// One `<subtitle>` element; numbers arrive as text and are parsed leniently.
///
/// Missing identity fields default to empty so one bad record can't sink the page.
#[derive(Debug, Deserialize)]
pub struct Subtitle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "uploaderName", default)]
    pub uploader_name: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub fps: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub downloads: Option<String>,
    /// Unix timestamp of the upload
    #[serde(default)]
    pub time: Option<String>,
}

use std::path::Path;

use anyhow::Context;
use serde::de::IgnoredAny;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub storyline: String,
    pub poster_image_url: String,
    pub trailer_youtube_url: String,
}

/// One record of the movies file: title, storyline, poster URL, trailer URL
/// and an IMDb rating that the page does not show.
#[derive(Deserialize)]
struct MovieRecord(String, String, String, String, IgnoredAny);

impl From<MovieRecord> for Movie {
    fn from(MovieRecord(title, storyline, poster_image_url, trailer_youtube_url, _): MovieRecord) -> Self {
        Self {
            title,
            storyline,
            poster_image_url,
            trailer_youtube_url,
        }
    }
}

pub fn parse_movies(json: &str) -> serde_json::Result<Vec<Movie>> {
    let records: Vec<MovieRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Movie::from).collect())
}

pub fn load_movies(path: &Path) -> anyhow::Result<Vec<Movie>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_movies(&json).with_context(|| format!("Invalid movie list in {}", path.display()))
}

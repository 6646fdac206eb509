use std::path::Path;
use std::process::Command;

use anyhow::Context;
use askama::Template;

use super::media::Movie;
use super::trailer::extract_youtube_id;

pub struct MovieTile {
    pub title: String,
    pub storyline: String,
    pub poster_image_url: String,
    pub trailer_youtube_id: Option<String>,
}

impl From<&Movie> for MovieTile {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            storyline: movie.storyline.clone(),
            poster_image_url: movie.poster_image_url.clone(),
            trailer_youtube_id: extract_youtube_id(&movie.trailer_youtube_url).map(str::to_string),
        }
    }
}

#[derive(Template)]
#[template(path = "movies/page.html")]
pub struct MoviePageTemplate {
    pub tiles: Vec<MovieTile>,
}

/// Render the page. The last movie in the list is shown first.
pub fn render_page(movies: &[Movie]) -> askama::Result<String> {
    let tiles = movies.iter().rev().map(MovieTile::from).collect();
    MoviePageTemplate { tiles }.render()
}

pub fn write_page(movies: &[Movie], output: &Path) -> anyhow::Result<()> {
    let html = render_page(movies).context("Failed to render movie page")?;
    std::fs::write(output, html)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote {} movies to {}", movies.len(), output.display());
    Ok(())
}

/// Open `path` with the desktop's default handler.
pub fn open_in_viewer(path: &Path) -> anyhow::Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    let status = command
        .arg(&path)
        .status()
        .context("Failed to launch the default viewer")?;
    if !status.success() {
        anyhow::bail!("Viewer exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, trailer: &str) -> Movie {
        Movie {
            title: title.into(),
            storyline: format!("{} storyline", title),
            poster_image_url: format!("https://img.example/{}.jpg", title),
            trailer_youtube_url: trailer.into(),
        }
    }

    #[test]
    fn tiles_render_in_reverse_order() {
        let html = render_page(&[
            movie("First", "https://youtu.be/one"),
            movie("Second", "https://youtu.be/two"),
        ])
        .unwrap();

        let first = html.find("<h3>First</h3>").unwrap();
        let second = html.find("<h3>Second</h3>").unwrap();
        assert!(second < first);
    }

    #[test]
    fn trailer_button_only_when_id_found() {
        let html = render_page(&[
            movie("Linked", "https://www.youtube.com/watch?v=abc123&t=5"),
            movie("Unlinked", "https://example.com/trailer"),
        ])
        .unwrap();

        assert!(html.contains(r#"data-trailer-youtube-id="abc123""#));
        assert_eq!(html.matches("data-trailer-youtube-id=").count(), 1);
    }

    #[test]
    fn text_is_escaped() {
        let html = render_page(&[movie("<Tom & Jerry>", "")]).unwrap();
        assert!(html.contains("&lt;Tom &amp; Jerry&gt;"));
        assert!(!html.contains("<Tom & Jerry>"));
    }

    #[test]
    fn write_page_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pagina.html");
        write_page(&[movie("Only", "https://youtu.be/x")], &output).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Only storyline"));
    }
}

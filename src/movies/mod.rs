//! Static movie trailer page generator.
//!
//! Reads a list of movies from JSON, renders one tile per movie with its
//! poster, storyline and a trailer button, and writes a self-contained HTML
//! page.

pub mod media;
pub mod page;
pub mod trailer;

pub use media::{load_movies, Movie};
pub use page::{open_in_viewer, render_page, write_page};
pub use trailer::extract_youtube_id;

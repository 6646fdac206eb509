use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spareparts::movies;

#[derive(Parser, Debug)]
#[command(name = "movie-page", about = "Render a movie trailer page")]
struct Cli {
    /// JSON list of [title, storyline, poster, trailer, rating] records
    #[arg(short, long, default_value = "movies.json")]
    input: PathBuf,

    /// Where to write the page
    #[arg(short, long, default_value = "pagina.html")]
    output: PathBuf,

    /// Write the page without opening it
    #[arg(long)]
    no_open: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let movies = movies::load_movies(&cli.input)?;
    movies::write_page(&movies, &cli.output)?;

    if !cli.no_open {
        movies::open_in_viewer(&cli.output)?;
    }

    Ok(())
}

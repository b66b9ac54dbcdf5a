//! Command-line front end for epublinks.
//!
//! Prints the links of a local or remote EPUB to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use epublinks::{Archive, Cli, HttpFetcher, ReadAt, extract_links, select_documents};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.is_http_url() {
        let fetcher = HttpFetcher::new(cli.timeout(), cli.max_retry)?;
        let archive = Archive::fetch(&fetcher, &cli.source).await?;
        process_archive(archive, &cli).await
    } else {
        let archive = Archive::open_path(&cli.source).await?;
        process_archive(archive, &cli).await
    }
}

/// Run the requested mode, then close the archive whatever the outcome.
async fn process_archive<R: ReadAt>(archive: Archive<R>, cli: &Cli) -> Result<()> {
    let output = render(&archive, cli).await;
    archive.close();

    let mut stdout = tokio::io::stdout();
    stdout.write_all(output?.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn render<R: ReadAt>(archive: &Archive<R>, cli: &Cli) -> Result<String> {
    if cli.list {
        let selection = select_documents(archive, &cli.fragment)?;
        return Ok(lines(selection.iter().map(|e| e.name())));
    }

    let links = extract_links(archive, &cli.fragment)
        .await
        .with_context(|| format!("extracting links from {}", archive.location()))?;

    if cli.count {
        Ok(format!("{}\n", links.len()))
    } else {
        Ok(lines(links.iter().map(String::as_str)))
    }
}

fn lines<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(item);
        out.push('\n');
    }
    out
}

use std::time::Duration;

use clap::Parser;

use crate::pipeline::SECTION_FRAGMENT;

#[derive(Parser, Debug)]
#[command(name = "epublinks")]
#[command(version)]
#[command(about = "Extract hyperlinks from the section documents of an EPUB", long_about = None)]
#[command(after_help = "Examples:\n  \
  epublinks book.epub                      print every link, one per line\n  \
  epublinks -c book.epub                   print the number of links\n  \
  epublinks -f OEBPS/Text/ book.epub       read every document under OEBPS/Text/\n  \
  epublinks https://example.com/book.epub  fetch the book first\n\n\
  Set RUST_LOG (e.g. RUST_LOG=epublinks=debug) to override -v.")]
pub struct Cli {
    /// EPUB file path or HTTP URL
    #[arg(value_name = "EPUB")]
    pub source: String,

    /// Only read entries whose name contains this fragment
    #[arg(short = 'f', long, value_name = "FRAGMENT", default_value = SECTION_FRAGMENT)]
    pub fragment: String,

    /// Print the number of links instead of the links
    #[arg(short = 'c', long)]
    pub count: bool,

    /// List the selected entries instead of extracting links
    #[arg(short = 'l', long)]
    pub list: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Retries after HTTP connection failures or timeouts
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_retry: u32,

    /// Verbose logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "epublinks=warn",
            1 => "epublinks=info",
            2 => "epublinks=debug",
            _ => "epublinks=trace",
        }
    }
}

use clap::{Parser, ValueEnum};
use feed_scout::platforms::PlatformKind;

#[derive(Parser, Debug)]
#[command(name = "feed-scout")]
#[command(about = "Scans a social feed for leads and sends each new post for scoring")]
#[command(version)]
pub struct Args {
    /// Feed URL to open (group page, feed, ...)
    pub url: String,

    /// WebDriver server driving the browser
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Scanner script URL carrying cid, bid and tok; defaults to the script tag on the page
    #[arg(long)]
    pub script_url: Option<String>,

    /// Host platform
    #[arg(short, long, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Maximum number of posts to send for scoring
    #[arg(long)]
    pub max_posts: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Facebook,
    Linkedin,
}

/// Convert from CLI argument platform to the library platform
pub fn convert_platform(arg: PlatformArg) -> PlatformKind {
    match arg {
        PlatformArg::Facebook => PlatformKind::Facebook,
        PlatformArg::Linkedin => PlatformKind::LinkedIn,
    }
}

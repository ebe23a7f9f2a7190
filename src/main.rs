use clap::Parser;
use feed_scout::{HttpScorer, ScanAgent, ScanConfig, ScanEvent, StartError, WebDriverDocument};
use std::sync::Arc;

mod args;
use args::{Args, convert_platform};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    if let Some(platform) = args.platform {
        config.platform = convert_platform(platform);
    }
    if let Some(max_posts) = args.max_posts {
        config.max_posts = max_posts;
    }

    ::log::info!("Opening {} via {}", args.url, args.webdriver_url);
    let document = WebDriverDocument::open(&args.webdriver_url, &args.url).await?;
    let scorer = HttpScorer::new(config.request_timeout())?;

    let mut agent = ScanAgent::new(Arc::new(document.clone()), Arc::new(scorer)).with_config(config);
    if let Some(script_url) = args.script_url {
        agent = agent.with_script_url(script_url);
    }

    let (handle, mut rx) = match agent.start().await {
        Ok(started) => started,
        Err(StartError::AlreadyActive) => {
            println!("A scan is already running on this page.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Scanning. Press Ctrl-C to stop, again to close.");

    let mut interrupts = 0;
    let mut stopped = false;
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(ScanEvent::Progress(progress)) => println!("{}", progress),
                Some(ScanEvent::Resolved { text, outcome }) => {
                    ::log::debug!("{:?}: {}", outcome, text);
                }
                Some(ScanEvent::Stopped(reason)) => ::log::debug!("Stop event: {:?}", reason),
                Some(ScanEvent::Closed) | None => break,
            },
            // Events may be dropped under load; the run state never is
            state = handle.wait_stopped(), if !stopped => {
                ::log::info!("{:?}, waiting for pending checks", state);
                stopped = true;
            }
            _ = handle.wait_idle(), if stopped => {
                println!("{}", handle.progress());
                handle.close().await;
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                interrupts += 1;
                if interrupts == 1 {
                    handle.stop();
                } else {
                    handle.close().await;
                    break;
                }
            }
        }
    }

    if let Err(e) = document.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }
    Ok(())
}

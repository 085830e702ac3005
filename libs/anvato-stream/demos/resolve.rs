use std::time::Duration;

use anvato_stream::{get_streams, Config};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let page_url = args
        .next()
        .unwrap_or_else(|| "https://pix11.com/live/".to_string());
    let quality = args.next();

    let config = Config::load();
    let live = match get_streams(&config, &page_url).await {
        Ok(live) => live,
        Err(e) if e.is_no_stream() => {
            log::error!("No stream available on {page_url}: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("{}: {:?}", live.title, live.streams.keys().collect::<Vec<_>>());

    let Some(stream) = quality
        .as_deref()
        .and_then(|q| live.streams.get(q))
        .or_else(|| live.streams.values().last())
    else {
        log::error!("No stream available on {page_url}");
        return Ok(());
    };

    log::info!("Opened {}: {}", stream.quality(), stream.open().await);
    for _ in 0..20 {
        sleep(Duration::from_secs(10)).await;
        log::info!("{}", stream.url().await);
    }

    Ok(())
}

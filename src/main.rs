use webroot::config::Config;
use webroot::logging;
use webroot::server::Listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    logging::init(&cfg)?;

    let listener = Listener::bind(&cfg).await?;

    tokio::select! {
        res = listener.serve() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

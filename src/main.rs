#[tokio::main]
async fn main() {
    if let Err(e) = ytmusic_downloader_lib::run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

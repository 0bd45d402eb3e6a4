#[tokio::main]
async fn main() -> anyhow::Result<()> {
    subhook_server::start().await
}

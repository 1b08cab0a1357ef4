#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fukushu_backend::run().await
}

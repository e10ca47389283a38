#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tubefocus_lib::run().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ergowise_lib::run().await
}

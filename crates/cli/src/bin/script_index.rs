use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    script_index_cli::main_entry().await
}

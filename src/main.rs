#[tokio::main]
async fn main() {
    if let Err(e) = reportforge::run().await {
        eprintln!("reportforge failed to start: {e}");
        std::process::exit(1);
    }
}

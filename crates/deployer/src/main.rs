#[tokio::main]
async fn main() {
    deployer::start(std::env::args()).await;
}

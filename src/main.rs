use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = keygate::cli::Cli::parse();
    if let Err(e) = keygate::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

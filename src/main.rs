// src/main.rs

use assetdag::{cli, logging, run};

// Tasks share one cooperative loop; blocking file work goes through
// `spawn_blocking`.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("assetdag error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

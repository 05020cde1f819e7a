use clap::Parser;
use std::sync::Arc;
use waterscan::menu::GOODBYE;
use waterscan::{Cli, Config, Menu, Workflow};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Arc::new(Config::from(Cli::parse()));
    log::debug!("starting with {:?}", config.analysis);

    let mut menu = Menu::stdin(Workflow::with_defaults(config)?);
    tokio::select! {
        outcome = menu.run() => {
            outcome?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}", GOODBYE);
            std::process::exit(0);
        }
    }

    Ok(())
}

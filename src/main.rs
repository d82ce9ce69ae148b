use clap::Parser;

use oceansim::{
    app::OceanApp,
    config::{AppConfig, Args},
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("oceansim=info"))
        .init();

    let config = AppConfig::from(Args::parse());
    log::info!("loading resources from '{}'", config.resources().display());

    OceanApp::new(config)?.run()
}

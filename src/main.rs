use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::Path;

fn main() -> Result<()> {
    let cfg = lava_blob::config::Config::parse();
    if cfg.dump_config {
        let lamp = cfg.lamp_config().context("load lamp configuration")?;
        print!("{}", lamp.to_text());
        return Ok(());
    }

    if let Some(path) = cfg.log_file.as_deref() {
        init_logging(path)?;
    }
    lava_blob::app::run(cfg)
}

/// Log to a file only; anything on stderr would tear through the alternate screen.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

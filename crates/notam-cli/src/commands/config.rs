use anyhow::Result;
use notam_config::Config;

pub fn handle(config: &Config) -> Result<()> {
    println!("# {}", Config::config_path().display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

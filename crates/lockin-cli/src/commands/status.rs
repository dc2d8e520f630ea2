use lockin_core::error::Result;
use lockin_core::Config;

/// Print the state `lockin run` would start from.
pub fn run() -> Result<()> {
    let config = Config::load()?;
    let controller = super::build_controller(&config, false)?;
    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    Ok(())
}

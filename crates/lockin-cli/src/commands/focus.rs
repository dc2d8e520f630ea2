use lockin_core::error::Result;
use lockin_core::{Config, FocusSignal};
use serde_json::json;

use super::FocusSource;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    let output = match super::focus_source(&config.focus)? {
        FocusSource::Static(signal) => json!({
            "source": config.focus.source,
            "reading": signal.read(),
        }),
        FocusSource::Http(client) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(client.fetch());
            match outcome {
                Ok(focused) => json!({
                    "source": config.focus.source,
                    "endpoint": client.endpoint().as_str(),
                    "reading": lockin_core::FocusReading::from_focused(focused),
                }),
                Err(e) => json!({
                    "source": config.focus.source,
                    "endpoint": client.endpoint().as_str(),
                    "reading": lockin_core::FocusReading::Unavailable,
                    "error": e.to_string(),
                }),
            }
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

use lockin_core::error::Result;
use lockin_core::{Database, DayClock, LocalDay};

pub fn run() -> Result<()> {
    let db = Database::open()?;
    let summary = db.day_summary(LocalDay.today())?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

//! Manifest listing (`dv months`).

use anyhow::Result;

use crate::config::Config;
use crate::source::open_source;

pub async fn run_months(config: &Config) -> Result<()> {
    let source = open_source(config)?;
    let manifest = source.fetch_manifest(&config.data.manifest).await?;
    let default_month = manifest.default_file().map(|f| f.month.clone());

    println!("Updated: {}", manifest.updated);
    if manifest.files.is_empty() {
        println!("No months listed.");
        return Ok(());
    }

    println!("{:<12} {:<10} PATH", "MONTH", "DEFAULT");
    for file in &manifest.files {
        let marker = if Some(&file.month) == default_month.as_ref() {
            "yes"
        } else {
            ""
        };
        println!("{:<12} {:<10} {}", file.month, marker, file.path);
    }

    Ok(())
}

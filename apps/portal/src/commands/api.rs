use crate::context::{Options, Portal};
use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use colored::Colorize;
use portal_settings::Settings;
use std::io::Write;
use std::path::Path;

/// Parses `key=value` into a query pair.
pub fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn get(
    settings: Settings,
    options: &Options,
    service: &str,
    query: &[(String, String)],
) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.start().await?;
    let client = portal.web_api()?;

    let pairs: Vec<(&str, &str)> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let message = format!("GET {service} failed");
    let value: serde_json::Value = client.get(service, &pairs, Some(&message)).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub async fn download(
    settings: Settings,
    options: &Options,
    service: &str,
    output: &Path,
) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.start().await?;
    let client = portal.web_api()?;

    let message = format!("download of {service} failed");
    let bytes = client.download_file(service, &[], Some(&message)).await?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    AtomicFile::new(output, AllowOverwrite)
        .write(|f| f.write_all(&bytes))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} saved {} bytes to {}",
        "OK".green(),
        bytes.len(),
        output.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_parse() {
        assert_eq!(
            parse_query_pair("top=10").unwrap(),
            ("top".to_string(), "10".to_string())
        );
        assert_eq!(
            parse_query_pair("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_query_pair("novalue").is_err());
        assert!(parse_query_pair("=x").is_err());
    }
}

//! CLI probe for `licita_core`.
//!
//! Prints the core version and the effective sync configuration. An optional
//! first argument names a JSON config file; without it, or with `-`, defaults
//! are used.
//! An optional second argument is an ether amount, echoed in wei and back in
//! canonical ether text the way budgets travel to and from the ledger.

use licita_core::model::amount::{format_ether, parse_ether};
use licita_core::SyncConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    match run(args.next(), args.next()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("licita: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>, amount: Option<String>) -> Result<(), String> {
    let config = match config_path.as_deref() {
        Some("-") | None => SyncConfig::default(),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read `{path}`: {err}"))?;
            SyncConfig::from_json(&raw).map_err(|err| err.to_string())?
        }
    };
    let amount = amount.as_deref().map(describe_amount).transpose()?;

    println!("licita_core ping={}", licita_core::ping());
    println!("licita_core version={}", licita_core::core_version());
    println!("scan_bound={}", config.scan_bound);
    println!("activity_limit={}", config.activity_limit);
    println!("activity_policy={:?}", config.activity_policy);
    if let Some(line) = amount {
        println!("{line}");
    }
    Ok(())
}

/// `amount_wei=<wei> amount_ether=<canonical ether>` for ether text.
fn describe_amount(text: &str) -> Result<String, String> {
    let wei = parse_ether(text).map_err(|err| err.to_string())?;
    Ok(format!("amount_wei={wei} amount_ether={}", format_ether(wei)))
}

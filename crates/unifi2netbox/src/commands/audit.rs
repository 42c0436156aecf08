//! `audit` -- created-object ids from a sync log.

use unifi2netbox_core::extract_success_ids;

use crate::cli::AuditArgs;
use crate::error::CliError;

pub fn handle(args: &AuditArgs) -> Result<(), CliError> {
    let ids = extract_success_ids(&args.log_file).map_err(|source| CliError::Read {
        path: args.log_file.display().to_string(),
        source,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
    } else {
        println!("device: {}", join(&ids.devices));
        println!("ip address: {}", join(&ids.ip_addresses));
    }
    Ok(())
}

fn join(ids: &[u64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

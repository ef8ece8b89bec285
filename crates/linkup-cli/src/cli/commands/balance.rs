//! `linkup balance`

use super::connect;
use crate::cli::ConnectionArgs;
use anyhow::Result;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub fn run_balance(conn: &ConnectionArgs) -> Result<()> {
    let session = connect(conn, DEFAULT_TIMEOUT)?;
    let balance = session.client.balance(&session.ctx)?;
    println!("{}", serde_json::to_string_pretty(&balance)?);
    Ok(())
}

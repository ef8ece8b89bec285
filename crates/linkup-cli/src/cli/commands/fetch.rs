//! `linkup fetch --url <url>`

use super::connect;
use super::output::render_payload;
use crate::cli::FetchArgs;
use anyhow::Result;
use linkup_core::FetchRequest;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn run_fetch(args: &FetchArgs) -> Result<()> {
    let session = connect(&args.conn, DEFAULT_TIMEOUT)?;
    let request = FetchRequest {
        url: args.url.trim().to_string(),
        include_raw_html: args.raw_html,
        render_js: args.render,
        extract_images: args.images,
    };
    let resp = session.client.fetch(&session.ctx, &request)?;
    println!("{}", render_payload(resp.raw_json()));
    Ok(())
}

//! `linkup search -q <text>`

use super::output::{render_payload, split_csv};
use super::connect;
use crate::cli::SearchArgs;
use anyhow::Result;
use linkup_core::SearchRequest;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_search_request(args: &SearchArgs) -> SearchRequest {
    SearchRequest {
        q: args.query.clone(),
        depth: args.depth,
        output_type: args.output_type,
        include_images: args.images,
        from_date: args.from_date.clone().filter(|d| !d.is_empty()),
        to_date: args.to_date.clone().filter(|d| !d.is_empty()),
        exclude_domains: split_csv(args.exclude.as_deref()),
        include_domains: split_csv(args.include.as_deref()),
        include_inline_citations: args.inline,
        structured_output_schema: args.schema.clone().filter(|s| !s.is_empty()),
        include_sources: args.sources,
    }
}

pub fn run_search(args: &SearchArgs) -> Result<()> {
    let session = connect(&args.conn, DEFAULT_TIMEOUT)?;
    let request = build_search_request(args);
    tracing::debug!(
        "search: depth={} output={} q={:?}",
        request.depth,
        request.output_type,
        request.q
    );
    let resp = session.client.search(&session.ctx, &request)?;
    println!("{}", render_payload(resp.raw_json()));
    Ok(())
}

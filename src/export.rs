use std::io::{Read, Write};
use std::path::Path;
use std::pin::pin;
use std::time::Instant;

use futures_util::TryStreamExt;
use jetnet::paginate::DEFAULT_PAGE_SIZE;
use jetnet::{Jetnet, PageOptions, PagedEndpoint};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::ExportArgs;
use crate::error::CliError;
use crate::output::write_ndjson;

/// Endpoint path and its default page size.
#[derive(Debug, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: String,
    pub default_page_size: u32,
}

/// A raw path starts with `/`; anything else must name a paged endpoint.
pub fn resolve_endpoint(endpoint: &str) -> Result<ExportTarget, CliError> {
    if endpoint.starts_with('/') {
        return Ok(ExportTarget {
            path: endpoint.trim_end_matches('/').to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
        });
    }
    let named: PagedEndpoint = endpoint.parse()?;
    Ok(ExportTarget {
        path: named.path().to_string(),
        default_page_size: named.default_page_size(),
    })
}

/// Request body from a file, `-` for stdin, or `{}`.
pub fn read_body(path: Option<&Path>) -> Result<Value, CliError> {
    let text = match path {
        None => return Ok(Value::Object(Default::default())),
        Some(p) if p == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
        Some(p) => std::fs::read_to_string(p)?,
    };
    parse_body(&text)
}

fn parse_body(text: &str) -> Result<Value, CliError> {
    let body: Value = serde_json::from_str(text)?;
    if !body.is_object() {
        return Err(CliError::Usage("request body must be a JSON object".into()));
    }
    Ok(body)
}

/// Stream every page to stdout as NDJSON until done or cancelled.
pub async fn run_export(
    client: &Jetnet,
    args: &ExportArgs,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let target = resolve_endpoint(&args.endpoint)?;
    let body = read_body(args.body.as_deref())?;
    let options = PageOptions::new(args.page_size.unwrap_or(target.default_page_size))
        .with_max_pages(Some(args.max_pages));
    options.validate()?;

    info!(
        endpoint = %target.path,
        page_size = options.page_size,
        max_pages = args.max_pages,
        "export starting"
    );

    let started = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut buf = Vec::with_capacity(4096);
    let mut records = 0usize;
    let mut pages_fetched = 0u32;
    let mut declared = 0u64;

    let mut pages = pin!(client.pages(&target.path, &body, options));
    loop {
        let page = tokio::select! {
            _ = cancel.cancelled() => {
                warn!(pages_fetched, records, "export cancelled");
                out.flush()?;
                return Err(CliError::Cancelled);
            }
            page = pages.try_next() => page?,
        };
        let Some(page) = page else { break };

        write_ndjson(&mut out, &page.records, &mut buf)?;
        out.flush()?;
        pages_fetched += 1;
        records += page.records.len();
        declared = page.declared_total_pages;
    }

    info!(
        endpoint = %target.path,
        pages_fetched,
        declared_total_pages = declared,
        records,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "export complete"
    );
    Ok(())
}

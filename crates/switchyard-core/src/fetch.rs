//! Config Fetcher: drain a paginated store listing.

use crate::error::Result;
use crate::model::ConfigEntry;
use crate::ports::ConfigStore;

/// Fetch every entry under `namespace`, following continuation tokens.
///
/// Pages are requested strictly in order; page N+1 needs the token from
/// page N. An empty namespace yields an empty vector.
pub async fn fetch_entries(store: &dyn ConfigStore, namespace: &str) -> Result<Vec<ConfigEntry>> {
    let mut entries = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list_entries(namespace, next_token.as_deref()).await?;
        pages += 1;
        entries.extend(page.entries);

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    log::debug!(
        "Fetched {} config entries under '{namespace}' in {pages} page(s)",
        entries.len()
    );
    Ok(entries)
}

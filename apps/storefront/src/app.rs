//! Wires backend, cache, session and directory together and logs the result.

use std::sync::Arc;
use std::time::Duration;

use apkstore_backend::{HttpBackend, StaticIdentity};
use apkstore_directory::{CategoryFilter, DirectoryView, ListingDirectory};
use apkstore_protocol::{ListingEntry, Principal, format_file_size};
use apkstore_query::{QueryState, StoreClient};
use apkstore_session::Session;

use crate::config::StoreConfig;

/// Fetches the listing directory once and logs it.
pub async fn run(config: StoreConfig) -> anyhow::Result<()> {
    let backend = HttpBackend::with_timeout(
        &config.backend_url,
        config.api_token.as_deref(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let client = Arc::new(StoreClient::new(Arc::new(backend)));

    if let Some(principal) = config.principal.as_deref() {
        let identity = Arc::new(StaticIdentity::new(Principal::new(principal)));
        let session = Session::new(identity, Arc::clone(&client));
        session.login().await?;
        report_caller(&session).await;
    }

    let view = load_directory(&client, &config).await?;
    report_directory(&view, config.category);
    Ok(())
}

/// Loads listings through the cache and applies the configured search and tab.
async fn load_directory(
    client: &StoreClient,
    config: &StoreConfig,
) -> anyhow::Result<DirectoryView> {
    let listings = client.listings().await?;
    let mut directory = ListingDirectory::new(listings);
    directory.set_query(config.search.as_str());
    directory.set_filter(config.category);
    Ok(directory.view())
}

async fn report_caller(session: &Session) {
    let client = session.client();
    match client.is_admin().await {
        QueryState::Success(admin) => tracing::info!(admin, "caller role resolved"),
        QueryState::Error(e) => tracing::warn!(error = %e, "could not resolve caller role"),
        _ => {}
    }
    client.caller_profile().await;
    if session.should_prompt_profile_setup() {
        tracing::info!("no profile yet, profile setup required");
    }
    tracing::info!(can_upload = session.can_upload(), "session ready");
}

fn report_directory(view: &DirectoryView, selected: CategoryFilter) {
    for tab in CategoryFilter::TABS {
        tracing::info!(
            tab = tab.label(),
            count = view.counts.get(tab),
            selected = tab == selected,
            "category"
        );
    }

    if let Some(empty) = view.empty_state() {
        tracing::info!(hint = empty.hint(), "{}", empty.title());
        return;
    }

    for entry in &view.visible {
        tracing::info!("{}", listing_line(entry));
    }
    tracing::info!("{}", view.showing_summary());
}

fn listing_line((id, listing): &ListingEntry) -> String {
    format!(
        "[{}] {} v{} ({}, {})",
        id,
        listing.name,
        listing.version,
        listing.category.label(),
        format_file_size(listing.file_size)
    )
}

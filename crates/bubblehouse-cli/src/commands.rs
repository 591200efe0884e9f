//! Command handlers. Output goes to stdout; logs go to stderr.

use std::path::Path;

use bubblehouse_catalog::{CatalogExtractor, CatalogSource, MemoryCatalog, WooCommerceSource};
use bubblehouse_core::{AppConfig, SettingsSource, SyncPayload};
use bubblehouse_sync::{embed_target, issue_token, EmbedTarget, SyncRunner};

/// The catalog a command reads from.
enum Catalog {
    File(MemoryCatalog),
    Store(WooCommerceSource),
}

fn open_catalog(config: &AppConfig, catalog_file: Option<&Path>) -> anyhow::Result<Catalog> {
    if let Some(path) = catalog_file {
        return Ok(Catalog::File(MemoryCatalog::from_json_file(path)?));
    }
    let woocommerce = config.woocommerce.as_ref().ok_or_else(|| {
        anyhow::anyhow!("WOOCOMMERCE_URL is not set; pass --catalog-file or configure the store")
    })?;
    Ok(Catalog::Store(WooCommerceSource::new(
        woocommerce,
        config.sync_timeout_secs,
    )?))
}

pub(crate) async fn run_sync(
    config: &AppConfig,
    settings: SettingsSource,
    catalog_file: Option<&Path>,
) -> anyhow::Result<()> {
    match open_catalog(config, catalog_file)? {
        Catalog::File(catalog) => sync_once(config, catalog, settings).await,
        Catalog::Store(store) => sync_once(config, store, settings).await,
    }
}

async fn sync_once<S: CatalogSource>(
    config: &AppConfig,
    source: S,
    settings: SettingsSource,
) -> anyhow::Result<()> {
    let runner = SyncRunner::new(
        source,
        settings,
        config.api_version.clone(),
        config.sync_timeout_secs,
    )?;
    let outcome = runner.run_cycle().await;
    if !outcome.is_delivered() {
        anyhow::bail!("sync failed: {outcome}");
    }
    println!("{outcome}");
    Ok(())
}

pub(crate) async fn run_preview(
    config: &AppConfig,
    catalog_file: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let payload = match open_catalog(config, catalog_file)? {
        Catalog::File(catalog) => extract(&catalog).await?,
        Catalog::Store(store) => extract(&store).await?,
    };
    println!("{}", render_payload(&payload, compact)?);
    Ok(())
}

async fn extract<S: CatalogSource>(source: &S) -> anyhow::Result<SyncPayload> {
    Ok(CatalogExtractor::new(source).extract_payload().await?)
}

pub(crate) fn render_payload(payload: &SyncPayload, compact: bool) -> anyhow::Result<String> {
    Ok(if compact {
        serde_json::to_string(payload)?
    } else {
        serde_json::to_string_pretty(payload)?
    })
}

pub(crate) fn run_token(
    settings: &SettingsSource,
    subject: Option<&str>,
    validity_secs: i64,
) -> anyhow::Result<()> {
    let settings = settings.load()?;
    let subject = subject.unwrap_or(&settings.shop_slug);
    let token = issue_token(
        subject,
        &settings.key_id,
        &settings.shared_secret_base64,
        validity_secs,
    )?;
    println!("{token}");
    Ok(())
}

pub(crate) fn run_embed(
    config: &AppConfig,
    settings: &SettingsSource,
    page: &str,
    customer_id: Option<&str>,
) -> anyhow::Result<()> {
    let settings = match settings.load() {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(error = %e, "embed: settings unavailable");
            None
        }
    };
    match embed_target(settings.as_ref(), &config.block_version, page, customer_id) {
        EmbedTarget::Frame {
            iframe_url,
            script_url,
        } => {
            println!("iframe: {iframe_url}");
            println!("script: {script_url}");
        }
        EmbedTarget::MissingConfiguration { placeholder } => println!("{placeholder}"),
    }
    Ok(())
}

use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

/// Resolve `bind` and refuse non-loopback addresses unless `public` is set.
pub(crate) async fn resolve_bind_addr(bind: &str, public: bool) -> Result<SocketAddr> {
    let addrs = resolve_bind_addrs(bind).await?;
    enforce_loopback_unless_public(bind, &addrs, public)?;
    choose_preferred_bind_addr(&addrs)
        .with_context(|| format!("No usable socket address for {bind}"))
}

fn choose_preferred_bind_addr(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
}

async fn resolve_bind_addrs(bind: &str) -> Result<Vec<SocketAddr>> {
    // Resolve through Tokio so "localhost:8080" works.
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();

    if addrs.is_empty() {
        anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
    }
    Ok(addrs)
}

fn enforce_loopback_unless_public(bind: &str, addrs: &[SocketAddr], public: bool) -> Result<()> {
    let any_non_loopback = addrs.iter().any(|addr| !addr.ip().is_loopback());
    if any_non_loopback && !public {
        anyhow::bail!(
            "Refusing to bind to non-loopback address without --public: {bind}. Contacts and the archive download are served without authentication."
        )
    }
    Ok(())
}

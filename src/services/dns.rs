use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;

/// MX lookup interface, so the validator can be tested with a stub
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Whether the domain has at least one MX record.
    ///
    /// NXDOMAIN, empty answers, missing nameservers, and timeouts all
    /// count as "no MX" — any of them makes the domain unusable for mail.
    async fn has_mx_records(&self, domain: &str) -> bool;
}

/// MX resolver backed by a real DNS client
pub struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    /// Create a resolver using the default upstream servers
    pub fn new(timeout_secs: u64) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(timeout_secs);
        opts.attempts = 2;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl MxResolver for DnsMxResolver {
    async fn has_mx_records(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(e) => {
                tracing::debug!("MX lookup failed for {}: {}", domain, e);
                false
            }
        }
    }
}

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

/// Where the disposable-domain list comes from
#[derive(Debug, Clone)]
pub enum DisposableSource {
    /// Plain-text list fetched over HTTP, one domain per line
    Url(String),
    /// Plain-text file on disk, one domain per line
    File(PathBuf),
    /// No list configured; the check always passes
    None,
}

/// Set of known disposable email domains.
///
/// The list is best-effort: if the source cannot be fetched or read the set
/// degrades to empty and the disposable check passes everything. Validation
/// must not lock users out because a third-party list is down.
pub struct DisposableDomains {
    domains: RwLock<HashSet<String>>,
    source: DisposableSource,
}

impl DisposableDomains {
    /// Load the list from its source. Never fails; failures leave the set empty.
    pub async fn load(source: DisposableSource) -> Self {
        let set = Self {
            domains: RwLock::new(HashSet::new()),
            source,
        };
        set.refresh().await;
        set
    }

    /// Build a set from known domains, bypassing any source
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = domains
            .into_iter()
            .map(|d| d.into().to_lowercase())
            .collect();
        Self {
            domains: RwLock::new(set),
            source: DisposableSource::None,
        }
    }

    /// Re-fetch the list from the configured source.
    ///
    /// Returns the number of domains now in the set. On failure the
    /// previous set is kept (empty on first load) and a warning is logged.
    pub async fn refresh(&self) -> usize {
        let text = match &self.source {
            DisposableSource::Url(url) => match fetch_list(url).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("Failed to fetch disposable domain list from {}: {}", url, e);
                    None
                }
            },
            DisposableSource::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(
                        "Failed to read disposable domain list from {}: {}",
                        path.display(),
                        e
                    );
                    None
                }
            },
            DisposableSource::None => None,
        };

        if let Some(text) = text {
            let parsed = parse_domain_list(&text);
            tracing::info!("Loaded {} disposable domains", parsed.len());
            let mut domains = self.domains.write().expect("disposable set lock poisoned");
            *domains = parsed;
        }

        self.len()
    }

    /// Membership test; `domain` is expected to be lower-cased already
    pub fn contains(&self, domain: &str) -> bool {
        self.domains
            .read()
            .expect("disposable set lock poisoned")
            .contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains
            .read()
            .expect("disposable set lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn fetch_list(url: &str) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client.get(url).send().await?.error_for_status()?;
    response.text().await
}

fn parse_domain_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_list() {
        let text = "mailinator.com\n  guerrillamail.com  \n\n# comment\nTEMPMAIL.ORG\n";
        let parsed = parse_domain_list(text);

        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains("mailinator.com"));
        assert!(parsed.contains("guerrillamail.com"));
        assert!(parsed.contains("tempmail.org"));
    }

    #[test]
    fn test_from_domains_membership() {
        let set = DisposableDomains::from_domains(["Mailinator.com"]);
        assert!(set.contains("mailinator.com"));
        assert!(!set.contains("students.iitmandi.ac.in"));
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/disposable.txt")
            .with_status(200)
            .with_body("mailinator.com\n10minutemail.com\n")
            .create_async()
            .await;

        let set =
            DisposableDomains::load(DisposableSource::Url(format!("{}/disposable.txt", server.url())))
                .await;

        assert_eq!(set.len(), 2);
        assert!(set.contains("10minutemail.com"));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_list() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/disposable.txt")
            .with_status(200)
            .with_body("mailinator.com\n")
            .create_async()
            .await;

        let set =
            DisposableDomains::load(DisposableSource::Url(format!("{}/disposable.txt", server.url())))
                .await;
        assert!(set.contains("mailinator.com"));

        first.remove_async().await;
        server
            .mock("GET", "/disposable.txt")
            .with_status(200)
            .with_body("tempmail.org\n")
            .create_async()
            .await;

        let count = set.refresh().await;

        // The set is replaced wholesale by the new list
        assert_eq!(count, 1);
        assert!(set.contains("tempmail.org"));
        assert!(!set.contains("mailinator.com"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_set() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/disposable.txt")
            .with_status(200)
            .with_body("mailinator.com\n")
            .create_async()
            .await;

        let set =
            DisposableDomains::load(DisposableSource::Url(format!("{}/disposable.txt", server.url())))
                .await;
        assert!(set.contains("mailinator.com"));

        // Source goes away; the stale set is better than an empty one
        mock.remove_async().await;
        let count = set.refresh().await;

        assert_eq!(count, 1);
        assert!(set.contains("mailinator.com"));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let set = DisposableDomains::load(DisposableSource::Url(
            "http://127.0.0.1:1/unreachable".to_string(),
        ))
        .await;

        assert!(set.is_empty());
        assert!(!set.contains("mailinator.com"));
    }
}

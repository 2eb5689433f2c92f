use crate::services::{DisposableDomains, MxResolver};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Local part, `@`, then dot-separated domain labels
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9-.]+$";

/// Reasons an email can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email does not match the expected format")]
    BadSyntax,

    #[error("domain {0} is not an allowed institutional domain")]
    DomainNotAllowed(String),

    #[error("domain {0} is a known disposable email provider")]
    DisposableDomain(String),

    #[error("domain {0} has no MX records")]
    NoMxRecords(String),
}

/// Which checks the validator runs, each independently toggleable
#[derive(Debug, Clone, Copy)]
pub struct ValidationChecks {
    pub syntax: bool,
    pub allow_list: bool,
    pub disposable: bool,
    pub mx: bool,
}

impl Default for ValidationChecks {
    fn default() -> Self {
        Self {
            syntax: true,
            allow_list: false,
            disposable: true,
            mx: true,
        }
    }
}

/// An email that passed validation: trimmed and lower-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email validator with configurable checks.
///
/// Checks run in a fixed order and short-circuit on the first failure:
/// syntax, allow-list, disposable domain, MX records.
pub struct EmailValidator {
    checks: ValidationChecks,
    allowed_domains: HashSet<String>,
    syntax: Regex,
    disposable: Arc<DisposableDomains>,
    mx: Option<Arc<dyn MxResolver>>,
}

impl EmailValidator {
    pub fn new(
        checks: ValidationChecks,
        allowed_domains: HashSet<String>,
        disposable: Arc<DisposableDomains>,
        mx: Option<Arc<dyn MxResolver>>,
    ) -> Self {
        let syntax = Regex::new(EMAIL_PATTERN).expect("Failed to compile email pattern");

        Self {
            checks,
            allowed_domains,
            syntax,
            disposable,
            mx,
        }
    }

    /// Validate a raw email string.
    ///
    /// Returns the normalized email on success, or the first failing check.
    pub async fn validate(&self, raw: &str) -> Result<NormalizedEmail, ValidationError> {
        let email = raw.trim().to_lowercase();

        if self.checks.syntax && !self.syntax.is_match(&email) {
            tracing::debug!("Email failed syntax check");
            return Err(ValidationError::BadSyntax);
        }

        // Domain is everything after the last '@'
        let domain = email.rsplit('@').next().unwrap_or("").to_string();

        if self.checks.allow_list && !self.allowed_domains.contains(&domain) {
            tracing::debug!("Domain {} not on the allow list", domain);
            return Err(ValidationError::DomainNotAllowed(domain));
        }

        if self.checks.disposable && self.disposable.contains(&domain) {
            tracing::debug!("Domain {} is disposable", domain);
            return Err(ValidationError::DisposableDomain(domain));
        }

        if self.checks.mx {
            if let Some(resolver) = &self.mx {
                if !resolver.has_mx_records(&domain).await {
                    tracing::debug!("Domain {} has no MX records", domain);
                    return Err(ValidationError::NoMxRecords(domain));
                }
            }
        }

        Ok(NormalizedEmail(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct AlwaysMx;

    #[async_trait]
    impl MxResolver for AlwaysMx {
        async fn has_mx_records(&self, _domain: &str) -> bool {
            true
        }
    }

    struct NeverMx;

    #[async_trait]
    impl MxResolver for NeverMx {
        async fn has_mx_records(&self, _domain: &str) -> bool {
            false
        }
    }

    fn validator_with(
        checks: ValidationChecks,
        disposable: &[&str],
        mx: Option<Arc<dyn MxResolver>>,
    ) -> EmailValidator {
        EmailValidator::new(
            checks,
            ["students.iitmandi.ac.in".to_string()].into_iter().collect(),
            Arc::new(DisposableDomains::from_domains(disposable.iter().copied())),
            mx,
        )
    }

    #[tokio::test]
    async fn test_rejects_bad_syntax() {
        let validator = validator_with(ValidationChecks::default(), &[], Some(Arc::new(AlwaysMx)));

        for bad in ["not-an-email", "a@b", "@x.com", "a b@x.com", "", "a@"] {
            assert_eq!(
                validator.validate(bad).await,
                Err(ValidationError::BadSyntax),
                "{:?} should fail syntax",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_accepts_valid_institutional_email() {
        let validator = validator_with(ValidationChecks::default(), &[], Some(Arc::new(AlwaysMx)));

        let result = validator.validate("a@students.iitmandi.ac.in").await.unwrap();
        assert_eq!(result.as_str(), "a@students.iitmandi.ac.in");
    }

    #[tokio::test]
    async fn test_normalizes_case_and_whitespace() {
        let validator = validator_with(ValidationChecks::default(), &[], Some(Arc::new(AlwaysMx)));

        let result = validator.validate("  B22275@Students.IITMandi.AC.IN ").await.unwrap();
        assert_eq!(result.as_str(), "b22275@students.iitmandi.ac.in");
    }

    #[tokio::test]
    async fn test_rejects_disposable_regardless_of_mx() {
        // mailinator resolves fine, the disposable check must still win
        let validator = validator_with(
            ValidationChecks::default(),
            &["mailinator.com"],
            Some(Arc::new(AlwaysMx)),
        );

        assert_eq!(
            validator.validate("a@mailinator.com").await,
            Err(ValidationError::DisposableDomain("mailinator.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_mx() {
        let validator = validator_with(ValidationChecks::default(), &[], Some(Arc::new(NeverMx)));

        assert_eq!(
            validator.validate("a@example.com").await,
            Err(ValidationError::NoMxRecords("example.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_mx_check_skipped_without_resolver() {
        let validator = validator_with(ValidationChecks::default(), &[], None);

        assert!(validator.validate("a@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_allow_list_restricts_domains() {
        let checks = ValidationChecks {
            allow_list: true,
            mx: false,
            ..ValidationChecks::default()
        };
        let validator = validator_with(checks, &[], None);

        assert!(validator.validate("a@students.iitmandi.ac.in").await.is_ok());
        assert_eq!(
            validator.validate("a@gmail.com").await,
            Err(ValidationError::DomainNotAllowed("gmail.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_empty_disposable_set_fails_open() {
        // Fetch failures leave the set empty; only the disposable check relaxes
        let checks = ValidationChecks {
            mx: false,
            ..ValidationChecks::default()
        };
        let validator = validator_with(checks, &[], None);

        assert!(validator.validate("a@mailinator.com").await.is_ok());
    }
}

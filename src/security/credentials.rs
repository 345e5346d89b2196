//! Upstream credential injection.
//!
//! The effective policy is resolved once from [`AuthConfig`]. In `auto` mode
//! the first matching rule wins:
//!
//! 1. forward the caller's `Authorization` untouched
//! 2. inject `Bearer <token>`
//! 3. inject HTTP Basic credentials
//! 4. strip `Authorization` entirely
//!
//! Forwarding is opt-in; an inbound credential never reaches the upstream
//! unless the configuration asks for it.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::{AuthConfig, AuthMode, Secret, ValidationError};

/// The single credential rule applied to every upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Leave whatever `Authorization` the caller sent.
    Forward,
    /// Replace with a pre-built `Bearer` value.
    Bearer(HeaderValue),
    /// Replace with a pre-built `Basic` value.
    Basic(HeaderValue),
    /// Remove `Authorization`.
    Strip,
}

impl CredentialPolicy {
    pub fn from_config(auth: &AuthConfig) -> Result<Self, ValidationError> {
        let token = auth.bearer_token.as_ref().filter(|t| !t.is_empty());
        let username = auth.username.as_deref().filter(|u| !u.is_empty());
        let password = auth.password.as_ref();

        if username.is_none() && password.is_some_and(|p| !p.is_empty()) {
            return Err(ValidationError::PasswordWithoutUsername);
        }

        match auth.mode {
            AuthMode::Auto => {
                if auth.forward_incoming {
                    Ok(Self::Forward)
                } else if let Some(token) = token {
                    Ok(Self::Bearer(bearer_value(token)?))
                } else if let Some(username) = username {
                    Ok(Self::Basic(basic_value(username, password)?))
                } else {
                    Ok(Self::Strip)
                }
            }
            AuthMode::None => Ok(Self::Strip),
            AuthMode::Forward => Ok(Self::Forward),
            AuthMode::Bearer => {
                let token = token.ok_or(ValidationError::MissingBearerToken)?;
                Ok(Self::Bearer(bearer_value(token)?))
            }
            AuthMode::Basic => {
                let username = username.ok_or(ValidationError::MissingUsername)?;
                Ok(Self::Basic(basic_value(username, password)?))
            }
        }
    }

    /// Set or remove `Authorization` on an outbound header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        match self {
            Self::Forward => {}
            Self::Bearer(value) | Self::Basic(value) => {
                headers.insert(header::AUTHORIZATION, value.clone());
            }
            Self::Strip => {
                headers.remove(header::AUTHORIZATION);
            }
        }
    }

    /// Short name for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Bearer(_) => "bearer",
            Self::Basic(_) => "basic",
            Self::Strip => "none",
        }
    }

    /// Configured settings that this policy does not use.
    pub fn ignored_settings(&self, auth: &AuthConfig) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if auth.forward_incoming && *self != Self::Forward {
            ignored.push("forward_incoming");
        }
        if auth.bearer_token.as_ref().is_some_and(|t| !t.is_empty())
            && !matches!(self, Self::Bearer(_))
        {
            ignored.push("bearer_token");
        }
        if auth.username.as_deref().is_some_and(|u| !u.is_empty())
            && !matches!(self, Self::Basic(_))
        {
            ignored.push("username/password");
        }
        ignored
    }
}

fn bearer_value(token: &Secret) -> Result<HeaderValue, ValidationError> {
    sensitive(format!("Bearer {}", token.expose()), "bearer token")
}

fn basic_value(username: &str, password: Option<&Secret>) -> Result<HeaderValue, ValidationError> {
    let password = password.map(Secret::expose).unwrap_or_default();
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    sensitive(format!("Basic {}", encoded), "basic credentials")
}

fn sensitive(value: String, what: &str) -> Result<HeaderValue, ValidationError> {
    let mut value = HeaderValue::from_str(&value).map_err(|_| {
        ValidationError::InvalidCredential(format!(
            "{} contains characters not allowed in a header",
            what
        ))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig::default()
    }

    fn inbound_with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_default_strips_inbound_credentials() {
        let policy = CredentialPolicy::from_config(&auth()).unwrap();
        assert_eq!(policy, CredentialPolicy::Strip);

        let mut headers = inbound_with_auth("Basic xyz");
        policy.apply(&mut headers);
        assert!(!headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_forward_leaves_inbound_untouched() {
        let config = AuthConfig {
            forward_incoming: true,
            ..auth()
        };
        let policy = CredentialPolicy::from_config(&config).unwrap();

        let mut headers = inbound_with_auth("Basic xyz");
        policy.apply(&mut headers);
        assert_eq!(headers[header::AUTHORIZATION], "Basic xyz");

        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_bearer_replaces_inbound() {
        let config = AuthConfig {
            bearer_token: Some(Secret::new("abc.def")),
            ..auth()
        };
        let policy = CredentialPolicy::from_config(&config).unwrap();

        let mut headers = inbound_with_auth("Basic xyz");
        headers.append(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        policy.apply(&mut headers);

        let values: Vec<_> = headers.get_all(header::AUTHORIZATION).iter().collect();
        assert_eq!(values, vec!["Bearer abc.def"]);
        assert!(values[0].is_sensitive());
    }

    #[test]
    fn test_basic_auth_encoding() {
        let config = AuthConfig {
            username: Some("admin".into()),
            password: Some(Secret::new("admin")),
            ..auth()
        };
        let policy = CredentialPolicy::from_config(&config).unwrap();

        let mut headers = inbound_with_auth("Bearer inbound");
        policy.apply(&mut headers);
        assert_eq!(headers[header::AUTHORIZATION], "Basic YWRtaW46YWRtaW4=");
    }

    #[test]
    fn test_basic_with_empty_password() {
        let config = AuthConfig {
            username: Some("ops".into()),
            ..auth()
        };
        let policy = CredentialPolicy::from_config(&config).unwrap();
        assert_eq!(policy.mode(), "basic");
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        assert_eq!(headers[header::AUTHORIZATION], "Basic b3BzOg==");
    }

    #[test]
    fn test_precedence_forward_then_bearer_then_basic() {
        let all = AuthConfig {
            forward_incoming: true,
            bearer_token: Some(Secret::new("tok")),
            username: Some("admin".into()),
            password: Some(Secret::new("pw")),
            ..auth()
        };
        let policy = CredentialPolicy::from_config(&all).unwrap();
        assert_eq!(policy, CredentialPolicy::Forward);
        assert_eq!(policy.ignored_settings(&all), vec!["bearer_token", "username/password"]);

        let no_forward = AuthConfig {
            forward_incoming: false,
            ..all.clone()
        };
        let policy = CredentialPolicy::from_config(&no_forward).unwrap();
        assert_eq!(policy.mode(), "bearer");
        assert_eq!(policy.ignored_settings(&no_forward), vec!["username/password"]);
    }

    #[test]
    fn test_explicit_mode_overrides_precedence() {
        let config = AuthConfig {
            mode: AuthMode::Basic,
            forward_incoming: true,
            bearer_token: Some(Secret::new("tok")),
            username: Some("admin".into()),
            password: Some(Secret::new("pw")),
        };
        let policy = CredentialPolicy::from_config(&config).unwrap();
        assert_eq!(policy.mode(), "basic");

        let none = AuthConfig {
            mode: AuthMode::None,
            ..config
        };
        assert_eq!(CredentialPolicy::from_config(&none).unwrap(), CredentialPolicy::Strip);
    }

    #[test]
    fn test_explicit_mode_requires_material() {
        let bearer = AuthConfig {
            mode: AuthMode::Bearer,
            ..auth()
        };
        assert_eq!(
            CredentialPolicy::from_config(&bearer),
            Err(ValidationError::MissingBearerToken)
        );

        let basic = AuthConfig {
            mode: AuthMode::Basic,
            ..auth()
        };
        assert_eq!(
            CredentialPolicy::from_config(&basic),
            Err(ValidationError::MissingUsername)
        );
    }

    #[test]
    fn test_invalid_material_is_rejected() {
        let config = AuthConfig {
            password: Some(Secret::new("pw")),
            ..auth()
        };
        assert_eq!(
            CredentialPolicy::from_config(&config),
            Err(ValidationError::PasswordWithoutUsername)
        );

        let config = AuthConfig {
            bearer_token: Some(Secret::new("line\nbreak")),
            ..auth()
        };
        assert!(matches!(
            CredentialPolicy::from_config(&config),
            Err(ValidationError::InvalidCredential(_))
        ));
    }
}

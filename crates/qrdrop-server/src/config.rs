use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use url::Url;

/// Placeholder JWT secrets that must not reach production.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub public_url: Url,
    pub manager_email: String,
    pub manager_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("QRDROP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("QRDROP_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("QRDROP_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

        let db_path = get("QRDROP_DB_PATH").unwrap_or_else(|| "qrdrop.db".into()).into();
        let jwt_secret = get("QRDROP_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());

        // `Url::join` drops the last segment unless the base ends in a slash
        let mut public_url = get("QRDROP_PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{}/", port));
        if !public_url.ends_with('/') {
            public_url.push('/');
        }
        let public_url = Url::parse(&public_url).context("QRDROP_PUBLIC_URL is not a valid URL")?;

        let manager_email = get("QRDROP_MANAGER_EMAIL").unwrap_or_else(|| "admin@qrdrop.local".into());
        let Some(manager_password) = get("QRDROP_MANAGER_PASSWORD").filter(|p| !p.is_empty()) else {
            bail!("QRDROP_MANAGER_PASSWORD must be set so the manager account can be reconciled");
        };

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            public_url,
            manager_email,
            manager_password,
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("QRDROP_MANAGER_PASSWORD", "pw")]).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.db_path, PathBuf::from("qrdrop.db"));
        assert_eq!(cfg.public_url.as_str(), "http://localhost:3000/");
        assert_eq!(cfg.manager_email, "admin@qrdrop.local");
        assert!(cfg.uses_placeholder_secret());
    }

    #[test]
    fn public_url_gets_trailing_slash() {
        let cfg = config(&[
            ("QRDROP_MANAGER_PASSWORD", "pw"),
            ("QRDROP_PUBLIC_URL", "https://example.com/drop"),
            ("QRDROP_JWT_SECRET", "a-real-secret"),
        ])
        .unwrap();
        assert_eq!(cfg.public_url.as_str(), "https://example.com/drop/");
        assert!(!cfg.uses_placeholder_secret());
    }

    #[test]
    fn manager_password_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("QRDROP_MANAGER_PASSWORD", "")]).is_err());
    }

    #[test]
    fn bad_port_rejected() {
        assert!(config(&[("QRDROP_MANAGER_PASSWORD", "pw"), ("QRDROP_PORT", "http")]).is_err());
    }
}

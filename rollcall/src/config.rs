//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `ROLLCALL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `ROLLCALL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `ROLLCALL_AUTH__SESSION__COOKIE_NAME=sid` sets the `auth.session.cookie_name` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Admin User**: `admin_email`, `admin_password` - Initial super admin seeded on startup
//! - **Security**: `secret_key` - Session signing key, required at startup
//! - **Authentication**: `auth.session`, `auth.password` - Session and hashing configuration
//! - **Routes**: `routes` - Path prefixes for the gated areas and their redirect entry points
//! - **CORS**: `cors` - Allowed origins for browser clients

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ROLLCALL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Email address for the initial super admin (seeded on startup)
    pub admin_email: String,
    /// Password for the initial super admin. When absent the seeded account
    /// has no usable credential and cannot log in until one is set.
    pub admin_password: Option<String>,
    /// Secret key for session token signing (required)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Route classification for the authorization gate
    pub routes: RoutesConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session cookie and token lifetime configuration
    pub session: SessionConfig,
    /// Password hashing work factors
    pub password: PasswordConfig,
    /// Upper bound on a single credential store lookup
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,
    /// Upper bound on a single password verification
    #[serde(with = "humantime_serde")]
    pub verify_timeout: Duration,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long an issued session token stays valid
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
    /// Cookie name for the session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("Strict", "Lax", or "None")
    pub cookie_same_site: String,
}

/// Password hashing work factors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

/// Route classification table for the authorization gate.
///
/// Paths are matched by prefix against each list in order: public auth pages,
/// the student area, then the admin area. Anything unmatched is ungated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesConfig {
    /// Prefixes for the login/signup pages (reachable without a session)
    pub public_auth_prefixes: Vec<String>,
    /// Prefixes reserved for the student role
    pub student_prefixes: Vec<String>,
    /// Prefixes reserved for the admin and super admin roles
    pub admin_prefixes: Vec<String>,
    /// Where an authenticated student lands
    pub student_entry: String,
    /// Where an authenticated admin lands
    pub admin_entry: String,
    /// Where an unauthenticated caller is sent
    pub login_entry: String,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests ("*" for any)
    pub allowed_origins: Vec<String>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            admin_email: "admin@rollcall.example".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            routes: RoutesConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            password: PasswordConfig::default(),
            store_timeout: Duration::from_secs(5),
            verify_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            cookie_name: "rollcall_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "Strict".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public_auth_prefixes: vec!["/login".to_string(), "/signup".to_string()],
            student_prefixes: vec!["/home".to_string()],
            admin_prefixes: vec!["/dashboard".to_string()],
            student_entry: "/home".to_string(),
            admin_entry: "/dashboard".to_string(),
            login_entry: "/login".to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.is_none() {
            return Err(Error::Internal {
                operation: "Config validation: secret_key is not configured. \
                 Please set ROLLCALL_SECRET_KEY environment variable or add secret_key to config file."
                    .to_string(),
            });
        }

        // Validate session lifetime is reasonable
        if self.auth.session.lifetime.as_secs() < 300 {
            // Less than 5 minutes
            return Err(Error::Internal {
                operation: "Config validation: session lifetime is too short (minimum 5 minutes)".to_string(),
            });
        }

        if self.auth.session.lifetime.as_secs() > 86400 * 365 {
            // More than a year
            return Err(Error::Internal {
                operation: "Config validation: session lifetime is too long (maximum 365 days)".to_string(),
            });
        }

        if self.auth.store_timeout.is_zero() || self.auth.verify_timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: store_timeout and verify_timeout must be positive".to_string(),
            });
        }

        // Validate the gate table: every entry point and prefix must be an absolute path
        let entries = [&self.routes.student_entry, &self.routes.admin_entry, &self.routes.login_entry];
        for entry in entries {
            if !entry.starts_with('/') {
                return Err(Error::Internal {
                    operation: format!("Config validation: route entry point '{entry}' must start with '/'"),
                });
            }
        }

        let prefix_lists = [
            &self.routes.public_auth_prefixes,
            &self.routes.student_prefixes,
            &self.routes.admin_prefixes,
        ];
        for prefixes in prefix_lists {
            for prefix in prefixes {
                if !prefix.starts_with('/') {
                    return Err(Error::Internal {
                        operation: format!("Config validation: route prefix '{prefix}' must start with '/'"),
                    });
                }
            }
        }

        // Validate CORS configuration
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| origin == "*");
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("ROLLCALL_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

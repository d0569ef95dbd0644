use std::env;

use anyhow::{Context, bail};
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub services: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

/// Base URLs and credentials of the remote collaborators.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub ai_service_url: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub bucket_name: String,
    pub open_food_facts_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm: parse_algorithm(
                &env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            )?,
            ttl_minutes: env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|m| m.parse::<i64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(24 * 60),
        };

        let services = ServiceConfig {
            ai_service_url: trim_url(env::var("AI_SERVICE_URL").context("AI_SERVICE_URL is not set")?),
            supabase_url: trim_url(env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?),
            supabase_key: env::var("SUPABASE_KEY").context("SUPABASE_KEY is not set")?,
            bucket_name: env::var("IMG_BUCKET_NAME").context("IMG_BUCKET_NAME is not set")?,
            open_food_facts_url: trim_url(
                env::var("OPEN_FOOD_FACTS_URL")
                    .unwrap_or_else(|_| "https://world.openfoodfacts.org".to_string()),
            ),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt,
            services,
        })
    }
}

/// Only the symmetric HMAC family is accepted, the secret is a shared key.
pub fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => bail!("unsupported JWT_ALGORITHM {other}"),
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

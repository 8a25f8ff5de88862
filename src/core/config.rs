use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub generation: GenerationConfig,
    pub llm: LlmConfig,
    pub payment: PaymentConfig,
    pub credits: CreditsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Public site URL, used to build redirect targets
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for generated images and PDFs
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public base URL objects are served from (CDN or bucket domain)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix for publicly readable objects (e.g., "public")
    pub public_prefix: String,
    /// Whether public URLs include the bucket name as the first path segment
    pub public_url_includes_bucket: bool,
}

/// Image generation provider (Replicate predictions API)
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_base_url: String,
    pub api_token: String,
    /// Model in `owner/name` form
    pub model: String,
    pub aspect_ratio: String,
    pub output_format: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub request_timeout: Duration,
}

/// OpenAI-compatible chat completions endpoint used to expand prompts
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

/// Stripe Checkout configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub api_base_url: String,
    pub secret_key: String,
    /// `{CHECKOUT_SESSION_ID}` is substituted by the payment provider
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CreditsConfig {
    /// Credits granted the first time a user is seen
    pub initial_credits: i32,
    /// Credits consumed by a single generation
    pub per_generation: i32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let payment = PaymentConfig::from_env(&app.frontend_url)?;

        Ok(Config {
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            generation: GenerationConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            credits: CreditsConfig::from_env()?,
            payment,
            app,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String>
where
    T: ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", name))
}

fn required_var(name: &str) -> Result<String, String> {
    env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("{} environment variable is required", name))
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 12 * 1024 * 1024; // 12MB, room for a 10MB PDF

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size =
            parse_var("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            frontend_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_var("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_var("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_var("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = required_var("OIDC_ISSUER")?
            .trim_end_matches('/')
            .to_string();
        let audience = required_var("OIDC_AUDIENCE")?;

        // Providers differ on where the key set lives; default to `{issuer}/jwks`
        let jwks_url = env::var("OIDC_JWKS_URL").unwrap_or_else(|_| format!("{}/jwks", issuer));

        let jwks_cache_ttl_secs = parse_var("JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_var("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Covergen API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the illustration generator".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "covergen".to_string());

        // A dedicated public domain serves objects at its root; otherwise
        // objects are addressed path-style under the endpoint.
        let (public_endpoint, public_url_includes_bucket) = match env::var("MINIO_PUBLIC_URL") {
            Ok(url) if !url.is_empty() => (url, false),
            _ => (endpoint.clone(), true),
        };

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let public_prefix =
            env::var("MINIO_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string());

        Ok(Self {
            endpoint,
            public_endpoint: public_endpoint.trim_end_matches('/').to_string(),
            access_key,
            secret_key,
            bucket,
            region,
            public_prefix,
            public_url_includes_bucket,
        })
    }
}

impl GenerationConfig {
    const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;
    const DEFAULT_MAX_POLLS: u32 = 60;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let api_token = required_var("REPLICATE_API_TOKEN")?;
        let api_base_url = env::var("REPLICATE_API_URL")
            .unwrap_or_else(|_| "https://api.replicate.com/v1".to_string());
        let model = env::var("REPLICATE_MODEL")
            .unwrap_or_else(|_| "black-forest-labs/flux-schnell".to_string());
        let aspect_ratio = env::var("REPLICATE_ASPECT_RATIO").unwrap_or_else(|_| "16:9".to_string());
        let output_format = env::var("REPLICATE_OUTPUT_FORMAT").unwrap_or_else(|_| "png".to_string());

        let poll_interval_ms =
            parse_var("REPLICATE_POLL_INTERVAL_MS", Self::DEFAULT_POLL_INTERVAL_MS)?;
        let max_polls = parse_var("REPLICATE_MAX_POLLS", Self::DEFAULT_MAX_POLLS)?;
        let timeout_secs =
            parse_var("REPLICATE_TIMEOUT_SECS", Self::DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token,
            model,
            aspect_ratio,
            output_format,
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_polls,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl LlmConfig {
    const DEFAULT_TEMPERATURE: f32 = 0.01;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let api_key = required_var("OPENAI_API_KEY")?;
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string());

        let temperature = env::var("OPENAI_TEMPERATURE")
            .unwrap_or_else(|_| Self::DEFAULT_TEMPERATURE.to_string())
            .parse::<f32>()
            .map_err(|_| "OPENAI_TEMPERATURE must be a valid number".to_string())?;
        let timeout_secs = parse_var("OPENAI_TIMEOUT_SECS", Self::DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl PaymentConfig {
    pub fn from_env(frontend_url: &str) -> Result<Self, String> {
        let secret_key = required_var("STRIPE_SECRET_KEY")?;
        let api_base_url =
            env::var("STRIPE_API_URL").unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());
        let success_url = env::var("STRIPE_SUCCESS_URL").unwrap_or_else(|_| {
            format!(
                "{}/pay-success?session_id={{CHECKOUT_SESSION_ID}}",
                frontend_url
            )
        });
        let cancel_url =
            env::var("STRIPE_CANCEL_URL").unwrap_or_else(|_| format!("{}/pricing", frontend_url));

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            secret_key,
            success_url,
            cancel_url,
        })
    }
}

impl CreditsConfig {
    const DEFAULT_INITIAL_CREDITS: i32 = 3;
    const DEFAULT_PER_GENERATION: i32 = 1;

    pub fn from_env() -> Result<Self, String> {
        let initial_credits = parse_var("INITIAL_CREDITS", Self::DEFAULT_INITIAL_CREDITS)?;
        let per_generation = parse_var("CREDITS_PER_GENERATION", Self::DEFAULT_PER_GENERATION)?;

        if initial_credits < 0 {
            return Err("INITIAL_CREDITS must not be negative".to_string());
        }
        if per_generation < 1 {
            return Err("CREDITS_PER_GENERATION must be at least 1".to_string());
        }

        Ok(Self {
            initial_credits,
            per_generation,
        })
    }
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            initial_credits: Self::DEFAULT_INITIAL_CREDITS,
            per_generation: Self::DEFAULT_PER_GENERATION,
        }
    }
}

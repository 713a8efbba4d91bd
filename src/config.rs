use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

/// Optional admin account created at startup if absent.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub name: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub public_base_url: String,
    pub items_per_page: u64,
    pub verification_ttl_minutes: i64,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("SECRET_KEY")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "student-market".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "student-market-users".into()),
            access_ttl_minutes: env_i64("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_i64("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 7),
        };
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(465),
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@studentmarket.local".into()),
        };
        let admin = AdminConfig {
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into()),
            email: std::env::var("ADMIN_EMAIL").ok(),
            password: std::env::var("ADMIN_PASSWORD").ok(),
        };
        Ok(Self {
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".into()),
            mongodb_db: std::env::var("MONGODB_DB").unwrap_or_else(|_| "student_market".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            items_per_page: std::env::var("ITEMS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(12),
            verification_ttl_minutes: env_i64("VERIFICATION_TTL_MINUTES", 60),
            jwt,
            mail,
            admin,
        })
    }

    /// Config used by the test suites; no environment access.
    pub fn for_tests() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".into(),
            mongodb_db: "student_market_test".into(),
            public_base_url: "http://localhost:8080".into(),
            items_per_page: 12,
            verification_ttl_minutes: 60,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                access_ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            mail: MailConfig {
                smtp_host: None,
                smtp_port: 465,
                smtp_username: None,
                smtp_password: None,
                from_address: "noreply@studentmarket.local".into(),
            },
            admin: AdminConfig {
                name: "Admin".into(),
                email: None,
                password: None,
            },
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

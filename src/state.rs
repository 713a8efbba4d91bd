use std::sync::Arc;

use anyhow::Context;
use time::Duration;

use crate::ads::repo::AdRepository;
use crate::auth::jwt::JwtKeys;
use crate::auth::token::VerificationTokens;
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::mail::{self, LogMailer, Mailer};
use crate::store::memory::MemoryStore;
use crate::store::mongo::MongoStore;
use crate::store::{AdStore, UserStore};
use crate::users::repo::UserRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserRepository,
    pub ads: AdRepository,
    pub mailer: Arc<dyn Mailer>,
    pub jwt: JwtKeys,
    pub verification: VerificationTokens,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(
            MongoStore::connect(&config.mongodb_uri, &config.mongodb_db)
                .await
                .context("initialize document store")?,
        );
        let mailer = mail::from_config(&config.mail)?;
        Ok(Self::assemble(config, store.clone(), store, mailer))
    }

    /// State over in-memory stores and a log-only mailer; used by the test
    /// suites and usable as a storeless dev mode.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::assemble(Arc::new(config), store.clone(), store, Arc::new(LogMailer))
    }

    pub fn assemble(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        ads: Arc<dyn AdStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        let verification = VerificationTokens::new(
            &config.jwt.secret,
            Duration::minutes(config.verification_ttl_minutes),
            Arc::new(SystemClock),
        );
        Self {
            users: UserRepository::new(users, ads.clone()),
            ads: AdRepository::new(ads),
            mailer,
            jwt,
            verification,
            config,
        }
    }
}

use std::sync::Arc;

use crate::auth::jwt::TokenIssuer;
use crate::auth::repo::{CredentialStore, MySqlCredentialStore};
use crate::config::AppConfig;
use crate::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenIssuer,
    db: Option<Db>,
}

impl AppState {
    pub fn init(config: &AppConfig) -> Self {
        let db = Db::connect_lazy(&config.db);
        let store = Arc::new(MySqlCredentialStore::new(db.clone())) as Arc<dyn CredentialStore>;

        Self {
            store,
            tokens: TokenIssuer::from_config(config.jwt.as_ref()),
            db: Some(db),
        }
    }

    pub fn from_parts(store: Arc<dyn CredentialStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens,
            db: None,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}

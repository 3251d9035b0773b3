//! Durable storage for the session token pair
//!
//! A session exists exactly when a refresh token is stored. The access
//! token is replaced on every renewal; the refresh token only on login.

use crate::encryption::TokenCipher;
use crate::sqlite::{self, Database, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use async_trait::async_trait;
use boxtrack_core::{Credentials, Error, Result};
use std::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Where the access/refresh pair lives between runs
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store both tokens, replacing whatever was there
    async fn save(&self, credentials: &Credentials) -> Result<()>;

    /// The stored pair, or `None` when no refresh token is stored
    async fn load(&self) -> Result<Option<Credentials>>;

    /// Swap in a renewed access token, keeping the refresh token
    async fn replace_access_token(&self, access_token: &str) -> Result<()>;

    /// Forget both tokens
    async fn clear(&self) -> Result<()>;

    async fn has_refresh_token(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }
}

#[derive(Default)]
struct TokenSlots {
    access: Option<String>,
    refresh: Option<String>,
}

/// Process-local store; nothing survives a restart
#[derive(Default)]
pub struct MemoryCredentialStore {
    slots: RwLock<TokenSlots>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a pair
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slots: RwLock::new(TokenSlots {
                access: Some(credentials.access_token),
                refresh: Some(credentials.refresh_token),
            }),
        }
    }

    fn poisoned() -> Error {
        Error::DatabaseError("credential store lock poisoned".to_string())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        slots.access = Some(credentials.access_token.clone());
        slots.refresh = Some(credentials.refresh_token.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credentials>> {
        let slots = self.slots.read().map_err(|_| Self::poisoned())?;
        Ok(slots.refresh.as_ref().map(|refresh| {
            Credentials::new(slots.access.clone().unwrap_or_default(), refresh.clone())
        }))
    }

    async fn replace_access_token(&self, access_token: &str) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        if slots.refresh.is_none() {
            warn!("Ignoring access token renewal with no stored refresh token");
            return Ok(());
        }
        slots.access = Some(access_token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| Self::poisoned())?;
        *slots = TokenSlots::default();
        Ok(())
    }
}

/// Tokens sealed with AES-GCM in the local SQLite database
pub struct SqliteCredentialStore {
    db: Database,
    cipher: TokenCipher,
}

impl SqliteCredentialStore {
    pub fn new(db: Database, cipher: TokenCipher) -> Self {
        Self { db, cipher }
    }

    /// Open the database at `path` with the machine-bound key
    pub async fn open(path: &std::path::Path) -> Result<Self> {
        let db = Database::connect(path).await?;
        let cipher = TokenCipher::for_this_machine()?;
        Ok(Self::new(db, cipher))
    }

    async fn read_token(&self, key: &str) -> Result<Option<String>> {
        match sqlite::get_token(self.db.pool(), key).await? {
            Some(sealed) => self.cipher.open(&sealed).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    #[instrument(skip_all)]
    async fn save(&self, credentials: &Credentials) -> Result<()> {
        let access = self.cipher.seal(&credentials.access_token)?;
        let refresh = self.cipher.seal(&credentials.refresh_token)?;
        sqlite::put_pair(self.db.pool(), &access, &refresh).await?;
        debug!("Stored session tokens");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn load(&self) -> Result<Option<Credentials>> {
        let Some(refresh) = self.read_token(REFRESH_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let access = self
            .read_token(ACCESS_TOKEN_KEY)
            .await?
            .unwrap_or_default();

        Ok(Some(Credentials::new(access, refresh)))
    }

    #[instrument(skip_all)]
    async fn replace_access_token(&self, access_token: &str) -> Result<()> {
        if sqlite::get_token(self.db.pool(), REFRESH_TOKEN_KEY)
            .await?
            .is_none()
        {
            warn!("Ignoring access token renewal with no stored refresh token");
            return Ok(());
        }
        let sealed = self.cipher.seal(access_token)?;
        sqlite::put_token(self.db.pool(), ACCESS_TOKEN_KEY, &sealed).await
    }

    #[instrument(skip_all)]
    async fn clear(&self) -> Result<()> {
        sqlite::delete_all_tokens(self.db.pool()).await?;
        debug!("Cleared session tokens");
        Ok(())
    }

    async fn has_refresh_token(&self) -> Result<bool> {
        Ok(sqlite::get_token(self.db.pool(), REFRESH_TOKEN_KEY)
            .await?
            .is_some())
    }
}

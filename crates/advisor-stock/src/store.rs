//! Persistent preference store
//!
//! Durable home of the user's favorite and holding lists. The store keeps two
//! string-keyed entries, each a JSON-encoded array (`favorite_stocks`,
//! `holding_stocks`), inside a single AES-256-GCM encrypted file. Every
//! mutation writes through to disk immediately, so a crash never loses a
//! confirmed edit.
//!
//! A missing file means a fresh store (empty lists). A file that exists but
//! fails to decrypt or parse is an error: a corrupt or foreign store is never
//! silently overwritten.

use crate::error::{AdvisorError, Result};
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::Engine;
use chrono::NaiveDate;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::debug;

const NONCE_SIZE: usize = 12;

/// A position the user actually owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol
    pub symbol: String,
    /// Number of shares, strictly positive
    pub quantity: u32,
    /// Purchase price per share in USD, strictly positive
    pub price: f64,
    /// Purchase date
    pub purchase_date: NaiveDate,
}

impl Holding {
    /// Validate the holding's invariants
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(AdvisorError::InvalidSymbol(self.symbol.clone()));
        }
        if self.quantity == 0 {
            return Err(AdvisorError::Store(format!(
                "holding {} must have a positive quantity",
                self.symbol
            )));
        }
        if self.price <= 0.0 {
            return Err(AdvisorError::Store(format!(
                "holding {} must have a positive price",
                self.symbol
            )));
        }
        Ok(())
    }
}

/// The two persisted entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    favorite_stocks: Vec<String>,
    holding_stocks: Vec<Holding>,
}

/// On-disk envelope: random nonce plus ciphertext, both base64
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    nonce: String,
    data: String,
}

/// Encrypted write-through preference store
pub struct PreferenceStore {
    path: PathBuf,
    cipher: Aes256Gcm,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Open the store at `path`, decrypting with `passphrase`
    ///
    /// A missing file yields an empty store; the file is created on the first
    /// mutation.
    pub fn open(path: impl Into<PathBuf>, passphrase: &str) -> Result<Self> {
        let path = path.into();
        let cipher = build_cipher(passphrase)?;

        let prefs = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let envelope: Envelope = serde_json::from_str(&raw)
                .map_err(|e| AdvisorError::Store(format!("malformed store file: {e}")))?;
            let plaintext = decrypt(&cipher, &envelope)?;
            serde_json::from_str(&plaintext)
                .map_err(|e| AdvisorError::Store(format!("malformed preferences: {e}")))?
        } else {
            debug!(path = %path.display(), "no preference store yet, starting empty");
            Preferences::default()
        };

        Ok(Self {
            path,
            cipher,
            prefs,
        })
    }

    /// The user's favorite symbols
    pub fn favorites(&self) -> &[String] {
        &self.prefs.favorite_stocks
    }

    /// The user's holdings
    pub fn holdings(&self) -> &[Holding] {
        &self.prefs.holding_stocks
    }

    /// Find the holding for a symbol, if any
    pub fn holding_for(&self, symbol: &str) -> Option<&Holding> {
        self.prefs
            .holding_stocks
            .iter()
            .find(|h| h.symbol == symbol)
    }

    /// Replace the favorite list, collapsing duplicates, and persist
    pub fn set_favorites(&mut self, favorites: Vec<String>) -> Result<()> {
        let mut deduped: Vec<String> = Vec::with_capacity(favorites.len());
        for symbol in favorites {
            if !deduped.contains(&symbol) {
                deduped.push(symbol);
            }
        }
        self.prefs.favorite_stocks = deduped;
        self.persist()
    }

    /// Add a favorite symbol and persist; returns false if already present
    pub fn add_favorite(&mut self, symbol: impl Into<String>) -> Result<bool> {
        let symbol = symbol.into();
        if self.prefs.favorite_stocks.contains(&symbol) {
            return Ok(false);
        }
        self.prefs.favorite_stocks.push(symbol);
        self.persist()?;
        Ok(true)
    }

    /// Remove a favorite symbol and persist; returns false if absent
    pub fn remove_favorite(&mut self, symbol: &str) -> Result<bool> {
        let Some(pos) = self.prefs.favorite_stocks.iter().position(|s| s == symbol) else {
            return Ok(false);
        };
        self.prefs.favorite_stocks.remove(pos);
        self.persist()?;
        Ok(true)
    }

    /// Validate and add a holding, then persist
    pub fn add_holding(&mut self, holding: Holding) -> Result<()> {
        holding.validate()?;
        self.prefs.holding_stocks.push(holding);
        self.persist()
    }

    /// Remove the holding at `index` and persist; returns the removed entry
    pub fn remove_holding(&mut self, index: usize) -> Result<Holding> {
        if index >= self.prefs.holding_stocks.len() {
            return Err(AdvisorError::Store(format!(
                "no holding at index {index}"
            )));
        }
        let removed = self.prefs.holding_stocks.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Encrypt and write the current preferences to disk
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let plaintext = serde_json::to_string(&self.prefs)?;
        let envelope = encrypt(&self.cipher, &plaintext)?;
        std::fs::write(&self.path, serde_json::to_string(&envelope)?)?;
        debug!(path = %self.path.display(), "preferences persisted");
        Ok(())
    }
}

/// Derive a 256-bit key from the passphrase
fn build_cipher(passphrase: &str) -> Result<Aes256Gcm> {
    let key = Sha256::digest(passphrase.as_bytes());
    Aes256Gcm::new_from_slice(&key).map_err(|e| AdvisorError::Store(e.to_string()))
}

fn encrypt(cipher: &Aes256Gcm, plaintext: &str) -> Result<Envelope> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| AdvisorError::Store(format!("encryption failed: {e}")))?;

    let b64 = base64::engine::general_purpose::STANDARD;
    Ok(Envelope {
        nonce: b64.encode(nonce_bytes),
        data: b64.encode(ciphertext),
    })
}

fn decrypt(cipher: &Aes256Gcm, envelope: &Envelope) -> Result<String> {
    let b64 = base64::engine::general_purpose::STANDARD;
    let nonce_bytes = b64
        .decode(&envelope.nonce)
        .map_err(|e| AdvisorError::Store(format!("invalid nonce base64: {e}")))?;
    let ciphertext = b64
        .decode(&envelope.data)
        .map_err(|e| AdvisorError::Store(format!("invalid ciphertext base64: {e}")))?;

    if nonce_bytes.len() != NONCE_SIZE {
        return Err(AdvisorError::Store(format!(
            "invalid nonce size: expected {NONCE_SIZE}, got {}",
            nonce_bytes.len()
        )));
    }

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| AdvisorError::Store("decryption failed (wrong passphrase?)".to_string()))?;

    String::from_utf8(plaintext).map_err(|e| AdvisorError::Store(format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_holding(symbol: &str, price: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity: 10,
            price,
            purchase_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.enc"), "secret").unwrap();
        assert!(store.favorites().is_empty());
        assert!(store.holdings().is_empty());
    }

    #[test]
    fn test_mutations_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.enc");

        {
            let mut store = PreferenceStore::open(&path, "secret").unwrap();
            store
                .set_favorites(vec!["AAPL".to_string(), "MSFT".to_string()])
                .unwrap();
            store.add_holding(sample_holding("NVDA", 450.0)).unwrap();
        }

        let store = PreferenceStore::open(&path, "secret").unwrap();
        assert_eq!(store.favorites(), ["AAPL", "MSFT"]);
        assert_eq!(store.holdings().len(), 1);
        assert_eq!(store.holding_for("NVDA").unwrap().price, 450.0);
        assert!(store.holding_for("AAPL").is_none());
    }

    #[test]
    fn test_favorites_deduplicate() {
        let dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::open(dir.path().join("p.enc"), "secret").unwrap();
        store
            .set_favorites(vec![
                "AAPL".to_string(),
                "MSFT".to_string(),
                "AAPL".to_string(),
            ])
            .unwrap();
        assert_eq!(store.favorites(), ["AAPL", "MSFT"]);
    }

    #[test]
    fn test_remove_holding() {
        let dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::open(dir.path().join("p.enc"), "secret").unwrap();
        store.add_holding(sample_holding("AAPL", 100.0)).unwrap();
        store.add_holding(sample_holding("MSFT", 300.0)).unwrap();

        let removed = store.remove_holding(0).unwrap();
        assert_eq!(removed.symbol, "AAPL");
        assert_eq!(store.holdings().len(), 1);
        assert!(store.remove_holding(5).is_err());
    }

    #[test]
    fn test_invalid_holdings_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::open(dir.path().join("p.enc"), "secret").unwrap();

        let mut zero_qty = sample_holding("AAPL", 100.0);
        zero_qty.quantity = 0;
        assert!(store.add_holding(zero_qty).is_err());

        let negative_price = sample_holding("AAPL", -1.0);
        assert!(store.add_holding(negative_price).is_err());

        assert!(store.holdings().is_empty());
    }

    #[test]
    fn test_wrong_passphrase_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.enc");

        {
            let mut store = PreferenceStore::open(&path, "right").unwrap();
            store.set_favorites(vec!["AAPL".to_string()]).unwrap();
        }

        let result = PreferenceStore::open(&path, "wrong");
        assert!(result.is_err());
    }
}

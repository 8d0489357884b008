//! External Antigravity accounts file.
//!
//! The Antigravity extension can hold logins for several Google accounts at
//! once. Those extra accounts never reach the main credential file; they are
//! kept in a sidecar list:
//!
//! ```json
//! {
//!   "accounts": [
//!     {
//!       "refreshToken": "1//0g...",
//!       "projectId": "my-project",
//!       "email": "dev@example.com"
//!     }
//!   ]
//! }
//! ```
//!
//! The file lives under the OpenCode config directory, with the data
//! directory as a fallback location. A missing file simply means no extra
//! accounts; an unreadable or malformed one is logged and contributes
//! nothing, since quota reporting must not fail over a sidecar file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the external accounts list.
pub const ACCOUNTS_FILE_NAME: &str = "antigravity-accounts.json";

// ============================================================================
// File Format
// ============================================================================

#[derive(Debug, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<AccountEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountEntry {
    refresh_token: Option<String>,
    project_id: Option<String>,
    managed_project_id: Option<String>,
    email: Option<String>,
}

/// One usable account from the external accounts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAccount {
    /// Refresh token. Entries without one are dropped during loading.
    pub refresh: String,
    /// Project id, preferring `projectId` over `managedProjectId`.
    pub project: Option<String>,
    /// Account email, when recorded.
    pub email: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

/// Candidate locations of the accounts file, in probe order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("opencode").join(ACCOUNTS_FILE_NAME));
    }
    if let Some(dir) = dirs::data_dir() {
        paths.push(dir.join("opencode").join(ACCOUNTS_FILE_NAME));
    }
    paths
}

/// Loads external accounts from the first candidate path that exists.
pub fn load_external_accounts() -> Vec<ExternalAccount> {
    for path in candidate_paths() {
        if path.exists() {
            return read_accounts_file(&path);
        }
    }
    debug!("No external accounts file found");
    Vec::new()
}

/// Reads one accounts file, keeping only entries with a refresh token.
pub fn read_accounts_file(path: &Path) -> Vec<ExternalAccount> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read accounts file");
            return Vec::new();
        }
    };

    let parsed: AccountsFile = match serde_json::from_str(&content) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to parse accounts file");
            return Vec::new();
        }
    };

    let accounts: Vec<ExternalAccount> = parsed
        .accounts
        .into_iter()
        .filter_map(|entry| {
            let refresh = entry.refresh_token.filter(|token| !token.is_empty())?;
            Some(ExternalAccount {
                refresh,
                project: entry.project_id.or(entry.managed_project_id),
                email: entry.email,
            })
        })
        .collect();

    debug!(path = %path.display(), count = accounts.len(), "Loaded external accounts");
    accounts
}

// ============================================================================
// Tests
// ============================================================================

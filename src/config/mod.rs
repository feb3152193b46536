//! Layered configuration.
//!
//! Tiers, lowest to highest priority:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/todo-assist/config.yaml`
//! 3. **User** - `~/.todo-assist/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! CLI flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TODO_ASSIST_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `TODO_ASSIST_DB_PATH` - Database path
//! - `TODO_ASSIST_STORAGE_KEY` - Key the task list is stored under
//! - `TODO_ASSIST_HOST` / `PORT` - Listening address (port defaults to 4000)
//! - `GEMINI_API_KEY` - Model credential; AI routes answer 503 without it
//! - `TODO_ASSIST_MODEL`, `TODO_ASSIST_AI_ENDPOINT`, `TODO_ASSIST_AI_TIMEOUT_SECS`
//! - `TODO_ASSIST_SERVER_URL` - Server used by the `suggest`/`prioritise` commands
//! - `TODO_ASSIST_USER_DIR` / `TODO_ASSIST_PROJECT_DIR` - Tier directories

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;

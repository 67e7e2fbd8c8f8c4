use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) const DB_PATH_VAR: &str = "BUDGETER_DB";
pub(crate) const DELETE_POLICY_VAR: &str = "BUDGETER_DELETE_POLICY";

/// What happens to a category's expenses when the category is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Expenses stay behind with a dangling `category_id`.
    #[default]
    Orphan,
    /// Expenses are deleted together with their category.
    Cascade,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orphan => "orphan",
            Self::Cascade => "cascade",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "orphan" | "keep" => Some(Self::Orphan),
            "cascade" | "delete" => Some(Self::Cascade),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub delete_policy: DeletePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            Some(p) => PathBuf::from(crate::run::shellexpand(&p)),
            None => default_db_path()?,
        };

        let delete_policy = match lookup(DELETE_POLICY_VAR) {
            Some(raw) => DeletePolicy::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("Invalid {DELETE_POLICY_VAR} '{raw}' (expected 'orphan' or 'cascade')")
            })?,
            None => DeletePolicy::default(),
        };

        Ok(Self {
            db_path,
            delete_policy,
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budgeter", "Budgeter")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("budgeter.db"))
}

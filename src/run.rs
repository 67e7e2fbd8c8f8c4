mod cli;
mod render;


use anyhow::Result;

use crate::db::Database;
use crate::models::Category;

pub(crate) use cli::{as_cli, shellexpand};

/// Resolve a command-line category reference: an id first, then a
/// case-insensitive name. Names are not unique, so several matches is an error.
pub(crate) fn resolve_category(db: &Database, arg: &str) -> Result<Category> {
    if let Ok(id) = arg.trim().parse::<i64>() {
        if let Some(cat) = db.get_category_by_id(id)? {
            return Ok(cat);
        }
    }

    let mut matches = db.find_categories_by_name(arg.trim())?;
    match matches.len() {
        0 => anyhow::bail!("Category '{arg}' not found"),
        1 => Ok(matches.remove(0)),
        _ => {
            let ids: Vec<String> = matches
                .iter()
                .filter_map(|c| c.id)
                .map(|id| id.to_string())
                .collect();
            anyhow::bail!(
                "Several categories are named '{arg}'; use an id instead: {}",
                ids.join(", ")
            )
        }
    }
}

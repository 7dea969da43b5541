//! Index maintenance commands: `info` and `clear-choices`
//!
//! @module cli/index

use crate::cli::{project_root, InfoArgs, RootArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::exit_codes::EXIT_SUCCESS;
use crate::trace::output::{create_formatter, IndexStatus, OutputFormat};
use crate::trace::{get_index_info, should_rebuild_index, ChoiceCache};
use std::time::Duration;
use tracing::info;

/// Report index health; never fails on a missing or broken index
pub fn info(args: InfoArgs, mut config: Config) -> Result<i32> {
    let root = project_root(args.root)?;
    if let Some(index) = args.index {
        config.index.path = Some(index);
    }

    let status = index_status(&config, &root);
    let format = OutputFormat::from_json_flag(args.json);
    let formatter = create_formatter(format, config.output.max_items);
    println!("{}", formatter.format_index_status(&status).trim_end());

    Ok(EXIT_SUCCESS)
}

fn index_status(config: &Config, root: &std::path::Path) -> IndexStatus {
    let path = config.index_path(root);
    let max_age = Duration::from_millis(config.index.max_age_ms);
    IndexStatus {
        exists: path.exists(),
        info: get_index_info(&path),
        should_rebuild: should_rebuild_index(&path, max_age),
        max_age_ms: config.index.max_age_ms,
        path,
    }
}

/// Delete remembered disambiguation choices under the project root
pub fn clear_choices(args: RootArgs) -> Result<i32> {
    let root = project_root(args.root)?;
    let path = Config::choices_path(&root);

    if ChoiceCache::clear(&path)? {
        info!(path = %path.display(), "Cleared remembered choices");
        println!("Cleared remembered choices: {}", path.display());
    } else {
        println!("No remembered choices at {}", path.display());
    }
    Ok(EXIT_SUCCESS)
}

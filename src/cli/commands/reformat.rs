use crate::cli::parser::Commands;
use crate::core::reformat::ReformatLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands) -> AppResult<()> {
    if let Commands::Reformat {
        parent_dir,
        years,
        dry_run,
    } = cmd
    {
        let parent = expand_tilde(parent_dir);
        let actions = ReformatLogic::plan(&parent, years)?;

        if actions.is_empty() {
            info("Nothing to update.");
            return Ok(());
        }

        for action in &actions {
            println!("{action}");
        }

        if *dry_run {
            info(format!("{} change(s) planned, nothing applied (dry run).", actions.len()));
        } else {
            ReformatLogic::apply(&actions)?;
            success(format!("{} change(s) applied.", actions.len()));
        }
    }
    Ok(())
}

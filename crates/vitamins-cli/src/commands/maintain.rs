//! `vitamins clear` / `vitamins prune` — housekeeping on persisted state.

use vitamins_core::Tracker;

/// Empty the trail and the error log. With `purge`, the stored keys are
/// deleted rather than rewritten as empty arrays.
pub fn clear(tracker: &mut Tracker, purge: bool) -> Result<(), String> {
    if purge {
        tracker.purge();
        println!("Purged trail and errors");
    } else {
        tracker.clear();
        tracker.handle_session_end();
        println!("Cleared trail and errors");
    }
    Ok(())
}

/// Rewrite the store without the entries that expired. Loading already
/// dropped them, so saving is all that is left to do.
pub fn prune(tracker: &mut Tracker) -> Result<(), String> {
    tracker.handle_session_end();
    println!(
        "Kept {} crumbs and {} errors younger than {}h",
        tracker.trail().len(),
        tracker.logs().len(),
        tracker.config().ttl_hours
    );
    Ok(())
}

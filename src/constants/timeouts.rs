use std::time::Duration;

/// How long the Nudge button on a welcome message stays available
pub const NUDGE_WINDOW: Duration = Duration::from_secs(30);

//! First-visit hint pointing at the panel toggle.

use gloo_storage::{LocalStorage, Storage};

const TOOLTIP_SHOWN_KEY: &str = "uhi_controls_tooltip_shown";

/// How long the hint stays up.
pub(crate) const TOOLTIP_VISIBLE_MS: u32 = 6_000;

pub(crate) const TOOLTIP_TEXT: &str = "Usa questo pulsante per nascondere o mostrare la legenda";

/// Whether the hint should be shown now. The flag is written the first
/// time this returns `true`, so each device sees the hint once.
pub(crate) fn claim_first_visit() -> bool {
    let shown: bool = LocalStorage::get(TOOLTIP_SHOWN_KEY).unwrap_or(false);
    if shown {
        return false;
    }
    let _ = LocalStorage::set(TOOLTIP_SHOWN_KEY, true);
    true
}

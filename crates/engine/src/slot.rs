//! Presentation seam.
//!
//! The engine never touches a rendering surface directly; it drives
//! these traits, which the UI layer implements. One slot is created
//! per task at enqueue time and is never shared. Rendered slots are
//! not reclaimed — they persist for the page's lifetime.

use std::sync::Arc;

/// Per-task visual element.
pub trait PresentationSlot: Send + Sync {
    /// Updates the visible progress value and percentage label.
    fn set_progress(&self, percent: f64);

    /// Visually disables the progress indicator.
    fn hide_progress(&self);

    /// Sets the link target and link text.
    fn set_link(&self, url: &str, text: &str);

    /// Sets the visible file name.
    fn set_name(&self, text: &str);

    /// Writes a failure description into the slot.
    fn set_error(&self, text: &str);

    /// Enables the copy-to-clipboard affordance bound to `url`.
    fn enable_clipboard(&self, url: &str);

    /// Marks the slot's image element for deferred loading, with a
    /// fallback that hides it if the format fails to render.
    fn mark_image_eligible(&self, url: &str, alt: &str);
}

/// Factory for presentation slots.
pub trait Presenter: Send + Sync {
    /// Creates the slot for a newly enqueued task.
    fn create_slot(&self) -> Arc<dyn PresentationSlot>;

    /// Makes the results area visible. Called on enqueue; idempotent.
    fn reveal_results(&self);
}

//! Result binder: attaches a server result to a presentation slot.

use uplift_protocol::UploadedFile;

use crate::slot::PresentationSlot;

/// URL suffixes eligible for deferred image preview.
pub const IMAGE_EXTENSIONS: &[&str] = &[".webp", ".jpg", ".jpeg", ".bmp", ".gif", ".png"];

/// Binds a result payload to a task's slot.
///
/// No-op when the URL is absent. Otherwise writes the URL as both link
/// target and link text, the original filename as the visible name,
/// enables the copy-to-clipboard affordance, and marks image-eligible
/// URLs for deferred loading. Invoked identically by the whole-file
/// and chunked-completion paths; idempotent in content.
pub fn bind_result(slot: &dyn PresentationSlot, original_name: &str, file: &UploadedFile) {
    if file.url.is_empty() {
        return;
    }

    slot.set_link(&file.url, &file.url);
    slot.enable_clipboard(&file.url);
    slot.set_name(original_name);

    if image_eligible(&file.url) {
        slot.mark_image_eligible(&file.url, file.name.as_deref().unwrap_or(""));
    }
}

/// Returns `true` when the URL's path suffix — ignoring a trailing
/// query string, case-insensitively — is a known image extension.
pub fn image_eligible(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    let Some(dot) = path.rfind('.') else {
        return false;
    };
    let ext = path[dot..].to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

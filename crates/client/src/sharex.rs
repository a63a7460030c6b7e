//! ShareX uploader-profile artifact.
//!
//! Authenticated users can download a `.sxcu` custom-uploader profile
//! pointing ShareX at the service with their token pre-filled.

use serde::Serialize;

/// ShareX custom-uploader definition. Field order matters only for
/// readability of the downloaded file; ShareX parses keys by name.
#[derive(Debug, Serialize)]
struct Profile<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "DestinationType")]
    destination_type: &'a str,
    #[serde(rename = "RequestType")]
    request_type: &'a str,
    #[serde(rename = "RequestURL")]
    request_url: String,
    #[serde(rename = "FileFormName")]
    file_form_name: &'a str,
    #[serde(rename = "Headers")]
    headers: Headers<'a>,
    #[serde(rename = "ResponseType")]
    response_type: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "ThumbnailURL")]
    thumbnail_url: &'a str,
}

#[derive(Debug, Serialize)]
struct Headers<'a> {
    token: &'a str,
}

/// Renders the profile JSON for a service at `origin` (scheme + host),
/// displayed as `hostname`.
pub fn profile(hostname: &str, origin: &str, token: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Profile {
        name: hostname,
        destination_type: "ImageUploader, FileUploader",
        request_type: "POST",
        request_url: format!("{}/api/upload", origin.trim_end_matches('/')),
        file_form_name: "files[]",
        headers: Headers { token },
        response_type: "Text",
        url: "$json:files[0].url$",
        thumbnail_url: "$json:files[0].url$",
    })
}

/// Suggested download filename for the profile.
pub fn profile_filename(hostname: &str) -> String {
    format!("{hostname}.sxcu")
}

//! `AppxManifest.xml` application id lookup.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

/// Application id used when the manifest cannot be read.
pub const DEFAULT_APP_ID: &str = "App";

/// Returns the `Id` of the first `<Application>` element.
pub fn application_id(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Application" =>
            {
                let id = e
                    .try_get_attribute("Id")
                    .ok()
                    .flatten()
                    .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
                    .filter(|v| !v.is_empty());
                if id.is_some() {
                    return id;
                }
            }
            Ok(Event::Eof) => return None,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "unreadable AppxManifest");
                return None;
            }
        }
    }
}

/// Reads the application id from `<install>/AppxManifest.xml`, falling
/// back to [`DEFAULT_APP_ID`].
pub fn read_application_id(install_location: Option<&Path>) -> String {
    install_location
        .and_then(|dir| std::fs::read_to_string(dir.join("AppxManifest.xml")).ok())
        .and_then(|xml| application_id(&xml))
        .unwrap_or_else(|| DEFAULT_APP_ID.to_string())
}

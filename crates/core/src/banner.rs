//! The error banner shown above the job list.

use serde::Serialize;

/// Message shown when the jobs endpoint answers with a non-2xx status or
/// cannot be reached at all.
pub const HTTP_SERVER_ERROR_MESSAGE: &str = "HTTP server error";

/// Message shown when a 200 response cannot be understood.
pub const INVALID_JOB_DATA_MESSAGE: &str = "Invalid job data";

/// Visibility and text of the banner. Hidden and empty until the first
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Banner {
    visible: bool,
    text: String,
}

impl Banner {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last message shown. Kept after [`hide`](Self::hide) so the text of
    /// a past error can still be inspected.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.visible = true;
        self.text = message.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

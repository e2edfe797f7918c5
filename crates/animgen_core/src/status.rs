/// One decoded status poll, keyed by the reported status.
///
/// A completed report always carries its artifact locator; responses that
/// claim completion without one are decoded as `Pending` by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Pending {
        code: Option<String>,
    },
    Completed {
        code: Option<String>,
        video_url: String,
    },
    Failed {
        code: Option<String>,
        error: Option<String>,
    },
}

impl StatusReport {
    pub fn code(&self) -> Option<&str> {
        match self {
            StatusReport::Pending { code }
            | StatusReport::Completed { code, .. }
            | StatusReport::Failed { code, .. } => code.as_deref(),
        }
    }
}

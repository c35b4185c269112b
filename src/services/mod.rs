pub(crate) mod attempts;
pub(crate) mod content_analytics;
pub(crate) mod course_removal;
pub(crate) mod progress;
pub(crate) mod progress_report;

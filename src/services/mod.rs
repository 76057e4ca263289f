//! Services: availability detection and notification dispatch.

pub mod detector;
pub mod notifier;

pub use detector::Detector;
pub use notifier::{Notify, SmtpNotifier};

//! Purpose: Blocking confirmation and alert channel for destructive actions.
//! Exports: `Prompt`, `AssumeYes`, `confirm_delete_message`.
//! Role: Lets the management view ask before deleting and report failures out of band.

pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

/// Confirms everything; alerts are logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!(%message, "alert");
    }
}

pub fn confirm_delete_message(title: &str) -> String {
    format!("Are you sure you want to delete \"{title}\"?")
}

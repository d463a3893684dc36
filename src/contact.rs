use crate::error::{ClientError, ClientResult};
use crate::validation::{ContactForm, FormState};

/// Contact screen. Messages are acknowledged locally; nothing is sent.
#[derive(Debug, Default)]
pub struct ContactFlow {
    pub form: FormState<ContactForm>,
}

impl ContactFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, clear the form and return the thank-you text.
    pub fn submit(&mut self) -> ClientResult<String> {
        if !self.form.validate_all() {
            return Err(ClientError::Validation(self.form.errors().clone()));
        }
        let name = self.form.values().name.trim().to_string();
        tracing::info!("Contact message from {}", name);
        self.form.reset();
        Ok(format!(
            "Thanks for your message, {}! We'll get back to you soon.",
            name
        ))
    }
}

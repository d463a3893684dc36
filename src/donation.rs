use std::sync::Arc;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{Donation, NewDonation};
use crate::processing::Processing;
use crate::repository::DonationRepository;
use crate::routes::{Navigate, Route};
use crate::validation::ValidationErrors;

/// Preset amounts offered as buttons, in CLP.
pub const PRESET_AMOUNTS: [u64; 3] = [5000, 10000, 20000];

pub const CARD_NUMBER_MAX_LEN: usize = 16;
pub const CVC_MAX_LEN: usize = 3;

const PAYMENT_METHOD: &str = "CARD";

fn capped(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Donation form. A preset and a custom amount are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationForm {
    preset: Option<u64>,
    custom_amount: String,
    card_name: String,
    card_number: String,
    cvc: String,
    message: String,
}

impl DonationForm {
    /// Pick one of [`PRESET_AMOUNTS`]. Any other amount goes through
    /// [`set_custom_amount`](Self::set_custom_amount).
    pub fn select_preset(&mut self, amount: u64) -> ClientResult<()> {
        if !PRESET_AMOUNTS.contains(&amount) {
            return Err(ClientError::BadRequest(format!(
                "{} is not a preset amount. Choose 5000, 10000 or 20000.",
                amount
            )));
        }
        self.preset = Some(amount);
        self.custom_amount.clear();
        Ok(())
    }

    pub fn set_custom_amount(&mut self, value: impl Into<String>) {
        self.custom_amount = value.into();
        self.preset = None;
    }

    pub fn set_card_name(&mut self, value: impl Into<String>) {
        self.card_name = value.into();
    }

    pub fn set_card_number(&mut self, value: &str) {
        self.card_number = capped(value, CARD_NUMBER_MAX_LEN);
    }

    pub fn set_cvc(&mut self, value: &str) {
        self.cvc = capped(value, CVC_MAX_LEN);
    }

    pub fn set_message(&mut self, value: impl Into<String>) {
        self.message = value.into();
    }

    pub fn preset(&self) -> Option<u64> {
        self.preset
    }

    pub fn custom_amount(&self) -> &str {
        &self.custom_amount
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn cvc(&self) -> &str {
        &self.cvc
    }

    /// Amount that would be charged: the preset, else the parsed custom field.
    /// `None` unless it is a positive whole number.
    pub fn effective_amount(&self) -> Option<u64> {
        self.preset
            .or_else(|| self.custom_amount.trim().parse().ok())
            .filter(|amount| *amount > 0)
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(&["amount", "card_name", "card_number"]);
        if self.effective_amount().is_none() {
            errors.set("amount", "Please select or enter a valid amount.");
        }
        if self.card_name.trim().is_empty() {
            errors.set("card_name", "Please fill in the card details.");
        }
        if self.card_number.trim().is_empty() {
            errors.set("card_number", "Please fill in the card details.");
        }
        errors
    }
}

/// One-shot donation action. No retry, no idempotency key.
pub struct DonationSubmitter {
    repo: Arc<dyn DonationRepository>,
    pub form: DonationForm,
    processing: Processing,
}

impl DonationSubmitter {
    pub fn new(repo: Arc<dyn DonationRepository>) -> Self {
        Self {
            repo,
            form: DonationForm::default(),
            processing: Processing::default(),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Shared view of the in-flight flag, readable while `submit` runs.
    pub fn processing(&self) -> Processing {
        self.processing.clone()
    }

    pub fn submit_disabled(&self) -> bool {
        self.processing.is_set()
    }

    /// Send the donation and navigate home on success.
    ///
    /// Session and form are checked before any request. On failure the form
    /// stays populated so the user can try again.
    pub async fn submit(&mut self, session: &Session) -> ClientResult<Navigate<Donation>> {
        let donor_id = session.require_user_id()?;
        let errors = self.form.validate();
        if !errors.is_valid() {
            return Err(ClientError::Validation(errors));
        }
        let amount = self
            .form
            .effective_amount()
            .ok_or_else(|| ClientError::BadRequest("Invalid amount".to_string()))?;

        let donation = NewDonation {
            donor_id,
            amount,
            payment_method: PAYMENT_METHOD.to_string(),
            message: self.form.message.trim().to_string(),
        };

        let guard = self.processing.start();
        let result = self.repo.donate(session, &donation).await;
        drop(guard);

        match result {
            Ok(receipt) => {
                tracing::info!("Donation of {} received from user {}", amount, donor_id);
                self.form = DonationForm::default();
                Ok(Navigate::new(receipt, Route::Home))
            }
            Err(e) => {
                tracing::error!("Donation failed: {}", e);
                Err(e)
            }
        }
    }
}

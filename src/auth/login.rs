use crate::auth::session::{Session, SessionStore};
use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, NewUser, Profile, RoleRef, ACTIVE_STATUS, DEFAULT_ROLE_ID};
use crate::processing::Processing;
use crate::repository::AuthRepository;
use crate::routes::{Navigate, Route};
use crate::validation::{FormState, LoginForm, RegistrationForm};

/// Login screen state.
#[derive(Debug, Default)]
pub struct LoginFlow {
    pub form: FormState<LoginForm>,
    processing: Processing,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Shared view of the in-flight flag, readable while `submit` runs.
    pub fn processing(&self) -> Processing {
        self.processing.clone()
    }

    pub fn submit_disabled(&self) -> bool {
        self.processing.is_set() || self.form.submit_disabled()
    }

    /// Validate, authenticate, store the session, then go home.
    pub async fn submit(
        &mut self,
        store: &mut SessionStore,
        auth: &dyn AuthRepository,
    ) -> ClientResult<Navigate<Session>> {
        if !self.form.validate_all() {
            return Err(ClientError::Validation(self.form.errors().clone()));
        }
        let values = self.form.values();
        let credentials = Credentials {
            username: values.username.trim().to_string(),
            password: values.password.clone(),
        };

        let guard = self.processing.start();
        let result = store.login(auth, &credentials).await;
        drop(guard);

        let session = result?;
        self.form.reset();
        Ok(Navigate::new(session, Route::Home))
    }
}

/// Registration screen state.
#[derive(Debug, Default)]
pub struct RegistrationFlow {
    pub form: FormState<RegistrationForm>,
    processing: Processing,
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Shared view of the in-flight flag, readable while `submit` runs.
    pub fn processing(&self) -> Processing {
        self.processing.clone()
    }

    pub fn submit_disabled(&self) -> bool {
        self.processing.is_set() || self.form.submit_disabled()
    }

    /// Create the account and send the user to the login screen.
    ///
    /// Backend rejections (a taken username, say) come back as `Status` with
    /// the backend's text; the form keeps its values.
    pub async fn submit(&mut self, auth: &dyn AuthRepository) -> ClientResult<Navigate<Profile>> {
        if !self.form.validate_all() {
            return Err(ClientError::Validation(self.form.errors().clone()));
        }
        let values = self.form.values();
        let user = NewUser {
            username: values.username.trim().to_string(),
            password: values.password.clone(),
            phone: values.phone.clone(),
            email: values.email.clone(),
            status: ACTIVE_STATUS.to_string(),
            role: RoleRef {
                role_id: DEFAULT_ROLE_ID,
            },
        };

        let guard = self.processing.start();
        let result = auth.register(&user).await;
        drop(guard);

        let profile =
            result.inspect_err(|e| tracing::error!("Registration of {} failed: {}", user.username, e))?;
        tracing::info!("Registered user {}", profile.username);
        self.form.reset();
        Ok(Navigate::new(profile, Route::Login))
    }
}

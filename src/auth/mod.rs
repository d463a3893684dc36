pub mod login;
pub mod session;

pub use login::{LoginFlow, RegistrationFlow};
pub use session::{Session, SessionStore};

// Repository pattern - every backend call goes through one of these traits,
// so synchronizers never know whether they talk to HTTP or to fixtures.
pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::auth::session::Session;
use crate::error::ClientResult;
use crate::models::{
    Comment, Credentials, Donation, LoginResponse, NewComment, NewDonation, NewThread, NewUser,
    Profile, ProfileUpdate, Thread,
};

pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Unauthenticated account endpoints.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse>;

    async fn register(&self, user: &NewUser) -> ClientResult<Profile>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_profile(&self, session: &Session, user_id: i64) -> ClientResult<Profile>;

    async fn update_profile(
        &self,
        session: &Session,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile>;
}

#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Every thread, in backend order.
    async fn list_threads(&self, session: &Session) -> ClientResult<Vec<Thread>>;

    /// `None` when the backend has no thread with this id.
    async fn get_thread(&self, session: &Session, id: i64) -> ClientResult<Option<Thread>>;

    async fn create_thread(&self, session: &Session, thread: &NewThread) -> ClientResult<Thread>;

    /// Comments of one thread, oldest first.
    async fn list_comments(&self, session: &Session, thread_id: i64) -> ClientResult<Vec<Comment>>;

    async fn create_comment(&self, session: &Session, comment: &NewComment)
        -> ClientResult<Comment>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn donate(&self, session: &Session, donation: &NewDonation) -> ClientResult<Donation>;
}

use async_trait::async_trait;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::models::{
    Comment, Credentials, Donation, LoginResponse, NewComment, NewDonation, NewThread, NewUser,
    Profile, ProfileUpdate, Thread,
};
use crate::repository::{AuthRepository, DonationRepository, ThreadRepository, UserRepository};

/// REST implementation of every repository, routed through the [`Gateway`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    gateway: Gateway,
}

impl HttpBackend {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AuthRepository for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        self.gateway
            .post(&Session::default(), "api/v1/auth/login", credentials)
            .await
    }

    async fn register(&self, user: &NewUser) -> ClientResult<Profile> {
        self.gateway
            .post(&Session::default(), "api/v1/users", user)
            .await
    }
}

#[async_trait]
impl UserRepository for HttpBackend {
    async fn get_profile(&self, session: &Session, user_id: i64) -> ClientResult<Profile> {
        self.gateway
            .get(session, &format!("api/v1/users/{}", user_id))
            .await
    }

    async fn update_profile(
        &self,
        session: &Session,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile> {
        self.gateway
            .put(session, &format!("api/v1/users/{}", user_id), update)
            .await
    }
}

#[async_trait]
impl ThreadRepository for HttpBackend {
    async fn list_threads(&self, session: &Session) -> ClientResult<Vec<Thread>> {
        self.gateway.get(session, "api/publicaciones").await
    }

    async fn get_thread(&self, session: &Session, id: i64) -> ClientResult<Option<Thread>> {
        match self
            .gateway
            .get(session, &format!("api/publicaciones/{}", id))
            .await
        {
            Ok(thread) => Ok(Some(thread)),
            Err(ClientError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_thread(&self, session: &Session, thread: &NewThread) -> ClientResult<Thread> {
        self.gateway
            .post(session, "api/publicaciones/publicar", thread)
            .await
    }

    async fn list_comments(&self, session: &Session, thread_id: i64) -> ClientResult<Vec<Comment>> {
        self.gateway
            .get(
                session,
                &format!("api/comentarios/publicacion/{}", thread_id),
            )
            .await
    }

    async fn create_comment(
        &self,
        session: &Session,
        comment: &NewComment,
    ) -> ClientResult<Comment> {
        self.gateway
            .post(session, "api/comentarios/comentar", comment)
            .await
    }
}

#[async_trait]
impl DonationRepository for HttpBackend {
    async fn donate(&self, session: &Session, donation: &NewDonation) -> ClientResult<Donation> {
        self.gateway.post(session, "api/donaciones", donation).await
    }
}

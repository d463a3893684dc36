//! In-memory fixtures standing in for the REST backend.
//!
//! Behaves like a tiny server: logins check passwords, mutations refuse
//! requests without a bearer token, new threads get a temporary
//! timestamp-based id, and donations settle after a simulated delay.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::sync::Mutex;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Comment, Credentials, Donation, LoginResponse, NewComment, NewDonation, NewThread, NewUser,
    Profile, ProfileUpdate, Thread, DEFAULT_ROLE_ID,
};
use crate::repository::{AuthRepository, DonationRepository, ThreadRepository, UserRepository};

/// Delay before a simulated donation settles.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(2000);

const FIXTURE_IMAGE: &str = "https://media.revistagq.com/photos/63e9f744df9a2fddd35517c5/16:9/w_2560%2Cc_limit/resident-evil-4-remake.jpeg";

#[derive(Debug, Default)]
struct Store {
    users: Vec<(Profile, String)>,
    threads: Vec<Thread>,
    comments: Vec<Comment>,
    donations: Vec<Donation>,
    next_comment_id: i64,
}

pub struct MemoryBackend {
    store: Mutex<Store>,
    processing_delay: Duration,
}

impl MemoryBackend {
    /// Empty backend with no users or threads.
    pub fn empty() -> Self {
        Self::from_store(Store {
            next_comment_id: 1,
            ..Store::default()
        })
    }

    /// Backend preloaded with demo users, threads and comments.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        seed(&mut store);
        Self::from_store(store)
    }

    fn from_store(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub async fn donations(&self) -> Vec<Donation> {
        self.store.lock().await.donations.clone()
    }
}

fn unauthorized() -> ClientError {
    ClientError::Status {
        status: 401,
        body: "Unauthorized".to_string(),
    }
}

fn require_token(session: &Session) -> ClientResult<()> {
    if session.token.is_some() {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

/// Random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[async_trait]
impl AuthRepository for MemoryBackend {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        let store = self.store.lock().await;
        let (profile, _) = store
            .users
            .iter()
            .find(|(p, password)| {
                p.username == credentials.username && *password == credentials.password
            })
            .ok_or_else(unauthorized)?;

        Ok(LoginResponse {
            token: generate_token(),
            user_id: profile.id,
            username: profile.username.clone(),
            role_id: profile.role_id,
        })
    }

    async fn register(&self, user: &NewUser) -> ClientResult<Profile> {
        let mut store = self.store.lock().await;
        if store.users.iter().any(|(p, _)| p.username == user.username) {
            return Err(ClientError::Status {
                status: 409,
                body: format!("Username {} is already taken", user.username),
            });
        }

        let id = store.users.iter().map(|(p, _)| p.id).max().unwrap_or(0) + 1;
        let profile = Profile {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: Some(user.phone.clone()),
            role_id: Some(user.role.role_id),
        };
        store.users.push((profile.clone(), user.password.clone()));
        Ok(profile)
    }
}

#[async_trait]
impl UserRepository for MemoryBackend {
    async fn get_profile(&self, session: &Session, user_id: i64) -> ClientResult<Profile> {
        require_token(session)?;
        let store = self.store.lock().await;
        store
            .users
            .iter()
            .find(|(p, _)| p.id == user_id)
            .map(|(p, _)| p.clone())
            .ok_or_else(|| ClientError::Status {
                status: 404,
                body: format!("User {} not found", user_id),
            })
    }

    async fn update_profile(
        &self,
        session: &Session,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile> {
        require_token(session)?;
        let mut store = self.store.lock().await;
        let (profile, _) = store
            .users
            .iter_mut()
            .find(|(p, _)| p.id == user_id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                body: format!("User {} not found", user_id),
            })?;
        profile.username = update.username.clone();
        profile.email = update.email.clone();
        Ok(profile.clone())
    }
}

#[async_trait]
impl ThreadRepository for MemoryBackend {
    async fn list_threads(&self, _session: &Session) -> ClientResult<Vec<Thread>> {
        let store = self.store.lock().await;
        let mut threads = store.threads.clone();
        for thread in &mut threads {
            thread.comment_count = store
                .comments
                .iter()
                .filter(|c| c.thread_id == thread.id)
                .count() as i64;
        }
        Ok(threads)
    }

    async fn get_thread(&self, _session: &Session, id: i64) -> ClientResult<Option<Thread>> {
        let store = self.store.lock().await;
        Ok(store.threads.iter().find(|t| t.id == id).cloned())
    }

    async fn create_thread(&self, session: &Session, thread: &NewThread) -> ClientResult<Thread> {
        require_token(session)?;
        let mut store = self.store.lock().await;

        // Temporary id from the clock, bumped past any existing id.
        let max_id = store.threads.iter().map(|t| t.id).max().unwrap_or(0);
        let id = Utc::now().timestamp_millis().max(max_id + 1);

        let created = Thread {
            id,
            author_id: Some(thread.author_id),
            author_name: thread.author_name.clone(),
            category: thread.category.clone(),
            title: thread.title.clone(),
            description: thread.description.clone(),
            image_url: thread.image_url.clone(),
            created_at: now(),
            like_count: 0,
            comment_count: 0,
        };
        store.threads.insert(0, created.clone());
        Ok(created)
    }

    async fn list_comments(&self, _session: &Session, thread_id: i64) -> ClientResult<Vec<Comment>> {
        let store = self.store.lock().await;
        Ok(store
            .comments
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        session: &Session,
        comment: &NewComment,
    ) -> ClientResult<Comment> {
        require_token(session)?;
        let mut store = self.store.lock().await;
        if !store.threads.iter().any(|t| t.id == comment.thread_id) {
            return Err(ClientError::Status {
                status: 404,
                body: format!("Thread {} not found", comment.thread_id),
            });
        }

        let created = Comment {
            id: store.next_comment_id,
            thread_id: comment.thread_id,
            author_id: Some(comment.user_id),
            author_name: comment.author_name.clone(),
            content: comment.content.clone(),
            created_at: now(),
        };
        store.next_comment_id += 1;
        store.comments.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl DonationRepository for MemoryBackend {
    async fn donate(&self, session: &Session, donation: &NewDonation) -> ClientResult<Donation> {
        require_token(session)?;
        tokio::time::sleep(self.processing_delay).await;

        let mut store = self.store.lock().await;
        let receipt = Donation {
            id: store.donations.len() as i64 + 1,
            donor_id: donation.donor_id,
            amount: donation.amount,
            payment_method: donation.payment_method.clone(),
            message: donation.message.clone(),
            created_at: now(),
        };
        store.donations.push(receipt.clone());
        tracing::info!(
            "Simulated donation of {} from user {}",
            receipt.amount,
            receipt.donor_id
        );
        Ok(receipt)
    }
}

fn seed(store: &mut Store) {
    let user = |id: i64, username: &str, email: &str, phone: &str| Profile {
        id,
        username: username.to_string(),
        email: email.to_string(),
        phone: Some(phone.to_string()),
        role_id: Some(DEFAULT_ROLE_ID),
    };
    store.users = vec![
        (
            user(1, "MaSamaniego", "MaSamaniego@gmail.com", "912345678"),
            "pixelhub".to_string(),
        ),
        (
            user(7, "vega", "vega@pixelhub.cl", "987654321"),
            "1234".to_string(),
        ),
    ];

    let thread = |id: i64,
                  title: &str,
                  author: &str,
                  likes: i64,
                  category: &str,
                  body: &str,
                  date: &str| Thread {
        id,
        author_id: None,
        author_name: author.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        description: body.to_string(),
        image_url: Some(FIXTURE_IMAGE.to_string()),
        created_at: date.to_string(),
        like_count: likes,
        comment_count: 0,
    };
    store.threads = vec![
        thread(
            1,
            "Best FPS games of 2024",
            "John Doe",
            42,
            "Shooter",
            "Which shooters stood out this year? RE4 Remake is incredible, but the new COD and Valorant are strong contenders.",
            "2025-10-20",
        ),
        thread(
            2,
            "Indie gems you should try",
            "Sarah",
            35,
            "Indie",
            "Indie games are saving the industry. Hollow Knight and Celeste prove you don't need 4K graphics to have fun.",
            "2025-10-22",
        ),
        thread(
            3,
            "Latest gaming news",
            "Mike",
            28,
            "Noticias",
            "Weekly roundup: new console launches, AAA delays and GTA VI rumours.",
            "2025-10-23",
        ),
    ];

    let comment = |id: i64, thread_id: i64, author: &str, text: &str, date: &str| Comment {
        id,
        thread_id,
        author_id: None,
        author_name: author.to_string(),
        content: text.to_string(),
        created_at: date.to_string(),
    };
    store.comments = vec![
        comment(101, 1, "GamerPro", "Totally agree! RE4 is a masterpiece.", "2025-10-20"),
        comment(102, 1, "NoobMaster", "I prefer Valorant for the competitive scene.", "2025-10-21"),
        comment(201, 2, "IndieLover", "Hollow Knight is unbeatable, still waiting for Silksong...", "2025-10-22"),
    ];
    store.next_comment_id = 202;
}

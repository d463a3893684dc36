use std::sync::Arc;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{NewThread, Thread};
use crate::repository::ThreadRepository;
use crate::threads::Category;
use crate::validation::ValidationErrors;

/// Image used when a new thread is posted without one.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400/333/fff?text=Nuevo+Hilo";

/// Fields of the "new thread" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadDraft {
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl ThreadDraft {
    const FIELDS: &'static [&'static str] = &["category", "title", "description"];

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(Self::FIELDS);
        if self.category.parse::<Category>().is_err() {
            errors.set("category", "You must choose a category.");
        }
        if self.title.trim().is_empty() {
            errors.set("title", "You must write a title.");
        }
        if self.description.trim().is_empty() {
            errors.set("description", "You must write a message.");
        }
        errors
    }
}

/// Authoritative server set plus threads created locally since the last fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Ready {
        server: Vec<Thread>,
        /// Newest first. Dropped entry by entry once the server returns them.
        overlay: Vec<Thread>,
    },
}

impl ListState {
    pub fn name(&self) -> &'static str {
        match self {
            ListState::Loading => "Loading",
            ListState::Ready { overlay, .. } if overlay.is_empty() => "Ready",
            ListState::Ready { .. } => "ReadyPendingWrites",
        }
    }
}

pub struct ThreadList {
    repo: Arc<dyn ThreadRepository>,
    state: ListState,
    active: Category,
}

impl ThreadList {
    pub fn new(repo: Arc<dyn ThreadRepository>) -> Self {
        Self {
            repo,
            state: ListState::Loading,
            active: Category::default(),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn active_category(&self) -> Category {
        self.active
    }

    pub fn select_category(&mut self, category: Category) {
        self.active = category;
    }

    /// Replace the server set wholesale and reconcile the local overlay.
    ///
    /// On failure the state is left as it was: a list that never loaded
    /// stays in `Loading`. No retry is attempted.
    pub async fn fetch_all(&mut self, session: &Session) -> ClientResult<Vec<Thread>> {
        let server = match self.repo.list_threads(session).await {
            Ok(threads) => threads,
            Err(e) => {
                tracing::error!("Failed to fetch threads: {}", e);
                return Err(e);
            }
        };

        let overlay = match std::mem::replace(&mut self.state, ListState::Loading) {
            ListState::Ready { overlay, .. } => overlay
                .into_iter()
                .filter(|local| !server.iter().any(|s| s.id == local.id))
                .collect(),
            ListState::Loading => Vec::new(),
        };
        tracing::debug!(
            "Fetched {} threads, {} local threads still pending",
            server.len(),
            overlay.len()
        );
        self.state = ListState::Ready { server, overlay };

        Ok(self.threads().into_iter().cloned().collect())
    }

    /// Overlay first, then the server set. A server copy wins over a local one.
    pub fn threads(&self) -> Vec<&Thread> {
        match &self.state {
            ListState::Loading => Vec::new(),
            ListState::Ready { server, overlay } => overlay
                .iter()
                .filter(|local| !server.iter().any(|s| s.id == local.id))
                .chain(server.iter())
                .collect(),
        }
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<&Thread> {
        self.threads()
            .into_iter()
            .filter(|t| t.category == category.as_str())
            .collect()
    }

    /// Threads under the active tab.
    pub fn visible(&self) -> Vec<&Thread> {
        self.filter_by_category(self.active)
    }

    /// Post a new thread and prepend the backend's copy without refetching.
    ///
    /// The active tab switches to the new thread's category. On any failure
    /// the list is left untouched.
    pub async fn submit(&mut self, session: &Session, draft: &ThreadDraft) -> ClientResult<Thread> {
        let errors = draft.validate();
        if !errors.is_valid() {
            return Err(ClientError::Validation(errors));
        }
        let category: Category = draft
            .category
            .parse()
            .map_err(|e: crate::threads::UnknownCategory| ClientError::BadRequest(e.to_string()))?;
        let author_id = session.require_user_id()?;

        let image_url = match draft.image_url.trim() {
            "" => PLACEHOLDER_IMAGE.to_string(),
            url => url.to_string(),
        };
        let new_thread = NewThread {
            author_id,
            author_name: session.author_name().to_string(),
            category: category.as_str().to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            image_url: Some(image_url),
        };

        let created = match self.repo.create_thread(session, &new_thread).await {
            Ok(thread) => thread,
            Err(e) => {
                tracing::error!("Failed to post thread: {}", e);
                return Err(e);
            }
        };

        if let ListState::Ready { overlay, .. } = &mut self.state {
            overlay.insert(0, created.clone());
        } else {
            self.state = ListState::Ready {
                server: Vec::new(),
                overlay: vec![created.clone()],
            };
        }
        self.active = created.category.parse().unwrap_or(category);
        tracing::info!("Posted thread {} in {}", created.id, created.category);

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;
    use crate::models::NewComment;
    use crate::repository::MemoryBackend;
    use async_trait::async_trait;

    fn session() -> Session {
        Session {
            token: Some("t1".into()),
            user_id: Some(7),
            display_name: Some("vega".into()),
            role_id: Some(2),
        }
    }

    fn draft(category: &str, title: &str) -> ThreadDraft {
        ThreadDraft {
            category: category.into(),
            title: title.into(),
            description: "Let's talk about it".into(),
            image_url: String::new(),
        }
    }

    fn thread(id: i64, category: &str) -> Thread {
        Thread {
            id,
            author_id: None,
            author_name: "Mike".into(),
            category: category.into(),
            title: format!("Thread {}", id),
            description: "body".into(),
            image_url: None,
            created_at: String::new(),
            like_count: 0,
            comment_count: 0,
        }
    }

    /// Backend whose list never reflects created threads, and can be told to fail.
    struct LaggingRepo {
        server: Vec<Thread>,
        fail_list: bool,
        fail_create: bool,
    }

    #[async_trait]
    impl ThreadRepository for LaggingRepo {
        async fn list_threads(&self, _session: &Session) -> ClientResult<Vec<Thread>> {
            if self.fail_list {
                return Err(ClientError::Status {
                    status: 503,
                    body: "down".into(),
                });
            }
            Ok(self.server.clone())
        }

        async fn get_thread(&self, _session: &Session, _id: i64) -> ClientResult<Option<Thread>> {
            Ok(None)
        }

        async fn create_thread(
            &self,
            _session: &Session,
            new: &NewThread,
        ) -> ClientResult<Thread> {
            if self.fail_create {
                return Err(ClientError::Status {
                    status: 500,
                    body: "Could not save thread".into(),
                });
            }
            let mut created = thread(99, &new.category);
            created.title = new.title.clone();
            Ok(created)
        }

        async fn list_comments(
            &self,
            _session: &Session,
            _thread_id: i64,
        ) -> ClientResult<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn create_comment(
            &self,
            _session: &Session,
            _comment: &NewComment,
        ) -> ClientResult<Comment> {
            Err(ClientError::Status {
                status: 500,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn fetch_moves_loading_to_ready() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        assert_eq!(list.state().name(), "Loading");
        assert!(list.threads().is_empty());

        let threads = list.fetch_all(&Session::default()).await.unwrap();
        assert_eq!(threads.len(), 3);
        assert_eq!(list.state().name(), "Ready");
        assert_eq!(list.visible().len(), 1);
        assert_eq!(list.visible()[0].category, "Shooter");
    }

    #[tokio::test]
    async fn failed_fetch_stays_loading() {
        let mut list = ThreadList::new(Arc::new(LaggingRepo {
            server: Vec::new(),
            fail_list: true,
            fail_create: false,
        }));
        assert!(list.fetch_all(&session()).await.is_err());
        assert_eq!(list.state(), &ListState::Loading);
    }

    #[tokio::test]
    async fn filter_is_a_projection_over_the_current_set() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        list.fetch_all(&Session::default()).await.unwrap();
        let indie = list.filter_by_category(Category::Indie);
        assert_eq!(indie.len(), 1);
        assert_eq!(indie[0].title, "Indie gems you should try");
        assert!(list.filter_by_category(Category::Retro).is_empty());
    }

    #[tokio::test]
    async fn unknown_server_category_never_shows() {
        let mut list = ThreadList::new(Arc::new(LaggingRepo {
            server: vec![thread(1, "Strategy"), thread(2, "RPG")],
            fail_list: false,
            fail_create: false,
        }));
        list.fetch_all(&session()).await.unwrap();
        let shown: usize = Category::ALL
            .iter()
            .map(|c| list.filter_by_category(*c).len())
            .sum();
        assert_eq!(shown, 1);
        assert_eq!(list.threads().len(), 2);
    }

    #[tokio::test]
    async fn submit_prepends_and_switches_tab() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        list.fetch_all(&session()).await.unwrap();

        let created = list
            .submit(&session(), &draft("Indie", "Hades II"))
            .await
            .unwrap();

        assert_eq!(list.active_category(), Category::Indie);
        let visible = list.visible();
        assert_eq!(visible.iter().filter(|t| t.id == created.id).count(), 1);
        assert_eq!(list.threads()[0].id, created.id);
        assert_eq!(created.image_url.as_deref(), Some(PLACEHOLDER_IMAGE));
        assert_eq!(created.author_name, "vega");
        assert_eq!(list.state().name(), "ReadyPendingWrites");
    }

    #[tokio::test]
    async fn refetch_prefers_server_copy_of_local_thread() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        list.fetch_all(&session()).await.unwrap();
        let created = list
            .submit(&session(), &draft("Indie", "Hades II"))
            .await
            .unwrap();

        list.fetch_all(&session()).await.unwrap();
        assert_eq!(list.state().name(), "Ready");
        let matching = list
            .filter_by_category(Category::Indie)
            .into_iter()
            .filter(|t| t.id == created.id)
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn lagging_server_keeps_local_thread_visible() {
        let mut list = ThreadList::new(Arc::new(LaggingRepo {
            server: vec![thread(1, "Retro")],
            fail_list: false,
            fail_create: false,
        }));
        list.fetch_all(&session()).await.unwrap();
        list.submit(&session(), &draft("Retro", "SNES"))
            .await
            .unwrap();

        list.fetch_all(&session()).await.unwrap();
        let ids: Vec<i64> = list.visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![99, 1]);
    }

    #[tokio::test]
    async fn failed_submit_leaves_list_and_tab_untouched() {
        let mut list = ThreadList::new(Arc::new(LaggingRepo {
            server: vec![thread(1, "Shooter"), thread(2, "Retro")],
            fail_list: false,
            fail_create: true,
        }));
        list.fetch_all(&session()).await.unwrap();
        let before = list.state().clone();

        let err = list
            .submit(&session(), &draft("Retro", "SNES"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Could not save thread");
        assert_eq!(list.state(), &before);
        assert_eq!(list.state().name(), "Ready");
        assert_eq!(list.active_category(), Category::Shooter);
    }

    #[tokio::test]
    async fn submit_from_loading_makes_list_ready() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        let created = list
            .submit(&session(), &draft("RPG", "Elden Ring"))
            .await
            .unwrap();
        assert_eq!(list.active_category(), Category::Rpg);
        assert_eq!(list.visible().len(), 1);
        assert_eq!(list.visible()[0].id, created.id);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_locally() {
        let backend = Arc::new(MemoryBackend::seeded());
        let mut list = ThreadList::new(backend.clone());
        list.fetch_all(&session()).await.unwrap();

        let err = list
            .submit(&session(), &draft("", "  "))
            .await
            .unwrap_err();
        match err {
            ClientError::Validation(errors) => {
                assert!(errors.has_error("category"));
                assert!(errors.has_error("title"));
                assert!(!errors.has_error("description"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(list.threads().len(), 3);
        assert_eq!(
            backend.list_threads(&session()).await.unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn submit_without_session_leaves_list_unchanged() {
        let mut list = ThreadList::new(Arc::new(MemoryBackend::seeded()));
        list.fetch_all(&Session::default()).await.unwrap();
        let before = list.state().clone();

        let err = list
            .submit(&Session::default(), &draft("Indie", "Hades II"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unauthenticated));
        assert_eq!(list.state(), &before);
        assert_eq!(list.active_category(), Category::Shooter);
    }
}

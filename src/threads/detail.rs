use std::sync::Arc;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{Comment, NewComment, Thread};
use crate::repository::ThreadRepository;
use crate::validation::ValidationErrors;

/// Resolve the thread to show: a carried snapshot for the same id, else a fetch.
///
/// The snapshot is used as-is with no background refresh, so it may be older
/// than the backend copy.
pub async fn resolve_thread(
    repo: &dyn ThreadRepository,
    session: &Session,
    id: i64,
    snapshot: Option<Thread>,
) -> ClientResult<Option<Thread>> {
    match snapshot {
        Some(thread) if thread.id == id => {
            tracing::debug!("Using carried snapshot for thread {}", id);
            Ok(Some(thread))
        }
        Some(other) => {
            tracing::warn!(
                "Ignoring snapshot of thread {} while opening thread {}",
                other.id,
                id
            );
            repo.get_thread(session, id).await
        }
        None => repo.get_thread(session, id).await,
    }
}

/// One thread and its append-only comment list.
pub struct ThreadDetail {
    repo: Arc<dyn ThreadRepository>,
    thread: Thread,
    comments: Vec<Comment>,
}

impl ThreadDetail {
    /// Open a thread screen. `NotFound` when neither path yields the thread.
    pub async fn open(
        repo: Arc<dyn ThreadRepository>,
        session: &Session,
        id: i64,
        snapshot: Option<Thread>,
    ) -> ClientResult<Self> {
        let thread = resolve_thread(repo.as_ref(), session, id, snapshot)
            .await
            .inspect_err(|e| tracing::error!("Failed to load thread {}: {}", id, e))?
            .ok_or_else(|| ClientError::NotFound(format!("Thread {}", id)))?;

        Ok(Self {
            repo,
            thread,
            comments: Vec::new(),
        })
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Badge count. Always the local list length, never the stored count.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Replace the local comments with the backend's list, oldest first.
    pub async fn load_comments(&mut self, session: &Session) -> ClientResult<&[Comment]> {
        let thread_id = self.thread.id;
        let fetched = self
            .repo
            .list_comments(session, thread_id)
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to load comments for thread {}: {}", thread_id, e)
            })?;

        self.comments = fetched
            .into_iter()
            .filter(|c| {
                let belongs = c.thread_id == thread_id;
                if !belongs {
                    tracing::warn!(
                        "Dropping comment {} of thread {} from thread {} listing",
                        c.id,
                        c.thread_id,
                        thread_id
                    );
                }
                belongs
            })
            .collect();

        Ok(&self.comments)
    }

    /// Post a comment and append the backend's copy to the local list.
    ///
    /// Blank content is rejected before any request is made.
    pub async fn post_comment(&mut self, session: &Session, content: &str) -> ClientResult<Comment> {
        if content.trim().is_empty() {
            let mut errors = ValidationErrors::new(&["content"]);
            errors.set("content", "Comment cannot be empty.");
            return Err(ClientError::Validation(errors));
        }
        let user_id = session.require_user_id()?;

        let new_comment = NewComment {
            thread_id: self.thread.id,
            user_id,
            content: content.to_string(),
            author_name: session.author_name().to_string(),
        };

        let created = self
            .repo
            .create_comment(session, &new_comment)
            .await
            .inspect_err(|e| tracing::error!("Failed to post comment: {}", e))?;

        self.comments.push(created.clone());
        Ok(created)
    }
}

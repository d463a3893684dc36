use clap::Subcommand;

use crate::account::AccountSync;
use crate::auth::login::{LoginFlow, RegistrationFlow};
use crate::contact::ContactFlow;
use crate::donation::DonationSubmitter;
use crate::error::{ClientError, ClientResult, ErrorKind, Operation};
use crate::models::{Comment, Thread};
use crate::state::AppState;
use crate::threads::{Category, ThreadDetail, ThreadDraft, ThreadList};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    #[command(subcommand)]
    Threads(ThreadsCommand),
    /// Comment on a thread
    Comment { thread_id: i64, text: String },
    #[command(subcommand)]
    Account(AccountCommand),
    /// Make a donation
    Donate {
        /// One of 5000, 10000 or 20000
        #[arg(long, conflicts_with = "amount")]
        preset: Option<u64>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        card_name: String,
        #[arg(long)]
        card_number: String,
        #[arg(long, default_value = "")]
        cvc: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Send a message to the PixelHub team
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        message: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThreadsCommand {
    /// List threads under a category tab
    List {
        #[arg(long, default_value_t = Category::default())]
        category: Category,
    },
    /// Show a thread with its comments
    Show { id: i64 },
    /// Start a new thread
    Post {
        #[arg(long)]
        category: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommand {
    Show,
    /// Change username and/or email
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

impl Command {
    /// Read-only commands surface backend failures as an empty result.
    pub fn operation(&self) -> Operation {
        match self {
            Command::Whoami
            | Command::Threads(ThreadsCommand::List { .. })
            | Command::Threads(ThreadsCommand::Show { .. })
            | Command::Account(AccountCommand::Show) => Operation::Fetch,
            _ => Operation::Mutation,
        }
    }
}

/// Text printed when a command fails.
pub fn failure_notice(err: &ClientError, operation: Operation) -> String {
    match err.kind(operation) {
        ErrorKind::Fetch => match err {
            ClientError::NotFound(_) => err.user_message(),
            _ => {
                tracing::error!("Load failed: {}", err);
                "Nothing to show right now.".to_string()
            }
        },
        ErrorKind::Authentication if err.redirect().is_some() => {
            format!("{} Run `pixelhub login`.", err.user_message())
        }
        ErrorKind::Validation | ErrorKind::Authentication | ErrorKind::Mutation => {
            err.user_message()
        }
    }
}

fn print_thread(thread: &Thread) {
    println!(
        "#{} [{}] {} by {} ({} likes, {} comments)",
        thread.id,
        thread.category,
        thread.title,
        thread.author_name,
        thread.like_count,
        thread.comment_count
    );
}

fn print_comment(comment: &Comment) {
    println!("  {} ({}): {}", comment.author_name, comment.created_at, comment.content);
}

pub async fn run(command: Command, state: &mut AppState) -> ClientResult<()> {
    let session = state.session.current();
    let backend = state.backend.clone();

    match command {
        Command::Login { username, password } => {
            let mut flow = LoginFlow::new();
            flow.form.edit("username", |f| f.username = username);
            flow.form.edit("password", |f| f.password = password);
            let outcome = flow.submit(&mut state.session, backend.auth.as_ref()).await?;
            println!("Welcome, {}!", outcome.value.author_name());
        }
        Command::Logout => {
            state.session.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => match session.user_id {
            Some(id) if session.is_authenticated() => {
                println!("{} (user {})", session.author_name(), id)
            }
            _ => println!("Not signed in."),
        },
        Command::Register {
            username,
            password,
            phone,
            email,
        } => {
            let mut flow = RegistrationFlow::new();
            flow.form.edit("username", |f| f.username = username);
            flow.form.edit("phone", |f| f.phone = phone);
            flow.form.edit("email", |f| f.email = email);
            flow.form.edit("password", |f| f.password = password);
            let outcome = flow.submit(backend.auth.as_ref()).await?;
            println!(
                "Account {} created. Sign in with `pixelhub login`.",
                outcome.value.username
            );
        }
        Command::Threads(ThreadsCommand::List { category }) => {
            let mut list = ThreadList::new(backend.threads.clone());
            list.select_category(category);
            list.fetch_all(&session).await?;
            let visible = list.visible();
            if visible.is_empty() {
                println!("No threads under {} yet.", category);
            }
            for thread in visible {
                print_thread(thread);
            }
        }
        Command::Threads(ThreadsCommand::Show { id }) => {
            let mut detail = ThreadDetail::open(backend.threads.clone(), &session, id, None).await?;
            detail.load_comments(&session).await?;
            let thread = detail.thread();
            print_thread(thread);
            println!("{}", thread.description);
            println!("Comments ({}):", detail.comment_count());
            for comment in detail.comments() {
                print_comment(comment);
            }
        }
        Command::Threads(ThreadsCommand::Post {
            category,
            title,
            description,
            image_url,
        }) => {
            let mut list = ThreadList::new(backend.threads.clone());
            let draft = ThreadDraft {
                category,
                title,
                description,
                image_url,
            };
            let created = list.submit(&session, &draft).await?;
            print_thread(&created);
        }
        Command::Comment { thread_id, text } => {
            let mut detail =
                ThreadDetail::open(backend.threads.clone(), &session, thread_id, None).await?;
            let comment = detail.post_comment(&session, &text).await?;
            print_comment(&comment);
        }
        Command::Account(command) => {
            let user_id = session.require_user_id()?;
            let mut account = AccountSync::new(backend.users.clone());
            account.load(&session, user_id).await?;
            if let AccountCommand::Update { username, email } = command {
                if let Some(username) = username {
                    account.set_username(username);
                }
                if let Some(email) = email {
                    account.set_email(email);
                }
                if !account.is_dirty() {
                    println!("Nothing to update.");
                    return Ok(());
                }
                account.save(&session).await?;
                println!("Profile saved.");
            }
            if let Some(profile) = account.profile() {
                println!("Username: {}", profile.username);
                println!("Email:    {}", profile.email);
                if let Some(phone) = &profile.phone {
                    println!("Phone:    {}", phone);
                }
            }
        }
        Command::Donate {
            preset,
            amount,
            card_name,
            card_number,
            cvc,
            message,
        } => {
            let mut submitter = DonationSubmitter::new(backend.donations.clone());
            if let Some(preset) = preset {
                submitter.form.select_preset(preset)?;
            }
            if let Some(amount) = amount {
                submitter.form.set_custom_amount(amount);
            }
            submitter.form.set_card_name(card_name);
            submitter.form.set_card_number(&card_number);
            submitter.form.set_cvc(&cvc);
            submitter.form.set_message(message);
            println!("Processing payment...");
            let outcome = submitter.submit(&session).await?;
            println!("Thank you for donating ${} CLP!", outcome.value.amount);
        }
        Command::Contact {
            name,
            email,
            message,
        } => {
            let mut flow = ContactFlow::new();
            flow.form.edit("name", |f| f.name = name);
            flow.form.edit("email", |f| f.email = email);
            flow.form.edit("message", |f| f.message = message);
            println!("{}", flow.submit()?);
        }
    }

    Ok(())
}

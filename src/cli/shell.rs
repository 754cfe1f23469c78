// src/cli/shell.rs - Interactive session on top of the store

use crate::api::types::{AuthMode, Pod, PodId};
use crate::infra::errors::BookingError;
use crate::store::{AppStore, DraftPatch};

use super::render;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login(AuthMode),
    Logout,
    WhoAmI,
    Pods,
    Pod(PodId),
    Draft {
        pod_id: PodId,
        start: Option<String>,
        end: Option<String>,
    },
    Book(PodId),
    Bookings,
    History,
    Clear,
    Help,
    Quit,
    /// Anything that isn't a slash command goes to the concierge.
    Chat(String),
    Empty,
    Invalid(String),
}

pub fn parse_command(input: &str) -> ShellCommand {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }
    if trimmed == "quit" || trimmed == "exit" {
        return ShellCommand::Quit;
    }
    if !trimmed.starts_with('/') {
        return ShellCommand::Chat(trimmed.to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match cmd {
        "/login" => ShellCommand::Login(AuthMode::Login),
        "/signup" | "/register" => ShellCommand::Login(AuthMode::Signup),
        "/logout" => ShellCommand::Logout,
        "/whoami" => ShellCommand::WhoAmI,
        "/pods" => ShellCommand::Pods,
        "/pod" => with_pod_id(&args, ShellCommand::Pod),
        "/book" => with_pod_id(&args, ShellCommand::Book),
        "/draft" => match args.first().map(|a| a.parse::<PodId>()) {
            Some(Ok(pod_id)) => ShellCommand::Draft {
                pod_id,
                start: draft_arg(args.get(1)),
                end: draft_arg(args.get(2)),
            },
            _ => ShellCommand::Invalid("Usage: /draft <pod id> [start|-] [end|-]".into()),
        },
        "/bookings" => ShellCommand::Bookings,
        "/history" => ShellCommand::History,
        "/clear" => ShellCommand::Clear,
        "/help" => ShellCommand::Help,
        "/quit" | "/exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("Unknown command: {other}. Type /help for commands.")),
    }
}

fn with_pod_id(args: &[&str], build: fn(PodId) -> ShellCommand) -> ShellCommand {
    match args.first().map(|a| a.parse::<PodId>()) {
        Some(Ok(id)) => build(id),
        Some(Err(_)) => ShellCommand::Invalid(format!("Invalid pod id: {}", args[0])),
        None => ShellCommand::Invalid("Missing pod id".into()),
    }
}

/// `-` keeps the current value.
fn draft_arg(arg: Option<&&str>) -> Option<String> {
    arg.filter(|a| **a != "-").map(|a| a.to_string())
}

/// Run the interactive session until EOF or `/quit`.
pub async fn run_shell(store: &AppStore, email_hint: Option<&str>) -> anyhow::Result<()> {
    eprintln!("kubo v{} | type /help for commands\n", env!("CARGO_PKG_VERSION"));

    match store.fetch_current_user().await {
        Some(user) => eprintln!("  Signed in as {}", user.email),
        None => eprintln!("  Not signed in. Use /login or /signup."),
    }
    if let Some(email) = email_hint {
        store.set_email(email);
    }

    while let Some(input) = read_input() {
        match parse_command(&input) {
            ShellCommand::Quit => break,
            ShellCommand::Empty => continue,
            command => handle_command(store, command).await,
        }
    }
    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

async fn handle_command(store: &AppStore, command: ShellCommand) {
    match command {
        ShellCommand::Login(mode) => login(store, mode).await,

        ShellCommand::Logout => {
            store.logout().await;
            eprintln!("  Logged out.");
        }

        ShellCommand::WhoAmI => match store.read(|s| s.user.clone()) {
            Some(user) => eprintln!("  {} (id {})", user.email, user.id),
            None => eprintln!("  Not signed in."),
        },

        ShellCommand::Pods => {
            store.load_pods().await;
            let state = store.snapshot();
            if !state.is_authenticated() {
                eprintln!("  Log in to see pods.");
                return;
            }
            if state.pods.is_empty() {
                eprintln!("  No pods available.");
            }
            for pod in &state.pods {
                println!("{}", render::pod_line(pod));
            }
            print_status(store);
        }

        ShellCommand::Pod(pod_id) => {
            let pod = match store.pod(pod_id) {
                Some(pod) => Some(pod),
                None => store.fetch_pod(pod_id).await,
            };
            match pod {
                Some(pod) => println!("{}", render::pod_detail(&pod, &store.booking_draft(pod_id))),
                None => eprintln!("  Pod not found"),
            }
        }

        ShellCommand::Draft { pod_id, start, end } => {
            let draft = store.set_booking_draft(pod_id, DraftPatch { start, end });
            eprintln!("  Draft for pod #{pod_id}: {} -> {}", draft.start, draft.end);
        }

        ShellCommand::Book(pod_id) => {
            let pod = match booking_target(store, pod_id).await {
                Ok(pod) => pod,
                Err(message) => {
                    eprintln!("  {message}");
                    return;
                }
            };
            match store.book_pod(&pod).await {
                Ok(_) => {}
                Err(e) if e.is_local() => tracing::debug!(pod_id, "booking rejected: {e}"),
                Err(e) => tracing::debug!(pod_id, "booking failed: {e}"),
            }
            print_status(store);
        }

        ShellCommand::Bookings => {
            store.load_my_bookings().await;
            let bookings = store.read(|s| s.bookings.clone());
            if bookings.is_empty() {
                eprintln!("  No bookings yet.");
            }
            for booking in &bookings {
                println!(
                    "{}",
                    render::booking_line(booking, &store.pod_name_for(booking.pod_id))
                );
            }
        }

        ShellCommand::History => {
            store.load_chat_history().await;
            for message in store.read(|s| s.chat_messages.clone()) {
                println!("{}", render::message_line(&message));
            }
        }

        ShellCommand::Clear => {
            store.clear_chat_messages();
            eprintln!("  Transcript cleared.");
        }

        ShellCommand::Chat(text) => {
            store.set_chat_input(text);
            if let Some(reply) = store.send_chat_message().await {
                println!("{}", render::message_line(&reply));
            }
        }

        ShellCommand::Help => print_help(),

        ShellCommand::Invalid(message) => eprintln!("  {message}"),

        ShellCommand::Quit | ShellCommand::Empty => {}
    }
}

/// The pod `/book` should act on. Login comes first so an anonymous user is
/// told why, rather than that the pod doesn't exist.
async fn booking_target(store: &AppStore, pod_id: PodId) -> Result<Pod, String> {
    if !store.read(|s| s.is_authenticated()) {
        return Err(BookingError::LoginRequired.to_string());
    }
    match store.pod(pod_id) {
        Some(pod) => Ok(pod),
        None => store
            .fetch_pod(pod_id)
            .await
            .ok_or_else(|| "Pod not found".to_string()),
    }
}

async fn login(store: &AppStore, mode: AuthMode) {
    store.set_auth_mode(mode);

    let current = store.read(|s| s.email.clone());
    let email = match inquire::Text::new("Email:")
        .with_default(&current)
        .prompt_skippable()
    {
        Ok(Some(email)) if !email.trim().is_empty() => email,
        _ => return,
    };
    let password = match inquire::Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt_skippable()
    {
        Ok(Some(password)) => password,
        _ => return,
    };

    store.set_email(email.trim());
    store.set_password(password);
    match store.authenticate().await {
        Ok(user) => {
            let pods = store.read(|s| s.pods.len());
            eprintln!("  Welcome, {}. {pods} pod(s) available.", user.email);
        }
        Err(_) => {
            let message = store
                .read(|s| s.auth_error.clone())
                .unwrap_or_else(|| "Authentication failed".into());
            eprintln!("  {message}");
        }
    }
}

fn print_status(store: &AppStore) {
    if let Some(status) = store.read(|s| s.pods_status.clone()) {
        eprintln!("{}", render::status_line(&status));
    }
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  /login, /signup            Authenticate");
    eprintln!("  /logout                    End the session");
    eprintln!("  /whoami                    Show the signed-in user");
    eprintln!("  /pods                      Reload and list pods");
    eprintln!("  /pod <id>                  Show a pod and its draft window");
    eprintln!("  /draft <id> [start] [end]  Edit a draft (YYYY-MM-DDTHH:MM, '-' keeps)");
    eprintln!("  /book <id>                 Book a pod with its draft window");
    eprintln!("  /bookings                  List your bookings");
    eprintln!("  /history                   Reload and show the concierge transcript");
    eprintln!("  /clear                     Clear the transcript locally");
    eprintln!("  /help                      Show this help");
    eprintln!("  /quit, quit, exit          End session");
    eprintln!("Anything else is sent to the concierge.");
}

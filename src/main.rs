use std::io::BufRead;

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use leadtrack::config::{self, AppConfig};
use leadtrack::core::follow_up::FollowUp;
use leadtrack::core::notification::{NotificationDispatcher, Severity, ToastSink};
use leadtrack::core::session::Session;
use leadtrack::core::settings::UserSettings;
use leadtrack::core::temporal::{FollowUpBoard, alerts_due};
use leadtrack::sync::roles::RoleStore;
use leadtrack::sync::snapshot::RefreshOutcome;
use leadtrack::sync::supabase::SupabaseClient;
use leadtrack::sync::{auth, keyring, records};

type CliResult = Result<(), Box<dyn std::error::Error>>;

const USAGE: &str = "usage: leadtrack [--debug] <command>

commands:
  login <email>             sign in (password read from stdin)
  logout                    forget the stored session
  agenda [--hours N]        overdue, today and upcoming follow-ups
  done <id>                 mark a follow-up as done
  cancel <id>               cancel a follow-up
  reschedule <id> <when>    move a follow-up (RFC 3339 timestamp)
  notifications [--mark-read]
  roles
  settings [--hours N]      show settings, or change the lead time";

/// Prints toasts to the terminal.
struct TerminalToasts;

impl ToastSink for TerminalToasts {
    fn show(&self, title: &str, message: &str, severity: Severity) {
        let tag = match severity {
            Severity::Success => "ok",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "URGENT",
        };
        if message.is_empty() {
            println!("[{}] {}", tag, title);
        } else {
            println!("[{}] {}: {}", tag, title, message);
        }
    }
}

fn init_logging(config: &AppConfig) {
    // Journal output (`journalctl --user -t leadtrack -f`).
    // leadtrack targets at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("leadtrack") {
                let max = if leadtrack::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    leadtrack::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier(leadtrack::config::APP_ID.to_string()),
        Err(e) => {
            eprintln!("journal unavailable, logging disabled: {}", e);
            return;
        }
    };

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn backend(config: &AppConfig) -> Result<SupabaseClient, Box<dyn std::error::Error>> {
    let (url, key) = config.require_backend()?;
    Ok(SupabaseClient::new(url, key)?)
}

/// Restore the session from the keyring, rotating the stored refresh token.
async fn restore_session(client: &SupabaseClient) -> Result<Session, Box<dyn std::error::Error>> {
    let token = keyring::load_refresh_token(client.base_url())
        .await?
        .ok_or("not signed in; run `leadtrack login <email>`")?;
    let session = auth::refresh_session(client, &token).await?;
    if let Err(e) = keyring::store_session(client.base_url(), &session.refresh_token).await {
        log::warn!("Could not update stored session: {}", e);
    }
    Ok(session)
}

fn print_section(title: &str, items: &[FollowUp]) {
    println!("{} ({})", title, items.len());
    for f in items {
        let when = f.scheduled_at.with_timezone(&Local).format("%a %d %b %H:%M");
        let label = f.subject.as_deref().unwrap_or(&f.description);
        println!("  {}  {:<8} {}  [{}]", when, f.kind.as_str(), label, f.id);
    }
}

async fn cmd_login(client: &SupabaseClient, email: &str) -> CliResult {
    eprint!("password: ");
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    let session = auth::sign_in(client, email, password).await?;
    keyring::store_session(client.base_url(), &session.refresh_token).await?;
    println!("Signed in as {}", session.email);
    Ok(())
}

async fn cmd_agenda(config: &AppConfig, client: &SupabaseClient, hours: Option<u32>) -> CliResult {
    let session = restore_session(client).await?;
    let client = client.with_session(&session);

    let (settings, follow_ups) = futures::join!(
        records::fetch_settings(&client, &session, config.default_lead_hours),
        records::fetch_follow_ups(&client, &session),
    );
    let settings = settings.unwrap_or_else(|e| {
        log::error!("Failed to load settings: {}", e);
        UserSettings::default_for(session.user_id).with_lead_time(config.default_lead_hours)
    });
    let follow_ups = follow_ups?;

    let lead_hours = hours.unwrap_or(settings.notifications.lead_time_hours);
    let mut board = FollowUpBoard::new(follow_ups, lead_hours);
    let now = Local::now().fixed_offset();
    let buckets = board.tick(now).clone();

    print_section("Overdue", &buckets.overdue);
    print_section("Today", &buckets.due_today);
    print_section(&format!("Next {}h", lead_hours), &buckets.upcoming);

    let summary = board.summary(now);
    let by_kind: Vec<String> = summary
        .pending_by_kind
        .iter()
        .map(|(kind, n)| format!("{} {}", n, kind.as_str()))
        .collect();
    println!("\npending: {}", by_kind.join(", "));

    let toasts = TerminalToasts;
    for f in alerts_due(&settings.notifications, &buckets) {
        let mins = (f.scheduled_at - Utc::now()).num_minutes();
        toasts.show(
            &format!("{} in {}h{:02}m", f.kind.as_str(), mins / 60, mins % 60),
            &f.description,
            Severity::Warning,
        );
    }
    Ok(())
}

enum Change {
    Done,
    Cancel,
    Reschedule(DateTime<Utc>),
}

async fn cmd_update(client: &SupabaseClient, id: &str, change: Change) -> CliResult {
    let id = Uuid::parse_str(id)?;
    let session = restore_session(client).await?;
    let client = client.with_session(&session);

    let mut follow_up = records::fetch_follow_ups(&client, &session)
        .await?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| format!("no follow-up {}", id))?;

    match change {
        Change::Done => follow_up.complete(),
        Change::Cancel => follow_up.cancel(),
        Change::Reschedule(at) => follow_up.reschedule(at),
    }

    let saved = records::save_follow_up(&client, &session, &follow_up).await?;
    println!("{} is now {}", saved.id, saved.status.as_str());
    Ok(())
}

async fn cmd_notifications(client: &SupabaseClient, mark_read: bool) -> CliResult {
    let session = restore_session(client).await?;
    let client = client.with_session(&session);

    let feed = records::fetch_notifications(&client, &session).await?;
    let mut dispatcher = NotificationDispatcher::new();
    let shown = dispatcher.observe(&feed, &TerminalToasts);
    if shown == 0 {
        println!("No unread notifications");
    }

    if mark_read {
        for n in feed.iter().filter(|n| dispatcher.has_seen(&n.id)) {
            if let Err(e) = records::mark_notification_read(&client, &session, n).await {
                log::error!("Failed to mark {} read: {}", n.id, e);
            }
        }
    }
    Ok(())
}

async fn cmd_roles(client: &SupabaseClient) -> CliResult {
    let session = restore_session(client).await?;
    let client = client.with_session(&session);

    let store = RoleStore::new();
    let outcome = store.refresh(&client, &session).await;
    if outcome == RefreshOutcome::Kept || !store.is_loaded() {
        println!("{}: could not load roles", session.email);
        return Ok(());
    }
    let roles: Vec<&str> = store.roles().sorted().iter().map(|r| r.as_str()).collect();
    println!("{}: {}", session.email, if roles.is_empty() { "(none)".to_string() } else { roles.join(", ") });
    if store.is_staff() {
        println!("staff access");
    }
    Ok(())
}

async fn cmd_settings(config: &AppConfig, client: &SupabaseClient, hours: Option<u32>) -> CliResult {
    let session = restore_session(client).await?;
    let client = client.with_session(&session);

    let mut settings = records::fetch_settings(&client, &session, config.default_lead_hours).await?;
    if let Some(h) = hours {
        settings.notifications.lead_time_hours = h;
        settings = records::save_settings(&client, &session, &settings).await?;
    }

    let n = &settings.notifications;
    println!("theme:       {:?}", settings.theme);
    println!("alerts:      {}", if n.follow_up_alerts { "on" } else { "off" });
    println!("lead time:   {}h", n.lead_time_hours);
    println!("channels:    email {}, push {}", n.email, n.push);
    Ok(())
}

async fn run(args: Vec<String>) -> CliResult {
    let mut config = AppConfig::load(&config::default_config_path())?;
    if args.iter().any(|a| a == "--debug") {
        config.debug_logging = true;
    }
    init_logging(&config);

    let rest: Vec<&str> = args
        .iter()
        .skip(1)
        .map(String::as_str)
        .filter(|a| *a != "--debug")
        .collect();

    match rest.as_slice() {
        ["login", email] => cmd_login(&backend(&config)?, email).await,
        ["logout"] => {
            let client = backend(&config)?;
            keyring::clear_session(client.base_url()).await?;
            println!("Signed out");
            Ok(())
        }
        ["agenda"] => cmd_agenda(&config, &backend(&config)?, None).await,
        ["agenda", "--hours", n] => cmd_agenda(&config, &backend(&config)?, Some(n.parse()?)).await,
        ["done", id] => cmd_update(&backend(&config)?, id, Change::Done).await,
        ["cancel", id] => cmd_update(&backend(&config)?, id, Change::Cancel).await,
        ["reschedule", id, when] => {
            let at = DateTime::parse_from_rfc3339(when)?.with_timezone(&Utc);
            cmd_update(&backend(&config)?, id, Change::Reschedule(at)).await
        }
        ["notifications"] => cmd_notifications(&backend(&config)?, false).await,
        ["notifications", "--mark-read"] => cmd_notifications(&backend(&config)?, true).await,
        ["roles"] => cmd_roles(&backend(&config)?).await,
        ["settings"] => cmd_settings(&config, &backend(&config)?, None).await,
        ["settings", "--hours", n] => cmd_settings(&config, &backend(&config)?, Some(n.parse()?)).await,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

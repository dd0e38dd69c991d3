//! Command-line front end for the stay booking marketplace

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stay_booking_client::draft::start_of_day;
use stay_booking_client::{
    ApiClient, AuthOutcome, AuthService, BookingInbox, BookingPhase, BookingStatus,
    ClientConfig, DashboardState, FileSessionStore, HttpApiClient, InboxState, ListingBrowser,
    ListingsState, LoginForm, OwnerDashboard, PricingStrategy, SessionContext,
};

/// Marketplace client configuration
#[derive(Debug, Parser)]
#[command(name = "marketplace", about = "Browse and book stays", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "MARKETPLACE_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "MARKETPLACE_TIMEOUT_MS", default_value = "5000")]
    timeout_ms: u64,

    /// How a stay is priced (per_guest_per_night, per_night)
    #[arg(long, env = "MARKETPLACE_PRICING", default_value = "per_guest_per_night")]
    pricing: PricingStrategy,

    /// Where the signed-in session is kept between runs
    #[arg(long, env = "MARKETPLACE_SESSION_FILE", default_value = ".marketplace-session.json")]
    session_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every package on offer
    Listings,
    /// Book a stay
    Book {
        listing_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        guests: String,
        /// YYYY-MM-DD
        #[arg(long)]
        check_in: NaiveDate,
        /// YYYY-MM-DD
        #[arg(long)]
        check_out: NaiveDate,
    },
    /// Show all bookings
    Bookings,
    /// Confirm or cancel a booking
    SetStatus {
        booking_id: i64,
        status: BookingStatus,
    },
    /// Show the signed-in owner's properties and bookings
    Profile,
    /// Delete one of the signed-in owner's properties
    DeleteProperty {
        property_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MARKETPLACE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
}

impl Cli {
    fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();
        Self::try_parse()
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout_ms: self.timeout_ms,
            pricing: self.pricing,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::load().unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.client_config();
    let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(config.clone())?);
    let session = SessionContext::restore(Arc::new(FileSessionStore::new(&cli.session_file)));
    info!(base_url = %config.base_url, pricing = %config.pricing, "Client ready");

    match cli.command {
        Command::Listings => list_listings(api).await,
        Command::Book {
            listing_id,
            name,
            phone,
            guests,
            check_in,
            check_out,
        } => {
            let mut browser = ListingBrowser::new(api);
            if let ListingsState::Failed(message) = browser.load().await {
                bail!("{}", message);
            }
            let mut booking = browser
                .select(listing_id, session, config.pricing)
                .ok_or_else(|| anyhow!("No listing with id {}", listing_id))?;

            booking.set_full_name(name);
            booking.set_phone(phone);
            booking.set_guests(guests);
            booking.select_dates(Some(start_of_day(check_in)), Some(start_of_day(check_out)))?;

            if let Some(quote) = booking.quote() {
                println!(
                    "{} x {} night(s) x {} guest(s) = {}",
                    quote.unit_price, quote.nights, quote.guests, quote.total
                );
            }

            let phase = booking.submit().await;
            for (field, message) in booking.errors().iter() {
                eprintln!("{}: {}", field, message);
            }
            for notification in booking.take_notifications() {
                println!("{}", notification);
            }
            if phase != BookingPhase::Succeeded {
                bail!("booking was not created");
            }
            if let Some(id) = booking.last_confirmation().and_then(|c| c.booking_id) {
                println!("Booking id: {}", id);
            }
            Ok(())
        }
        Command::Bookings => {
            let mut inbox = BookingInbox::new(api);
            if let InboxState::Failed(message) = inbox.load().await {
                bail!("{}", message);
            }
            for b in inbox.bookings() {
                println!(
                    "#{} {} ({}) {} guest(s) {} -> {} [{}]",
                    b.booking_id,
                    b.guest_name,
                    b.phone,
                    b.num_guests,
                    b.check_in.date_naive(),
                    b.check_out.date_naive(),
                    b.status
                );
            }
            Ok(())
        }
        Command::SetStatus { booking_id, status } => {
            let mut inbox = BookingInbox::new(api);
            let notification = inbox.update_status(booking_id, status).await;
            println!("{}", notification);
            if notification.is_error() {
                bail!("status was not changed");
            }
            Ok(())
        }
        Command::Profile => {
            let mut dashboard = OwnerDashboard::new(api, session);
            match dashboard.load().await {
                DashboardState::LoginRequired => bail!("Please login first"),
                DashboardState::Failed(message) => bail!("{}", message),
                _ => {}
            }
            if let Some(user) = dashboard.user() {
                println!("{} <{}>", user.name(), user.email);
            }
            println!("Properties:");
            for p in dashboard.my_properties() {
                println!("  {:>6}  {}  {}", p.id.unwrap_or_default(), p.title, p.display_price());
            }
            println!("Bookings:");
            for b in dashboard.my_bookings() {
                println!(
                    "  #{} {} -> {} [{}]",
                    b.booking_id,
                    b.check_in.date_naive(),
                    b.check_out.date_naive(),
                    b.status
                );
            }
            Ok(())
        }
        Command::DeleteProperty { property_id, yes } => {
            let mut dashboard = OwnerDashboard::new(api, session);
            dashboard.request_delete(property_id);
            if !yes && !confirm(&format!("Delete property {}?", property_id))? {
                dashboard.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }
            match dashboard.confirm_delete().await {
                Some(notification) if notification.is_error() => bail!("{}", notification.message),
                Some(notification) => println!("{}", notification),
                None => {}
            }
            Ok(())
        }
        Command::Login { email, password } => {
            let auth = AuthService::new(api, session);
            match auth.login(&LoginForm { email, password }).await {
                AuthOutcome::Invalid(errors) => {
                    for (field, message) in errors.iter() {
                        eprintln!("{}: {}", field, message);
                    }
                    bail!("login form is incomplete")
                }
                AuthOutcome::Done(notification) => {
                    println!("{}", notification);
                    if notification.is_error() {
                        bail!("login failed");
                    }
                    Ok(())
                }
            }
        }
        Command::Logout => {
            AuthService::new(api, session).logout();
            println!("Logged out");
            Ok(())
        }
    }
}

async fn list_listings(api: Arc<dyn ApiClient>) -> Result<()> {
    let mut browser = ListingBrowser::new(api);
    if let ListingsState::Failed(message) = browser.load().await {
        bail!("{}", message);
    }
    for card in browser.cards() {
        println!(
            "{:>6}  {:<32}  {:>12}  {}",
            card.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            card.title,
            card.price_label,
            card.route
        );
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

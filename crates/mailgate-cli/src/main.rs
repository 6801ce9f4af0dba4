//! Mailgate CLI - sender identity verification for Amazon SES
//!
//! Checks, creates and verifies email and domain identities, keeps the local
//! verified flags up to date and manages identity attributes.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    DkimCommand, FeedbackCommand, IdentityAction, IdentityCommand, MailFromCommand,
    NotificationsCommand, StatusCommand, ValidateCommand,
};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MAILGATE_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "MAILGATE_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a value is a valid email address or domain
    Validate(ValidateCommand),
    /// Query the verification status of an identity
    Check(IdentityCommand),
    /// Register an identity with SES and start its verification
    Create(IdentityCommand),
    /// Check an identity, re-send or create it as needed
    Verify(IdentityCommand),
    /// Show whether a sender address is allowed by the stored verified flags
    Status(StatusCommand),
    /// Enable or disable DKIM signing for an identity
    Dkim(DkimCommand),
    /// Configure the custom MAIL FROM domain of an identity
    MailFrom(MailFromCommand),
    /// Enable or disable bounce and complaint forwarding by email
    Feedback(FeedbackCommand),
    /// Route bounce, complaint or delivery notifications to an SNS topic
    Notifications(NotificationsCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()?
    } else {
        // Mailgate crates at the requested level, SDK and HTTP stack at warn
        tracing_subscriber::EnvFilter::new(format!(
            "mailgate={level},\
             mailgate_identity={level},\
             aws_config=warn,\
             aws_smithy_runtime=warn,\
             aws_sdk_sesv2=warn,\
             aws_sdk_ses=warn,\
             hyper=warn,\
             rustls=warn",
            level = log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Validate(cmd) => cmd.execute(),
        Commands::Check(cmd) => cmd.execute(IdentityAction::Check),
        Commands::Create(cmd) => cmd.execute(IdentityAction::Create),
        Commands::Verify(cmd) => cmd.execute(IdentityAction::Verify),
        Commands::Status(cmd) => cmd.execute(),
        Commands::Dkim(cmd) => cmd.execute(),
        Commands::MailFrom(cmd) => cmd.execute(),
        Commands::Feedback(cmd) => cmd.execute(),
        Commands::Notifications(cmd) => cmd.execute(),
    }
}

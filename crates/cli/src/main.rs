use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tumae_app::{
    onboarding::{self, OnboardingSelection, Role},
    ApiClient, SessionContext, SessionStore,
};
use tumae_kernel::settings::{Settings, UpstreamSettings};
use tumae_upstream::HttpBackend;

#[derive(Parser)]
#[command(name = "tumae", version, about = "Tumae gateway server and client")]
struct Cli {
    /// Gateway base URL used by the client commands
    #[arg(
        long,
        global = true,
        env = "TUMAE_GATEWAY_URL",
        default_value = "http://127.0.0.1:8080"
    )]
    gateway: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the gateway HTTP server
    Serve,
    /// Print the effective settings as JSON
    Settings,
    /// Aggregate an onboarding form and print the payload it would submit
    Preview {
        #[arg(long)]
        role: Role,
        /// Form JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        form: PathBuf,
    },
    /// Log in through the gateway and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TUMAE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// List received messages, or sent ones with `--sent`
    Inbox {
        #[arg(long)]
        sent: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load Tumae settings")?;
    tumae_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => tumae_app::serve(&settings).await,
        Command::Settings => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Preview { role, form } => preview(role, &form),
        Command::Login { email, password } => {
            let client = client(&cli.gateway, &settings)?;
            let session = client.login(&email, &password).await?;
            println!(
                "logged in as user {} ({})",
                session.user_id,
                session.role.as_str()
            );
            Ok(())
        }
        Command::Logout => {
            client(&cli.gateway, &settings)?.logout().await?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let store = SessionStore::new(&settings.session.path);
            match store.load()? {
                Some(session) => println!(
                    "user {} ({}) {} {}",
                    session.user_id,
                    session.role.as_str(),
                    session.name.as_deref().unwrap_or("-"),
                    session.email.as_deref().unwrap_or("-"),
                ),
                None => println!("not logged in"),
            }
            Ok(())
        }
        Command::Inbox { sent } => {
            let client = client(&cli.gateway, &settings)?;
            let messages = if sent {
                client.sent().await?
            } else {
                client.inbox().await?
            };
            println!("{}", serde_json::to_string_pretty(&messages)?);
            Ok(())
        }
    }
}

fn preview(role: Role, form: &Path) -> anyhow::Result<()> {
    let raw = if form.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read form from stdin")?;
        raw
    } else {
        std::fs::read_to_string(form)
            .with_context(|| format!("failed to read form {}", form.display()))?
    };

    let selection: OnboardingSelection =
        serde_json::from_str(&raw).context("form is not valid JSON")?;
    match onboarding::aggregate(role, &selection) {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(errors) => bail!("form rejected: {errors}"),
    }
}

/// Client commands talk to the gateway, not the backend.
fn client(gateway: &str, settings: &Settings) -> anyhow::Result<ApiClient> {
    let transport = HttpBackend::new(&UpstreamSettings {
        base_url: gateway.to_string(),
        ..settings.upstream.clone()
    })?;
    let session = SessionContext::with_store(SessionStore::new(&settings.session.path))?;

    Ok(ApiClient::new(
        Arc::new(transport),
        Arc::new(session),
        Duration::from_millis(settings.upstream.logout_timeout_ms),
    ))
}

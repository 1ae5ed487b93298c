// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learn_dashboard::auth::sign_in;
use learn_dashboard::{
    error_page, fetch_all, html_document, AuthProvider, Dashboard, DashboardConfig, DashboardView,
    GraphQlClient, RawDashboard, TokenAuth, Viewport,
};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const USER_ENV: &str = "LEARN_DASHBOARD_USER";
const PASSWORD_ENV: &str = "LEARN_DASHBOARD_PASSWORD";

#[derive(Parser)]
#[command(name = "learn-dashboard", version, about = "Student profile dashboard for the learning platform")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the profile page to a standalone HTML file
    Render {
        /// Saved query results instead of a live fetch
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long, default_value = "profile.html")]
        out: PathBuf,
        /// Chart container width in pixels
        #[arg(long)]
        width: Option<f64>,
    },
    /// Fetch the four queries and save them as JSON
    Fetch {
        #[arg(long)]
        out_dir: PathBuf,
        /// Sign in as this user when no token is configured
        #[arg(long)]
        user: Option<String>,
    },
    /// Browse the dashboard in the terminal
    Tui {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Render { data_dir, out, width } => run_render(&config, data_dir.as_deref(), &out, width).await,
        Command::Fetch { out_dir, user } => run_fetch(&config, &out_dir, user).await,
        Command::Tui { data_dir } => {
            let raw = load_raw(&config, data_dir.as_deref(), None).await?;
            run_ui_mode(DashboardView::build_with(&raw, &config.classification)?)
        }
    }
}

/// Saved files when a directory is given, otherwise a live fetch
async fn load_raw(config: &DashboardConfig, data_dir: Option<&Path>, user: Option<String>) -> Result<RawDashboard> {
    if let Some(dir) = data_dir {
        info!("loading saved query results from {}", dir.display());
        return RawDashboard::from_dir(dir).with_context(|| format!("cannot load data from {}", dir.display()));
    }

    let auth = Arc::new(TokenAuth::new(config.api.token.clone()));
    if !auth.is_authenticated() {
        let user = user.or_else(|| std::env::var(USER_ENV).ok());
        let password = std::env::var(PASSWORD_ENV).ok();
        if let (Some(user), Some(password)) = (user, password) {
            let token = sign_in(&reqwest::Client::new(), &config.api.signin_endpoint(), &user, &password).await?;
            auth.set_token(token);
        }
    }

    let client = GraphQlClient::new(config.api.graphql_endpoint(), auth);
    Ok(fetch_all(&client).await?)
}

async fn run_render(config: &DashboardConfig, data_dir: Option<&Path>, out: &Path, width: Option<f64>) -> Result<()> {
    println!("📊 Rendering profile page");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let width = width.unwrap_or(config.charts.render_width);
    let viewport = Viewport::new(width, width).with_settings(config.charts.viewport_settings());

    let loaded = match load_raw(config, data_dir, None).await {
        Ok(raw) => DashboardView::build_with(&raw, &config.classification).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };

    let (title, page, ok) = match loaded {
        Ok(view) => {
            let login = view.user.as_ref().map(|u| u.login.clone()).unwrap_or_default();
            println!("✓ Classified {} skills, {} projects", view.skills.latest.len(), project_count(&view));
            let page = Dashboard::new(view).render_page(&viewport);
            (format!("{} - Profile", login), page, true)
        }
        Err(e) => {
            error!("dashboard load failed: {:#}", e);
            ("Profile".to_string(), error_page(&format!("{:#}", e)), false)
        }
    };

    fs::write(out, html_document(&title, &page)).with_context(|| format!("cannot write {}", out.display()))?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if ok {
        println!("✅ Wrote {}", out.display());
    } else {
        println!("❌ Wrote error page to {}", out.display());
        std::process::exit(1);
    }
    Ok(())
}

async fn run_fetch(config: &DashboardConfig, out_dir: &Path, user: Option<String>) -> Result<()> {
    println!("🌐 Fetching dashboard data from {}", config.api.domain);
    let raw = load_raw(config, None, user).await?;
    raw.write_dir(out_dir)?;
    println!("✓ Saved query results to {}", out_dir.display());
    Ok(())
}

fn project_count(view: &DashboardView) -> usize {
    view.progress.iter().map(|(_, entries)| entries.len()).sum()
}

#[cfg(feature = "tui")]
fn run_ui_mode(view: DashboardView) -> Result<()> {
    println!("🖥️  Starting dashboard UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(view);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_view: DashboardView) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or render HTML: learn-dashboard render --out profile.html");
    std::process::exit(1);
}

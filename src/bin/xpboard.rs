use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use xpboard::api::{Client, DEFAULT_DOMAIN, DEFAULT_EVENT_ID};
use xpboard::auth::{AuthClient, SessionStore, Token, TokenStore, is_expired};
use xpboard::format::format_amount;
use xpboard::geometry::CurveStyle;
use xpboard::models::{TxKind, parse_timestamp};
use xpboard::scale::PaddingMode;
use xpboard::series::build_cumulative_series;
use xpboard::{ChartConfig, Dashboard, DashboardError, DashboardLayout, UserProfileData};
use xpboard::{storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "xpboard",
    version,
    about = "Fetch learning-platform activity and render XP, audit, result & skill charts"
)]
struct Cli {
    /// Platform domain hosting the sign-in and GraphQL endpoints.
    #[arg(long, global = true, default_value = DEFAULT_DOMAIN)]
    domain: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print a token (export it as XPBOARD_TOKEN).
    Login(LoginArgs),
    /// Build the dashboard and write one SVG per chart.
    Render(RenderArgs),
    /// Print the profile header figures.
    Summary(SourceArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Username or email.
    #[arg(short, long)]
    user: String,
    #[arg(short, long, env = "XPBOARD_PASSWORD", hide_env_values = true)]
    password: String,
}

/// Where the profile data comes from: a saved response or the live API.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Read a saved GraphQL response instead of fetching. Takes precedence over credentials.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Bearer token from `xpboard login`.
    #[arg(long, env = "XPBOARD_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Sign in on the fly with this username or email.
    #[arg(short, long)]
    user: Option<String>,
    #[arg(short, long, env = "XPBOARD_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Event whose XP and skill transactions are shown.
    #[arg(long, default_value_t = DEFAULT_EVENT_ID)]
    event_id: i64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Curve {
    Linear,
    Midpoint,
    Thirds,
}

impl From<Curve> for CurveStyle {
    fn from(c: Curve) -> Self {
        match c {
            Curve::Linear => CurveStyle::Linear,
            Curve::Midpoint => CurveStyle::CubicMidpoint,
            Curve::Thirds => CurveStyle::CubicThirds,
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Directory receiving the SVG files.
    #[arg(long, default_value = "charts")]
    out_dir: PathBuf,
    /// Container width all chart surfaces derive from.
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    /// Ignore XP earned before this date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date_arg)]
    start_date: Option<DateTime<Utc>>,
    /// First month tick of the progress chart.
    #[arg(long, value_parser = parse_date_arg)]
    campaign_start: Option<DateTime<Utc>>,
    #[arg(long, value_enum, default_value_t = Curve::Midpoint)]
    curve: Curve,
    /// Fixed plot padding in px.
    #[arg(long, default_value_t = 40.0, conflicts_with = "responsive_padding")]
    padding: f64,
    /// Padding as 5% of the width, clamped to 24..64 px.
    #[arg(long, default_value_t = false)]
    responsive_padding: bool,
    /// Minimum spacing between progress markers in px.
    #[arg(long, default_value_t = 12.0)]
    marker_spacing: f64,
    #[arg(long, default_value_t = 5)]
    grid_lines: usize,
    /// Number of skills shown as gauges.
    #[arg(long, default_value_t = 8)]
    skills: usize,
    /// Also save the whole dashboard payload as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Also save the cumulative XP series as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn parse_date_arg(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(s).ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Login(args) => cmd_login(&cli.domain, args),
        Command::Render(args) => cmd_render(&cli.domain, args),
        Command::Summary(args) => cmd_summary(&cli.domain, args),
    }
}

fn cmd_login(domain: &str, args: LoginArgs) -> Result<()> {
    let token = AuthClient::for_domain(domain)?.login(&args.user, &args.password)?;
    println!("{}", token.as_str());
    Ok(())
}

fn load_profile(domain: &str, args: &SourceArgs) -> Result<UserProfileData> {
    if let Some(path) = &args.input {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let data = UserProfileData::from_json(&raw)
            .with_context(|| format!("parse {}", path.display()))?;
        info!("loaded {} transactions from {}", data.transaction.len(), path.display());
        return Ok(data);
    }

    let mut session = SessionStore::new();
    if let Some(raw) = &args.token {
        session.set_token(Token::new(raw.as_str()));
    } else if let Some(user) = &args.user {
        let password = args
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("--user needs --password or XPBOARD_PASSWORD"))?;
        session.set_token(AuthClient::for_domain(domain)?.login(user, password)?);
    }
    let token = session.get_token().ok_or(DashboardError::MissingToken)?;
    if is_expired(&token, Utc::now()) {
        session.clear();
        return Err(DashboardError::ExpiredToken.into());
    }
    Client::with_domain(domain)?.fetch_profile(&token, args.event_id)
}

fn cmd_render(domain: &str, args: RenderArgs) -> Result<()> {
    let data = load_profile(domain, &args.source)?;

    let padding_mode = if args.responsive_padding {
        PaddingMode::Responsive {
            fraction: 0.05,
            min: 24.0,
            max: 64.0,
        }
    } else {
        PaddingMode::Fixed(args.padding)
    };
    let config = ChartConfig {
        start_date_filter: args.start_date,
        padding_mode,
        curve_style: args.curve.into(),
        min_marker_spacing: args.marker_spacing,
        grid_line_count: args.grid_lines,
        campaign_start: args.campaign_start,
        skill_limit: args.skills,
    };
    let layout = DashboardLayout::for_container(args.width);
    let dashboard = Dashboard::build(&data, &layout, &config)?;

    let written = viz::render_dashboard(&dashboard, &args.out_dir)?;
    eprintln!("Wrote {} charts to {}", written.len(), args.out_dir.display());

    if let Some(path) = &args.json {
        storage::save_json(&dashboard, path)?;
        eprintln!("Saved dashboard payload to {}", path.display());
    }
    if let Some(path) = &args.csv {
        let xp: Vec<_> = data
            .records()
            .into_iter()
            .filter(|r| r.kind == TxKind::Xp)
            .collect();
        let series = build_cumulative_series(&xp, config.start_date_filter);
        storage::save_series_csv(&series, path)?;
        eprintln!("Saved {} series points to {}", series.len(), path.display());
    }
    Ok(())
}

fn cmd_summary(domain: &str, args: SourceArgs) -> Result<()> {
    let data = load_profile(domain, &args)?;
    let s = xpboard::stats::profile_summary(&data)
        .ok_or_else(|| DashboardError::DataUnavailable("response contains no user".into()))?;
    println!("{} ({}, id {})", s.display_name, s.login, s.id);
    println!("  level        {}", s.level_label);
    println!("  total xp     {} ({})", s.total_xp_label, format_amount(s.total_xp));
    println!(
        "  audits       given {}  received {}  ratio {}",
        format_amount(s.audit.given),
        format_amount(s.audit.received),
        s.audit_ratio_label
    );
    println!(
        "  results      {} pass / {} fail",
        s.results.pass, s.results.fail
    );
    Ok(())
}

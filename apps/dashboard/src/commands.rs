// apps/dashboard/src/commands.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use analysis::RenderStyle;
use anyhow::{anyhow, bail, Context, Result};
use model::{Credentials, Registration, SessionStats, Surface, TrajectoryPoint};
use mokart_api_http::{HttpApi, HttpConfig};
use tracing::info;

use crate::auth::{AuthFlow, AuthOutcome};
use crate::cli::{ConfigAction, SizeArgs};
use crate::config::Config;
use crate::nav::{self, Page};
use crate::panel;
use crate::session::Dashboard;
use crate::store::SessionStore;

pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub store: Arc<dyn SessionStore>,
}

impl AppContext {
    fn api(&self) -> Result<Arc<HttpApi>> {
        let cfg = HttpConfig {
            base_url: self.config.api.base_url.clone(),
            timeout: self.config.api.timeout(),
        };
        Ok(Arc::new(HttpApi::new(cfg)?))
    }

    fn auth(&self) -> Result<AuthFlow<HttpApi>> {
        Ok(AuthFlow::new(self.api()?, self.store.clone()))
    }

    fn require(&self, page: Page) -> Result<()> {
        match nav::resolve(page, self.store.is_authenticated()) {
            shown if shown == page => Ok(()),
            Page::Auth => bail!("sign in first: `mokart login` or `mokart demo`"),
            _ => bail!("already signed in, run `mokart logout` first"),
        }
    }

    fn surface(&self, size: SizeArgs) -> Result<Surface> {
        let mut cfg = self.config.clone();
        if let Some(w) = size.width { cfg.surface.width = w; }
        if let Some(h) = size.height { cfg.surface.height = h; }
        cfg.validate()?;
        Ok(cfg.surface)
    }
}

pub async fn list_sessions(ctx: &AppContext) -> Result<()> {
    ctx.require(Page::Analysis)?;
    let mut dash = Dashboard::new(ctx.api()?);
    dash.refresh_sessions();
    dash.settle().await;
    let sessions = dash.state().sessions();
    if sessions.is_empty() {
        println!("no sessions");
    }
    for s in sessions {
        println!("{}  {}", s.id, panel::session_label(s));
    }
    Ok(())
}

pub async fn render_session(ctx: &AppContext, session_id: &str, out: &Path, size: SizeArgs) -> Result<()> {
    ctx.require(Page::Analysis)?;
    let surface = ctx.surface(size)?;
    let mut dash = Dashboard::new(ctx.api()?);
    dash.select(session_id);
    dash.settle().await;

    let state = dash.state();
    if state.trajectory().is_empty() {
        println!("session {} has no trajectory points, nothing rendered", session_id);
    } else {
        write_image(out, state.trajectory(), state.stats(), &surface, &ctx.config.style)?;
        println!("wrote {}", out.display());
    }
    if let Some(stats) = state.stats() {
        print!("{}", panel::format_stats(stats));
    }
    Ok(())
}

pub async fn export_session(ctx: &AppContext, session_id: &str, out: &Path) -> Result<()> {
    ctx.require(Page::Analysis)?;
    let mut dash = Dashboard::new(ctx.api()?);
    dash.select(session_id);
    dash.settle().await;

    let points = dash.state().trajectory();
    if points.is_empty() {
        println!("session {} has no trajectory points, nothing exported", session_id);
        return Ok(());
    }
    iox::export_trajectory(points, out)?;
    info!(out = %out.display(), points = points.len(), "trajectory exported");
    println!("wrote {}", out.display());
    Ok(())
}

pub fn render_file(
    ctx: &AppContext,
    input: &Path,
    stats: Option<&Path>,
    out: &Path,
    size: SizeArgs,
) -> Result<()> {
    let surface = ctx.surface(size)?;
    let points = iox::import_trajectory(input)?;
    let stats = stats.map(iox::import_stats).transpose()?;
    if points.is_empty() {
        println!("{} has no trajectory points, nothing rendered", input.display());
        return Ok(());
    }
    write_image(out, &points, stats.as_ref(), &surface, &ctx.config.style)?;
    println!("wrote {}", out.display());
    if let Some(stats) = &stats {
        print!("{}", panel::format_stats(stats));
    }
    Ok(())
}

/// Render to `out`, format chosen by extension.
pub fn write_image(
    out: &Path,
    points: &[TrajectoryPoint],
    stats: Option<&SessionStats>,
    surface: &Surface,
    style: &RenderStyle,
) -> Result<()> {
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let rendered = match ext.as_str() {
        "svg" => analysis::render_svg_file(out, points, stats, surface, style),
        "png" => analysis::render_png_file(out, points, stats, surface, style),
        other => bail!("unsupported image format {:?}, use .svg or .png", other),
    };
    rendered.with_context(|| format!("render {}", out.display()))?;
    info!(out = %out.display(), points = points.len(), "trajectory rendered");
    Ok(())
}

fn report(outcome: AuthOutcome) {
    println!("{}", outcome.message);
    if outcome.signed_in {
        match nav::greeting_name(&outcome.user) {
            Some(name) => println!("Hello {}!", name),
            None => println!("signed in"),
        }
    }
}

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    ctx.require(Page::Auth)?;
    let outcome = ctx.auth()?.login(&Credentials { email, password }).await?;
    report(outcome);
    Ok(())
}

pub async fn register(ctx: &AppContext, email: String, password: String, vehicle_model: Option<String>) -> Result<()> {
    ctx.require(Page::Auth)?;
    let outcome = ctx.auth()?.register(&Registration { email, password, vehicle_model }).await?;
    report(outcome);
    Ok(())
}

pub async fn demo(ctx: &AppContext) -> Result<()> {
    ctx.require(Page::Auth)?;
    let outcome = ctx.auth()?.demo_login().await?;
    report(outcome);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth()?.logout()?;
    println!("signed out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.store.load()? {
        Some(s) => {
            let name = nav::greeting_name(&s.user).unwrap_or_else(|| s.user.id.clone());
            println!("{} <{}>", name, s.user.email);
            if let Some(model) = s.user.user_metadata.and_then(|m| m.vehicle_model) {
                println!("vehicle: {}", model);
            }
        }
        None => println!("not signed in"),
    }
    Ok(())
}

pub fn config(ctx: &AppContext, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", ctx.config_path.display());
            print!("{}", ctx.config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            if ctx.config_path.exists() && !force {
                return Err(anyhow!("{} already exists (use --force)", ctx.config_path.display()));
            }
            Config::default().save(&ctx.config_path)?;
            println!("wrote {}", ctx.config_path.display());
        }
    }
    Ok(())
}

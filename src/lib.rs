//! Next-best-step coaching tools served over MCP for ChatGPT apps.
//!
//! Two server variants share this crate:
//! - [`Variant::NextStep`] - `next_best_step {user_input}` answered by keyword
//!   classification
//! - [`Variant::Widget`] - a timeboxed directive composer, `kitchen-sink-refresh`,
//!   and a widget HTML resource loaded at startup

pub mod coach;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod profile;
pub mod widget;

use anyhow::Context;
use tracing::info;

pub use config::Config;
pub use profile::{ServerProfile, Variant};
pub use widget::{WidgetAsset, WidgetError};

/// Build the immutable server definition. Fails before any socket is bound
/// when the widget server cannot find its assets.
pub fn build_profile(config: &Config) -> anyhow::Result<ServerProfile> {
    let profile = match config.variant {
        Variant::NextStep => ServerProfile::next_step()?,
        Variant::Widget => {
            let asset = WidgetAsset::load(&config.assets_dir)
                .context("Widget server cannot start without its HTML asset")?;
            ServerProfile::widget(asset)?
        }
    };
    Ok(profile)
}

/// Build the profile, then serve until Ctrl+C
pub async fn run(config: Config) -> anyhow::Result<()> {
    let profile = build_profile(&config)?;
    info!(
        "Starting {} v{} with tools: {}",
        profile.name(),
        profile.version(),
        profile.tools().names().join(", ")
    );
    mcp::start_server(profile, config.port).await
}

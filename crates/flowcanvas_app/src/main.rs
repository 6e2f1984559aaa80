// SPDX-License-Identifier: MIT OR Apache-2.0
//! `FlowCanvas` host
//!
//! Wires the canvas engine, the event bus and the zoom control together,
//! replays a session script and prints the resulting scene as RON.
//!
//! ```text
//! flowcanvas [--settings PATH] [--save-settings] [SCRIPT]
//! ```
//!
//! Without a script the bundled demo session runs. Settings default to
//! `flowcanvas.ron` in the working directory when present; `--save-settings`
//! writes the settings in effect back to that path.

mod script;
mod settings;
mod zoom_control;

use clap::Parser;
use flowcanvas_events::EventBus;
use flowcanvas_graph::{events, get_node_by_id, CanvasEngine, Connection, Node};
use script::{Script, ScriptRunner, SessionSummary};
use settings::{CanvasSettings, SettingsError, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use zoom_control::ZoomControl;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "flowcanvas=info";

const DEMO_SCRIPT: &str = include_str!("../scripts/demo.ron");

/// Replay a canvas session script and print the resulting scene as RON
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Options {
    /// Canvas settings file (defaults to `flowcanvas.ron`)
    #[clap(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Write the settings in effect back to the settings file
    #[clap(long)]
    save_settings: bool,
    /// Session script; the bundled demo runs when omitted
    #[clap(value_parser)]
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let options = Options::parse();

    // Logs go to stderr, stdout carries the session summary
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!("Starting FlowCanvas v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(options).await {
        tracing::error!("FlowCanvas failed: {e}");
        std::process::exit(1);
    }
}

async fn run(options: Options) -> Result<(), SettingsError> {
    let settings_path = options
        .settings
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let settings = CanvasSettings::load_or_default(&settings_path);
    if options.save_settings {
        settings.save(&settings_path)?;
        tracing::info!(path = %settings_path.display(), "Saved canvas settings");
    }

    let bus = EventBus::new();
    events::install_replay_buffers(&bus);
    let engine = CanvasEngine::new(bus.clone(), settings.canvas.clone())?;
    let zoom = ZoomControl::mount(&bus, settings.canvas.zoom);

    let _journal = [
        bus.subscribe(&events::NODE_ADDED, |node: &Node| {
            tracing::info!(id = %node.id, label = %node.label, "Node added");
            Ok(())
        }),
        bus.subscribe(&events::NODE_UPDATED, |node: &Node| {
            tracing::info!(id = %node.id, x = node.position.x, y = node.position.y, "Node moved");
            Ok(())
        }),
        bus.subscribe(&events::CONNECTION_CREATED, |c: &Connection| {
            tracing::info!(source = %c.source_node_id, target = %c.target_node_id, "Connected");
            Ok(())
        }),
        bus.subscribe(&events::CONNECTION_DELETED, |c: &Connection| {
            tracing::info!(source = %c.source_node_id, target = %c.target_node_id, "Disconnected");
            Ok(())
        }),
    ]
    .map(flowcanvas_events::Subscription::into_scoped);

    let script = match &options.script {
        Some(path) => Script::load(path)?,
        None => Script::parse(DEMO_SCRIPT)?,
    };
    let applied = ScriptRunner::new(&engine, &zoom).run(&script);
    tracing::info!(
        applied,
        total = script.steps.len(),
        zoom = zoom.percentage(),
        can_zoom_in = zoom.can_zoom_in(),
        can_zoom_out = zoom.can_zoom_out(),
        "Script finished"
    );

    let first = engine.nodes().first().map(|n| n.id.clone());
    if let Some(id) = first {
        match get_node_by_id(&bus, id.clone()).await {
            Ok(Some(node)) => tracing::info!(id = %node.id, label = %node.label, "Lookup answered"),
            Ok(None) => tracing::warn!(%id, "Lookup found nothing"),
            Err(err) => tracing::warn!(%err, "Lookup failed"),
        }
    }

    println!("{}", SessionSummary::capture(&engine).to_ron()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_options_parse() {
        let options = Options::try_parse_from([
            "flowcanvas",
            "--settings",
            "canvas.ron",
            "--save-settings",
            "session.ron",
        ])
        .unwrap();
        assert_eq!(options.settings, Some(PathBuf::from("canvas.ron")));
        assert!(options.save_settings);
        assert_eq!(options.script, Some(PathBuf::from("session.ron")));

        let options = Options::try_parse_from(["flowcanvas"]).unwrap();
        assert!(options.settings.is_none() && options.script.is_none());
        assert!(!options.save_settings);
    }

    #[test]
    fn test_options_reject_bad_input() {
        let missing_value = Options::try_parse_from(["flowcanvas", "--settings"]);
        assert!(missing_value.is_err());

        let typo = Options::try_parse_from(["flowcanvas", "--sttings", "x.ron"]);
        assert_eq!(typo.unwrap_err().kind(), ErrorKind::UnknownArgument);

        let help = Options::try_parse_from(["flowcanvas", "--help"]);
        assert_eq!(help.unwrap_err().kind(), ErrorKind::DisplayHelp);

        let extra = Options::try_parse_from(["flowcanvas", "a.ron", "b.ron"]);
        assert!(extra.is_err());
    }

    #[test]
    fn test_options_definition() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_bundled_demo_parses() {
        assert!(!Script::parse(DEMO_SCRIPT).unwrap().steps.is_empty());
    }
}

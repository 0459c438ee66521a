//! xform-eval CLI - print world positions of demonstration scenes.

mod scenes;

use std::env;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use xform_eval::config::Settings;
use xform_eval::prelude::*;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Command line options left after pulling out global flags.
struct Options {
    settings: Settings,
    /// Settings file problem, reported once logging is set up.
    settings_error: Option<xform_eval::Error>,
    time_given: bool,
    args: Vec<String>,
}

fn parse_args() -> anyhow::Result<Options> {
    let (mut settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let mut time_given = false;
    let mut args = Vec::new();

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => settings.log_filter = "debug".to_string(),
            "-vv" | "--trace" => settings.log_filter = "trace".to_string(),
            "-q" | "--quiet" => settings.log_filter = "off".to_string(),
            "-j" | "--json" => settings.json = true,
            "-t" | "--time" => {
                let value = iter.next().context("--time needs a value")?;
                settings.time = if value.eq_ignore_ascii_case("default") {
                    None
                } else {
                    Some(value.parse().with_context(|| format!("invalid time: {value}"))?)
                };
                time_given = true;
            }
            "-p" | "--precision" => {
                let value = iter.next().context("--precision needs a value")?;
                settings.precision =
                    value.parse().with_context(|| format!("invalid precision: {value}"))?;
            }
            _ => args.push(arg),
        }
    }

    Ok(Options { settings, settings_error, time_given, args })
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> anyhow::Result<()> {
    let options = parse_args()?;
    init_logging(&options.settings.log_filter);
    if let Some(e) = &options.settings_error {
        let path = Settings::path().unwrap_or_default();
        tracing::warn!(path = %path.display(), "ignoring settings file: {}", e);
    }

    let command = options.args.first().map(String::as_str);
    match command {
        None | Some("help" | "h" | "-h" | "--help") => print_help(),
        Some("version" | "-V" | "--version") => {
            println!(
                "xform-eval {} (built {})",
                env!("CARGO_PKG_VERSION"),
                env!("XFORM_EVAL_BUILD_DATE")
            );
        }
        Some("demo" | "d") => {
            let which = options.args.get(1).map(String::as_str).unwrap_or("all");
            let names: Vec<&str> = if which == "all" {
                scenes::NAMES.to_vec()
            } else {
                vec![which]
            };
            cmd_demo(&names, &options)?;
        }
        Some("settings" | "s") => cmd_settings(options.args.get(1).map(String::as_str), &options)?,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    }
    Ok(())
}

fn print_help() {
    println!("xform-eval - world transform evaluation demos");
    println!();
    println!("USAGE:");
    println!("    xform-eval [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    d, demo [name]      Run a demo scene (default: all)");
    println!("                        names: {}", scenes::NAMES.join(", "));
    println!("    s, settings [save]  Show effective settings, or save them as defaults");
    println!("    version             Show version and build date");
    println!("    h, help             Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -t, --time <t>      Evaluation time (number or 'default')");
    println!("    -p, --precision <n> Decimal places in text output");
    println!("    -j, --json          Print JSON instead of text");
    println!("    -v, --verbose       Show debug output");
    println!("    -vv, --trace        Show trace output (very verbose)");
    println!("    -q, --quiet         Suppress log output");
    println!();
    println!("SETTINGS:");
    println!("    Defaults are read from settings.json in the user config directory,");
    println!("    or from the file named by ${}.", xform_eval::config::SETTINGS_ENV);
}

fn cmd_settings(action: Option<&str>, options: &Options) -> anyhow::Result<()> {
    match action {
        None => {
            if let Some(path) = Settings::path() {
                println!("# {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&options.settings)?);
        }
        Some("save") => {
            let path = options.settings.save().context("failed to save settings")?;
            println!("Saved settings to {}", path.display());
        }
        Some(other) => bail!("unknown settings action '{}', expected 'save'", other),
    }
    Ok(())
}

fn cmd_demo(names: &[&str], options: &Options) -> anyhow::Result<()> {
    let mut reports = Vec::new();

    for &name in names {
        let Some(demo) = scenes::build(name)? else {
            bail!("unknown demo '{}', expected one of: {}", name, scenes::NAMES.join(", "));
        };
        tracing::debug!(demo = demo.name, nodes = demo.nodes.len(), "running demo");

        let times = if options.time_given {
            vec![options.settings.time_code()]
        } else {
            demo.times.clone()
        };

        if options.settings.json {
            reports.push(demo_json(&demo, &times)?);
        } else {
            print_demo(&demo, &times, options.settings.precision)?;
        }
    }

    if options.settings.json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "demos": reports }))?);
    }
    Ok(())
}

fn print_demo(demo: &scenes::Demo, times: &[TimeCode], precision: usize) -> anyhow::Result<()> {
    println!("{}", "=".repeat(60));
    println!("{} ({})", demo.title, demo.name);
    println!("{}", "=".repeat(60));

    let mut query = BatchQuery::new(&demo.stage, TimeCode::Default);
    for &time in times {
        if times.len() > 1 || !time.is_default() {
            println!("time {}:", time);
        }
        query.set_time(time);
        let positions = query.positions(&demo.nodes);
        for (&id, pos) in demo.nodes.iter().zip(&positions) {
            let path = demo.stage.get(id)?.path();
            println!(
                "{}: {:.p$}, {:.p$}, {:.p$}",
                path, pos.x, pos.y, pos.z,
                p = precision
            );
        }

        if demo.name == "components" {
            for &id in &demo.nodes {
                let c = world_transform_components(&demo.stage, id, time)?;
                println!("  translation: {:.p$}", c.translation, p = precision);
                println!("  rotation:    {}", c.rotation);
                println!("  scale:       {:.p$}", c.scale, p = precision);
            }
        }
    }
    println!();
    Ok(())
}

fn demo_json(demo: &scenes::Demo, times: &[TimeCode]) -> anyhow::Result<serde_json::Value> {
    let mut samples = Vec::new();
    for &time in times {
        let positions = world_positions_batch(&demo.stage, &demo.nodes, time);
        let mut nodes = Vec::new();
        for (&id, pos) in demo.nodes.iter().zip(&positions) {
            let c = world_transform_components(&demo.stage, id, time)?;
            let q = c.rotation.quat();
            nodes.push(serde_json::json!({
                "path": demo.stage.get(id)?.path().as_str(),
                "position": pos.to_array(),
                "rotation": [q.x, q.y, q.z, q.w],
                "scale": c.scale.to_array(),
            }));
        }
        samples.push(serde_json::json!({
            "time": time.value(),
            "nodes": nodes,
        }));
    }
    Ok(serde_json::json!({
        "name": demo.name,
        "title": demo.title,
        "samples": samples,
    }))
}

use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use std::{env, fs};

use strokectl::actions::{Action, ActionLookup};
use strokectl::config::ConfigState;
use strokectl::gestures::{Classification, GestureClassifier};
use strokectl::host::{self, RunOptions, events, pipeline};
use strokectl::label::KNOWN_LABELS;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let profile: Option<String> = pargs.opt_value_from_str("--profile")?;
            let opts = RunOptions {
                watch: !pargs.contains("--no-watch"),
                ..RunOptions::default()
            };
            let mut cfg = ConfigState::load_or_install_default()?;
            if let Some(name) = profile {
                cfg.set_active(&name)?;
            }
            host::run(cfg, opts)
        }

        Some("classify") => {
            let preview = pargs.contains("--preview");
            let file: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: strokectl classify <points.json> [--preview]"))?;
            let txt = fs::read_to_string(&file).with_context(|| format!("failed to read {file}"))?;
            let points = events::parse_points(&txt)?;

            let cfg = ConfigState::load_or_install_default()?;
            let th = &cfg.profile.thresholds;
            let samples = if preview {
                th.preview_samples
            } else {
                th.final_samples
            };
            let classifier = GestureClassifier::new(th.classifier(samples));
            let actions = cfg.profile.action_map();

            let resp = match classifier.evaluate(&points) {
                Classification::Recognized(label) => {
                    let binding = actions.action_for(&label);
                    serde_json::json!({
                        "ok": true,
                        "gesture": label,
                        "action": binding.map(|b| b.action),
                        "description": binding.map(|b| b.description()),
                    })
                }
                Classification::Rejected(why) => serde_json::json!({
                    "ok": false,
                    "gesture": "",
                    "rejected": why.to_string(),
                }),
            };
            print_response(&resp);
            Ok(())
        }

        Some("replay") => {
            let file: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: strokectl replay <events.ndjson>"))?;
            let txt = fs::read_to_string(&file).with_context(|| format!("failed to read {file}"))?;
            let evs = txt
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(events::parse_event)
                .collect::<Result<Vec<_>>>()?;

            let cfg = ConfigState::load_or_install_default()?;
            let mut p = pipeline::Pipeline::new(&cfg.profile, strokectl::actions::NoopSink);
            for fb in pipeline::replay(&mut p, evs) {
                println!("{}", serde_json::to_string(&fb)?);
            }
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigState::load_or_install_default()?;
            print_response(&serde_json::json!({
                "profiles": cfg.list_profiles(),
                "active": cfg.active_name,
            }));
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: strokectl use <profile_name>"))?;
            let mut cfg = ConfigState::load_or_install_default()?;
            cfg.set_active(&name)?;
            println!("strokectl: active profile is now '{name}'");
            Ok(())
        }

        Some("bindings") => {
            let cfg = ConfigState::load_or_install_default()?;
            let map = cfg.profile.action_map();
            if map.is_empty() {
                println!("No gestures configured. Edit {}", cfg.profile_path().display());
            }
            for (label, binding) in map.iter() {
                println!("{:<16} {}", label, binding.description());
            }
            Ok(())
        }

        Some("labels") => {
            println!("gestures:");
            for l in KNOWN_LABELS {
                println!("  {l}");
            }
            println!("actions:");
            for a in Action::ALL {
                println!("  {:<14} {}", a.id(), a.default_description());
            }
            Ok(())
        }

        Some("doctor") => {
            let cfg = ConfigState::load_or_install_default()?;
            print_response(&cfg.doctor_report());
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"strokectl — mouse gesture recognizer

USAGE:
  strokectl help [command]                 Show general or command-specific help
  strokectl run [--profile NAME]           Read pointer events from stdin, emit actions
  strokectl classify <points.json>         Classify a recorded path
  strokectl replay <events.ndjson>         Replay a recorded event stream
  strokectl list                           List profiles
  strokectl use <name>                     Switch the active profile
  strokectl bindings                       Show the active gesture bindings
  strokectl labels                         Show bindable gestures and actions
  strokectl doctor                         Report configuration health

Run `strokectl help <command>` for details."#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            r#"strokectl run [--profile NAME] [--no-watch]

Reads one JSON event per line from stdin:
  {{"type":"down","x":10,"y":20,"button":2}}
  {{"type":"move","x":14,"y":20}}
  {{"type":"up","x":90,"y":20}}
  {{"type":"cancel"}}
  {{"type":"preview","enabled":false}}
Only button 2 (right) starts a gesture. Writes previews, discards and
actions to stdout as JSON lines. The profile is reloaded when its file
changes (unless --no-watch) and on SIGHUP."#
        ),
        "classify" => println!(
            r#"strokectl classify <points.json> [--preview]

Classifies a JSON array of [x, y] pairs or {{"x":..,"y":..}} objects with
the active profile's thresholds. --preview uses the live-preview sample
count."#
        ),
        "replay" => println!(
            r#"strokectl replay <events.ndjson>

Feeds a recorded `run` event stream through the recognizer using each
event's "t" (milliseconds) as the clock, and prints the feedback. No
actions are executed."#
        ),
        "use" => println!("strokectl use <name>\n\nMakes ~/.config/strokectl/profiles/<name>.toml active."),
        "list" => println!("strokectl list\n\nLists profiles in ~/.config/strokectl/profiles."),
        "bindings" => println!("strokectl bindings\n\nShows gesture -> action bindings of the active profile."),
        "labels" => println!("strokectl labels\n\nShows the bindable gestures and the action ids."),
        "doctor" => println!("strokectl doctor\n\nPrints the configuration report as JSON."),
        other => println!("no help for '{other}'"),
    }
}

fn print_response(v: &serde_json::Value) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{v}"),
    }
}

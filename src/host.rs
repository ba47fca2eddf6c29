//! Host loop: newline-delimited pointer events on stdin, JSON feedback and
//! actions on stdout.

pub mod dispatch;
pub mod events;
pub mod pipeline;
pub mod watch;

use anyhow::Result;
use log::{error, info, warn};
use std::{
    io::{self, BufRead, Write},
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::{Duration, Instant},
};

use crate::actions::JsonSink;
use crate::config::ConfigState;
use pipeline::{Feedback, Pipeline};

/// How often a pending preview is checked while input is idle.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub enum HostMsg {
    Line(String),
    Reload,
    Eof,
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub watch: bool,
    pub signals: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            watch: true,
            signals: true,
        }
    }
}

pub fn run(cfg: ConfigState, opts: RunOptions) -> Result<()> {
    let (tx, rx) = mpsc::channel::<HostMsg>();
    spawn_stdin_reader(tx.clone());

    let _watcher = if opts.watch {
        match watch::watch_profiles(&cfg.profiles_dir, tx.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("profile watching disabled: {e}");
                None
            }
        }
    } else {
        None
    };
    if opts.signals {
        watch::forward_signals(tx.clone())?;
    }
    drop(tx);

    serve(cfg, rx, io::stdout())?;
    Ok(())
}

/// Drives one pipeline from `rx` until EOF, shutdown or all senders are
/// gone, then hands back the output writer.
pub fn serve<W: Write>(
    mut cfg: ConfigState,
    rx: mpsc::Receiver<HostMsg>,
    out: W,
) -> Result<W> {
    let mut pipeline = Pipeline::new(&cfg.profile, JsonSink::new(out));
    info!("host: active profile '{}'", cfg.active_name);

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(HostMsg::Line(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match events::parse_event(&line) {
                    Ok(ev) => match pipeline.handle_at(ev, Instant::now()) {
                        Ok(feedback) => {
                            for fb in &feedback {
                                emit(&mut pipeline, fb)?;
                            }
                        }
                        Err(e) => error!("event rejected: {e}"),
                    },
                    Err(e) => warn!("{e:#}"),
                }
            }
            Ok(HostMsg::Reload) => match cfg.reload() {
                Ok(()) => {
                    pipeline.apply_profile(&cfg.profile);
                    info!("profile '{}' reloaded", cfg.active_name);
                }
                Err(e) => error!("reload failed, keeping previous profile: {e}"),
            },
            Ok(HostMsg::Eof) | Ok(HostMsg::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(fb) = pipeline.tick(Instant::now()) {
            emit(&mut pipeline, &fb)?;
        }
    }
    info!("host: input closed, exiting");
    Ok(pipeline.into_sink().into_inner())
}

fn emit<W: Write>(pipeline: &mut Pipeline<JsonSink<W>>, fb: &Feedback) -> Result<()> {
    // the sink already wrote the action line
    if matches!(fb, Feedback::Dispatched { .. }) {
        return Ok(());
    }
    pipeline.sink_mut().emit(&serde_json::to_value(fb)?)
}

fn spawn_stdin_reader(tx: Sender<HostMsg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => {
                    if tx.send(HostMsg::Line(l)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("stdin read failed: {e}");
                    break;
                }
            }
        }
        let _ = tx.send(HostMsg::Eof);
    });
}

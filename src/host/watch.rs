//! Reload triggers: profile file changes and SIGHUP.

use std::{path::Path, sync::mpsc::Sender, thread};

use anyhow::Result;
use log::{info, warn};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use signal_hook::{
    consts::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};

use super::HostMsg;

/// The returned watcher stops watching when dropped.
pub fn watch_profiles(profiles_dir: &Path, tx: Sender<HostMsg>) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(ev) => {
            let touches_profile = ev
                .paths
                .iter()
                .any(|p| p.extension().is_some_and(|ext| ext == "toml"));
            if touches_profile && (ev.kind.is_modify() || ev.kind.is_create()) {
                let _ = tx.send(HostMsg::Reload);
            }
        }
        Err(e) => warn!("profile watch error: {e}"),
    })?;
    watcher.watch(profiles_dir, RecursiveMode::NonRecursive)?;
    info!("watching {} for profile changes", profiles_dir.display());
    Ok(watcher)
}

/// SIGHUP reloads; SIGINT and SIGTERM stop the loop.
pub fn forward_signals(tx: Sender<HostMsg>) -> Result<()> {
    let mut signals = Signals::new([SIGHUP, SIGINT, SIGTERM])?;
    thread::spawn(move || {
        for sig in signals.forever() {
            let msg = if sig == SIGHUP {
                HostMsg::Reload
            } else {
                HostMsg::Shutdown
            };
            let stop = matches!(msg, HostMsg::Shutdown);
            if tx.send(msg).is_err() || stop {
                break;
            }
        }
    });
    Ok(())
}

use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::state::{Delta, ProviderCommand};
use crate::stats_fetch;

/// Blocking fetches run on a dedicated thread so the UI tick never waits on
/// the network. Each command is one independent request; there is no retry
/// and no cancellation of requests already in flight.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchStats { user_id } => {
                    let delta = match stats_fetch::fetch_user_stats(&user_id) {
                        Ok(user) => Delta::StatsFetched { user },
                        Err(error) => Delta::StatsFailed { error },
                    };
                    if tx.send(delta).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

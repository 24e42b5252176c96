//! `vitamins listen` — feed host notifications from a line-delimited JSON
//! stream into a tracker.
//!
//! One event per line:
//!
//! ```text
//! {"event":"error","error":{"name":"TypeError","message":"x is undefined"},"filename":"app.js","lineno":3,"colno":7}
//! {"event":"rejection","reason":{"code":42}}
//! {"event":"end"}
//! ```
//!
//! End of input or Ctrl-C ends the session, which saves the tracker.

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use vitamins_core::{ErrorEvent, HostChannel, HostEvent, Tracker};

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WireEvent {
    Error(ErrorEvent),
    Rejection {
        #[serde(default)]
        reason: Value,
    },
    End,
}

impl From<WireEvent> for HostEvent {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Error(e) => HostEvent::UncaughtError(e),
            WireEvent::Rejection { reason } => HostEvent::UnhandledRejection { reason },
            WireEvent::End => HostEvent::SessionEnd,
        }
    }
}

pub async fn listen<R>(tracker: Tracker, input: R, with_ctrl_c: bool) -> Result<Tracker, String>
where
    R: AsyncBufRead + Unpin,
{
    let channel = HostChannel::new();
    let handle = channel.handle();
    let mut session = tokio::spawn(channel.run(tracker));

    let ctrl_c = with_ctrl_c.then(|| handle.end_session_on_ctrl_c());

    let mut lines = input.lines();
    let mut accepted = 0usize;
    // Some(..) when the session ended on its own (Ctrl-C) before input ran out
    let finished = loop {
        tokio::select! {
            joined = &mut session => break Some(joined),
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| format!("Failed to read input: {}", e))? else {
                    break None;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<WireEvent>(line) {
                    Ok(event) => {
                        let event: HostEvent = event.into();
                        let ended = matches!(event, HostEvent::SessionEnd);
                        if !handle.report(event) || ended {
                            break None;
                        }
                        accepted += 1;
                    }
                    Err(e) => tracing::warn!("[Listen] Skipping malformed event: {}", e),
                }
            }
        }
    };

    handle.end_session();
    drop(handle);
    let joined = match finished {
        Some(joined) => joined,
        None => session.await,
    };
    let tracker = joined.map_err(|e| format!("Session task failed: {}", e))?;
    if let Some(task) = ctrl_c {
        task.abort();
    }

    println!(
        "Processed {} events; {} errors recorded",
        accepted,
        tracker.logs().len()
    );
    Ok(tracker)
}

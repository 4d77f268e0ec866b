use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

use delegate_lens_core::store::KeyValueStore;

use crate::input::handle_key;
use crate::render::render;
use crate::ui::{App, CheckoutOutcome, Tui};

/// Tick period for notification expiry and the debounced store writer.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) async fn run_app<S: KeyValueStore>(
    terminal: &mut Tui,
    app: &mut App<S>,
    checkout_rx: &mut mpsc::UnboundedReceiver<CheckoutOutcome>,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    while app.running {
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            if app.pending_quit {
                                app.quit();
                            } else {
                                // footer shows the warning until the next key
                                app.pending_quit = true;
                            }
                        } else {
                            app.pending_quit = false;
                            handle_key(app, key);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => app.quit(),
                }
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now());
            }

            Some(outcome) = checkout_rx.recv() => {
                debug!(plan = %outcome.plan, ok = outcome.result.is_ok(), "checkout finished");
                app.finish_checkout(outcome);
            }
        }
    }

    Ok(())
}

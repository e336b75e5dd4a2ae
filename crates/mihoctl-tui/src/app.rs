//! Application core: the single event loop that owns `ViewState`.
//!
//! Terminal input and the controller's event queue are consumed by one
//! `select!`; both funnel into `ViewState`, and the commands that come
//! back are executed here.

use std::collections::VecDeque;
use std::time::Duration;

use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mihoctl_core::dispatch;
use mihoctl_core::{Command, Controller, Event, SettingKey, ViewState};

use crate::event::{EventReader, TermEvent};
use crate::tui::Tui;
use crate::ui;

/// Top-level application state and event loop.
pub struct App {
    state: ViewState,
    controller: Controller,
    events: mpsc::Receiver<Event>,
}

impl App {
    pub fn new(
        controller: Controller,
        events: mpsc::Receiver<Event>,
        settings: Vec<(SettingKey, String)>,
    ) -> Self {
        Self {
            state: ViewState::new(settings),
            controller,
            events,
        }
    }

    /// Run until the user quits.
    pub async fn run(self) -> Result<()> {
        let Self {
            mut state,
            controller,
            mut events,
        } = self;

        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut input = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        let startup = state.startup_commands();
        execute(&mut state, &controller, startup);
        info!("event loop started");

        while !state.quit {
            tokio::select! {
                term = input.next() => match term {
                    Some(TermEvent::Key(key)) => {
                        let commands = dispatch::handle_key(&mut state, key);
                        execute(&mut state, &controller, commands);
                    }
                    Some(TermEvent::Render) => tui.draw(|frame| ui::draw(frame, &state))?,
                    Some(TermEvent::Resize(..) | TermEvent::Tick) => {}
                    None => break,
                },

                Some(event) = events.recv() => {
                    let commands = state.apply(event);
                    execute(&mut state, &controller, commands);
                }
            }
        }

        controller.shutdown();
        input.stop();
        tui.exit()?;
        info!("event loop ended");
        Ok(())
    }
}

/// Carry out commands in order. Control work goes to the controller;
/// saving a setting happens inline because its outcome feeds straight
/// back into the state.
pub(crate) fn execute(state: &mut ViewState, controller: &Controller, commands: Vec<Command>) {
    let mut queue = VecDeque::from(commands);
    while let Some(command) = queue.pop_front() {
        match command {
            Command::SaveSetting { key, value } => {
                let event = save_setting(controller, key, &value);
                queue.extend(state.apply(event));
            }
            Command::Quit => state.quit = true,
            other => controller.execute(other),
        }
    }
}

/// Persist one setting. Probe settings take effect immediately; the
/// address and secret apply on the next start.
fn save_setting(controller: &Controller, key: SettingKey, value: &str) -> Event {
    match mihoctl_config::update_setting(key, value) {
        Ok(stored) => {
            debug!(%key, "setting saved");
            let mut probe = (*controller.probe_settings()).clone();
            match key {
                SettingKey::TestUrl => probe.test_url.clone_from(&stored),
                SettingKey::Timeout => {
                    probe.timeout_ms = stored.parse().unwrap_or(probe.timeout_ms);
                }
                SettingKey::ApiAddress | SettingKey::Secret => {}
            }
            controller.update_probe(probe);
            Event::SettingSaved { key, value: stored }
        }
        Err(e) => {
            warn!(%key, error = %e, "saving setting failed");
            Event::Failed(e.to_string())
        }
    }
}

//! Key dispatch: the input state machine's transition function.
//!
//! Routing order for every key:
//!
//! 1. `Ctrl-C` quits, whatever the mode.
//! 2. In `FilterEntry` / `FieldEdit` everything else is text for the page's
//!    edit buffer; `Enter` commits and `Esc` abandons.
//! 3. Global keys: `q`, `1`-`6`, `Tab`/`BackTab`, `r`.
//! 4. Page-local bindings, including the two-stage `Esc`.

use crate::command::Command;
use crate::input::{InputMode, Key};
use crate::page::Page;
use crate::state::ViewState;

const PAGE_STEP: isize = 10;

/// Apply one key to `state` and return the side effects it requests.
pub fn handle_key(state: &mut ViewState, key: Key) -> Vec<Command> {
    // Any key acknowledges the status line.
    state.last_error = None;
    state.notice = None;

    if key == Key::Ctrl('c') {
        state.quit = true;
        return vec![Command::Quit];
    }

    if state.mode().captures_text() {
        return entry_key(state, key);
    }

    if let Some(commands) = global_key(state, &key) {
        return commands;
    }

    match state.page {
        Page::Nodes => nodes_key(state, &key),
        Page::Connections => connections_key(state, &key),
        Page::Logs => logs_key(state, &key),
        Page::Rules => rules_key(state, &key),
        Page::Settings => settings_key(state, &key),
        Page::Help => Vec::new(),
    }
}

/// Move to `target`, starting or stopping the streams as the pages
/// require and fetching whatever the new page shows.
pub fn switch_page(state: &mut ViewState, target: Page) -> Vec<Command> {
    if state.page == target {
        return Vec::new();
    }
    let from = state.page;
    state.page = target;

    let mut commands = Vec::new();
    match (from.wants_streams(), target.wants_streams()) {
        (false, true) => commands.push(Command::StartStreams),
        (true, false) => commands.push(Command::StopStreams),
        _ => {}
    }
    commands.extend(refresh_commands(target));
    commands
}

fn refresh_commands(page: Page) -> Vec<Command> {
    match page {
        Page::Nodes => vec![Command::RefreshProxies],
        Page::Connections => vec![Command::FetchConnections],
        Page::Rules => vec![Command::FetchRules],
        Page::Logs | Page::Settings | Page::Help => Vec::new(),
    }
}

fn global_key(state: &mut ViewState, key: &Key) -> Option<Vec<Command>> {
    let commands = match key {
        Key::Char('q') => {
            state.quit = true;
            vec![Command::Quit]
        }
        Key::Char(c @ '1'..='6') => {
            let page = c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(Page::from_number)?;
            switch_page(state, page)
        }
        Key::Tab => {
            let next = state.page.next();
            switch_page(state, next)
        }
        Key::BackTab => {
            let prev = state.page.prev();
            switch_page(state, prev)
        }
        Key::Char('r') => refresh_commands(state.page),
        _ => return None,
    };
    Some(commands)
}

// ── Entry modes ──────────────────────────────────────────────────────

fn entry_key(state: &mut ViewState, key: Key) -> Vec<Command> {
    let page = state.page;
    let Some(input) = state.page_input_mut() else {
        return Vec::new();
    };
    let mode = input.mode();

    match key {
        Key::Esc => {
            input.escape();
        }
        Key::Enter => {
            let text = input.commit();
            if mode == InputMode::FieldEdit && page == Page::Settings {
                let key = state.settings.selected_key();
                return vec![Command::SaveSetting {
                    key,
                    value: text.trim().to_owned(),
                }];
            }
        }
        other => {
            input.buffer_mut().handle(&other);
        }
    }

    // Filter text changed or was committed: keep the cursor in range.
    if mode == InputMode::FilterEntry {
        reset_selection(state, page);
    }
    Vec::new()
}

fn reset_selection(state: &mut ViewState, page: Page) {
    match page {
        Page::Connections => state.connections.selected = 0,
        Page::Logs => state.logs.selected = 0,
        Page::Rules => state.rules.selected = 0,
        Page::Nodes | Page::Settings | Page::Help => {}
    }
}

// ── Page bindings ────────────────────────────────────────────────────

fn nodes_key(state: &mut ViewState, key: &Key) -> Vec<Command> {
    let nodes = &mut state.nodes;
    match key {
        Key::Left | Key::Char('h') => nodes.prev_group(),
        Key::Right | Key::Char('l') => nodes.next_group(),
        Key::Up | Key::Char('k') => nodes.move_up(),
        Key::Down | Key::Char('j') => nodes.move_down(),
        Key::Char('f') => nodes.toggle_failures(),
        Key::Enter => {
            let Some(group) = nodes.current_group() else {
                return Vec::new();
            };
            let Some(member) = nodes.current_member() else {
                return Vec::new();
            };
            if !group.is_selectable() {
                state.notice = Some(format!("{} ({}) picks its own member", group.name, group.kind));
                return Vec::new();
            }
            if group.is_selected(member) {
                return Vec::new();
            }
            return vec![Command::SelectProxy {
                group: group.name.clone(),
                proxy: member.to_owned(),
            }];
        }
        Key::Char('t') => {
            let Some(member) = nodes.current_member().map(str::to_owned) else {
                return Vec::new();
            };
            nodes.begin_tests([member.as_str()], false);
            return vec![Command::TestLatency { node: member }];
        }
        Key::Char('a') => {
            let Some(group) = nodes.current_group() else {
                return Vec::new();
            };
            let (name, members) = (group.name.clone(), group.members.clone());
            if members.is_empty() {
                return Vec::new();
            }
            nodes.begin_tests(members.iter().map(String::as_str), true);
            state.notice = Some(format!("Testing {} nodes in {name}", members.len()));
            return vec![Command::TestGroup {
                group: name,
                nodes: members,
            }];
        }
        _ => {}
    }
    Vec::new()
}

fn connections_key(state: &mut ViewState, key: &Key) -> Vec<Command> {
    let view = &mut state.connections;

    if view.input.mode() == InputMode::DetailView {
        match key {
            Key::Esc => {
                view.input.escape();
                view.close_detail();
            }
            Key::Up | Key::Char('k') => {
                if let Some(detail) = view.detail.as_mut() {
                    detail.scroll = detail.scroll.saturating_sub(1);
                }
            }
            Key::Down | Key::Char('j') => {
                if let Some(detail) = view.detail.as_mut() {
                    detail.scroll = detail.scroll.saturating_add(1);
                }
            }
            _ => {}
        }
        return Vec::new();
    }

    match key {
        Key::Esc => {
            if view.input.escape() {
                view.clamp_selection();
            }
        }
        Key::Char('/') => view.input.begin_filter(),
        Key::Up | Key::Char('k') => view.move_by(-1),
        Key::Down | Key::Char('j') => view.move_by(1),
        Key::PageUp => view.move_by(-PAGE_STEP),
        Key::PageDown => view.move_by(PAGE_STEP),
        Key::Home => view.selected = 0,
        Key::End => view.move_by(isize::MAX),
        Key::Char('c') => view.toggle_closed(),
        Key::Enter => {
            if let Some(ip) = view.open_detail() {
                return vec![Command::LookupGeo { ip }];
            }
        }
        Key::Char('x') if !view.show_closed => {
            if let Some(conn) = view.selected_connection() {
                return vec![Command::CloseConnection {
                    id: conn.id.clone(),
                }];
            }
        }
        Key::Char('X') => return vec![Command::CloseAllConnections],
        _ => {}
    }
    Vec::new()
}

fn logs_key(state: &mut ViewState, key: &Key) -> Vec<Command> {
    let view = &mut state.logs;
    match key {
        Key::Esc => {
            if view.input.escape() {
                view.clamp_selection();
            }
        }
        Key::Char('/') => view.input.begin_filter(),
        Key::Left => view.lower_level(),
        Key::Right => view.raise_level(),
        Key::Char('h') => view.scroll_left(),
        Key::Char('l') => view.scroll_right(),
        Key::Up | Key::Char('k') => view.move_by(-1),
        Key::Down | Key::Char('j') => view.move_by(1),
        Key::PageUp => view.move_by(-PAGE_STEP),
        Key::PageDown => view.move_by(PAGE_STEP),
        Key::Home => view.selected = 0,
        Key::End => view.move_by(isize::MAX),
        _ => {}
    }
    Vec::new()
}

fn rules_key(state: &mut ViewState, key: &Key) -> Vec<Command> {
    let view = &mut state.rules;
    match key {
        Key::Esc => {
            if view.input.escape() {
                view.clamp_selection();
            }
        }
        Key::Char('/') => view.input.begin_filter(),
        Key::Up | Key::Char('k') => view.move_by(-1),
        Key::Down | Key::Char('j') => view.move_by(1),
        Key::PageUp => view.move_by(-PAGE_STEP),
        Key::PageDown => view.move_by(PAGE_STEP),
        Key::Home => view.selected = 0,
        Key::End => view.move_by(isize::MAX),
        _ => {}
    }
    Vec::new()
}

fn settings_key(state: &mut ViewState, key: &Key) -> Vec<Command> {
    let view = &mut state.settings;
    match key {
        Key::Up | Key::Char('k') => view.move_up(),
        Key::Down | Key::Char('j') => view.move_down(),
        Key::Enter => {
            let current = view.value(view.selected_key()).to_owned();
            view.input.begin_edit(&current);
        }
        _ => {}
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::Event;
    use crate::model::{ProxyGroup, ProxyListing, ProxyNode, SettingKey};

    fn type_str(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            handle_key(state, Key::Char(c));
        }
    }

    fn loaded_nodes() -> ViewState {
        let mut state = ViewState::default();
        let nodes = ["A", "B"]
            .into_iter()
            .map(|n| {
                (
                    n.to_owned(),
                    ProxyNode {
                        name: n.into(),
                        kind: "Trojan".into(),
                        udp: false,
                        history: Vec::new(),
                    },
                )
            })
            .collect();
        let mut groups = BTreeMap::new();
        groups.insert(
            "Proxy".to_owned(),
            ProxyGroup {
                name: "Proxy".into(),
                kind: "Selector".into(),
                members: vec!["A".into(), "B".into()],
                selected: Some("A".into()),
            },
        );
        state.apply(Event::ProxiesLoaded(ProxyListing { nodes, groups }));
        state
    }

    #[test]
    fn filter_entry_captures_global_keys() {
        let mut state = ViewState::default();
        switch_page(&mut state, Page::Rules);
        handle_key(&mut state, Key::Char('/'));
        assert_eq!(state.mode(), InputMode::FilterEntry);

        type_str(&mut state, "q1r");
        assert!(!state.quit);
        assert_eq!(state.page, Page::Rules);
        assert_eq!(state.rules.input.active_filter(), "q1r");
    }

    #[test]
    fn two_stage_escape() {
        let mut state = ViewState::default();
        switch_page(&mut state, Page::Rules);
        handle_key(&mut state, Key::Char('/'));
        type_str(&mut state, "google");
        handle_key(&mut state, Key::Enter);
        assert_eq!(state.mode(), InputMode::Normal);
        assert_eq!(state.rules.input.committed_filter(), "google");

        // First Esc clears the committed filter.
        handle_key(&mut state, Key::Esc);
        assert_eq!(state.rules.input.committed_filter(), "");

        // Esc out of an entry mode abandons the buffer, keeping the old filter.
        handle_key(&mut state, Key::Char('/'));
        type_str(&mut state, "x");
        handle_key(&mut state, Key::Enter);
        handle_key(&mut state, Key::Char('/'));
        type_str(&mut state, "yz");
        handle_key(&mut state, Key::Esc);
        assert_eq!(state.mode(), InputMode::Normal);
        assert_eq!(state.rules.input.committed_filter(), "x");
    }

    #[test]
    fn ctrl_c_quits_from_entry_mode() {
        let mut state = ViewState::default();
        switch_page(&mut state, Page::Logs);
        handle_key(&mut state, Key::Char('/'));
        assert_eq!(handle_key(&mut state, Key::Ctrl('c')), vec![Command::Quit]);
        assert!(state.quit);
    }

    #[test]
    fn page_switch_drives_streams() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(&mut state, Key::Char('2')),
            vec![Command::StartStreams, Command::FetchConnections]
        );
        // Connections → Logs keeps them running.
        assert_eq!(handle_key(&mut state, Key::Tab), Vec::new());
        assert_eq!(
            handle_key(&mut state, Key::Char('4')),
            vec![Command::StopStreams, Command::FetchRules]
        );
        assert_eq!(handle_key(&mut state, Key::Char('4')), Vec::new());
    }

    #[test]
    fn settings_edit_saves_on_enter() {
        let mut state = ViewState::new([(SettingKey::TestUrl, "http://a/".to_owned())]);
        switch_page(&mut state, Page::Settings);
        handle_key(&mut state, Key::Down);
        handle_key(&mut state, Key::Down);
        assert_eq!(state.settings.selected_key(), SettingKey::TestUrl);

        handle_key(&mut state, Key::Enter);
        assert_eq!(state.mode(), InputMode::FieldEdit);
        assert_eq!(state.settings.input.buffer().text(), "http://a/");

        handle_key(&mut state, Key::Home);
        handle_key(&mut state, Key::Delete);
        handle_key(&mut state, Key::Delete);
        handle_key(&mut state, Key::Delete);
        handle_key(&mut state, Key::Delete);
        handle_key(&mut state, Key::Paste("https".into()));
        let commands = handle_key(&mut state, Key::Enter);
        assert_eq!(
            commands,
            vec![Command::SaveSetting {
                key: SettingKey::TestUrl,
                value: "https://a/".into(),
            }]
        );
        assert_eq!(state.mode(), InputMode::Normal);
    }

    #[test]
    fn select_and_test_keys() {
        let mut state = loaded_nodes();
        // Already selected: nothing to do.
        assert_eq!(handle_key(&mut state, Key::Enter), Vec::new());

        handle_key(&mut state, Key::Down);
        assert_eq!(
            handle_key(&mut state, Key::Enter),
            vec![Command::SelectProxy {
                group: "Proxy".into(),
                proxy: "B".into(),
            }]
        );

        assert_eq!(
            handle_key(&mut state, Key::Char('a')),
            vec![Command::TestGroup {
                group: "Proxy".into(),
                nodes: vec!["A".into(), "B".into()],
            }]
        );
        assert!(state.nodes.is_testing());
    }

    #[test]
    fn logs_scroll_sideways_without_touching_level() {
        use crate::model::{LogEntry, LogLevel};
        use crate::state::H_SCROLL_STEP;

        let mut state = ViewState::default();
        switch_page(&mut state, Page::Logs);
        state.apply(Event::Log(LogEntry {
            level: LogLevel::Info,
            payload: "x".repeat(20),
            received_at: chrono::Utc::now(),
        }));

        handle_key(&mut state, Key::Char('l'));
        assert_eq!(state.logs.h_scroll, H_SCROLL_STEP);
        assert_eq!(state.logs.level, LogLevel::Info);

        // Stops before running past the longest payload.
        for _ in 0..5 {
            handle_key(&mut state, Key::Char('l'));
        }
        assert_eq!(state.logs.h_scroll, 19);

        handle_key(&mut state, Key::Char('h'));
        assert_eq!(state.logs.h_scroll, 19 - H_SCROLL_STEP);

        handle_key(&mut state, Key::Right);
        assert_eq!(state.logs.level, LogLevel::Warning);
        assert_eq!(state.logs.h_scroll, 19 - H_SCROLL_STEP);
    }

    #[test]
    fn any_key_clears_last_error() {
        let mut state = ViewState::default();
        state.apply(Event::Failed("boom".into()));
        handle_key(&mut state, Key::Down);
        assert!(state.last_error.is_none());
    }
}

// ── Rules page state ──

use crate::filter;
use crate::input::PageInput;
use crate::model::Rule;

#[derive(Debug, Clone, Default)]
pub struct RulesView {
    pub rules: Vec<Rule>,
    pub input: PageInput,
    pub selected: usize,
    pub loaded: bool,
}

impl RulesView {
    /// Replace the snapshot wholesale.
    pub fn replace(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
        self.loaded = true;
        self.clamp_selection();
    }

    pub fn visible(&self) -> Vec<&Rule> {
        filter::filter_rules(&self.rules, self.input.active_filter())
    }

    pub fn move_by(&mut self, delta: isize) {
        let len = self.visible().len();
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

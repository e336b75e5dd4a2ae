// ── Settings page state ──

use crate::input::PageInput;
use crate::model::SettingKey;

#[derive(Debug, Clone, Default)]
pub struct SettingsView {
    /// Values in `SettingKey::ALL` order.
    values: [String; 4],
    pub selected: usize,
    pub input: PageInput,
}

impl SettingsView {
    pub fn new(values: impl IntoIterator<Item = (SettingKey, String)>) -> Self {
        let mut view = Self::default();
        for (key, value) in values {
            view.set(key, value);
        }
        view
    }

    fn slot(key: SettingKey) -> usize {
        SettingKey::ALL.iter().position(|k| *k == key).unwrap_or(0)
    }

    pub fn value(&self, key: SettingKey) -> &str {
        self.values.get(Self::slot(key)).map_or("", String::as_str)
    }

    pub fn set(&mut self, key: SettingKey, value: String) {
        if let Some(slot) = self.values.get_mut(Self::slot(key)) {
            *slot = value;
        }
    }

    pub fn selected_key(&self) -> SettingKey {
        SettingKey::ALL
            .get(self.selected)
            .copied()
            .unwrap_or(SettingKey::ApiAddress)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.selected = (self.selected + 1).min(SettingKey::ALL.len() - 1);
    }
}

// ── Editable settings ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The persisted settings a user can edit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SettingKey {
    #[strum(to_string = "api-address", serialize = "api_address")]
    ApiAddress,
    Secret,
    #[strum(to_string = "test-url", serialize = "test_url")]
    TestUrl,
    Timeout,
}

impl SettingKey {
    pub const ALL: [Self; 4] = [Self::ApiAddress, Self::Secret, Self::TestUrl, Self::Timeout];

    pub fn label(self) -> &'static str {
        match self {
            Self::ApiAddress => "API address",
            Self::Secret => "Secret",
            Self::TestUrl => "Test URL",
            Self::Timeout => "Timeout (ms)",
        }
    }
}

//! Key command implementation.

use chrono::Utc;

use crate::bucket::bucket_key;
use crate::cli::args::KeyArgs;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The key command implementation.
pub struct KeyCommand {
    config: MoonConfig,
    args: KeyArgs,
}

impl KeyCommand {
    /// Create a new key command.
    pub fn new(config: MoonConfig, args: KeyArgs) -> Self {
        Self { config, args }
    }
}

impl Command for KeyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let at = self.args.at.unwrap_or_else(Utc::now);
        let key = bucket_key(at, self.config.granularity);
        let url = self.config.source().url_for(self.config.hemisphere, key);

        ui.key_value("key", &key.to_string());
        ui.key_value("url", &url);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Granularity;
    use crate::phase::Hemisphere;
    use crate::ui::MockUI;
    use chrono::TimeZone;

    #[test]
    fn prints_key_and_url() {
        let mut config = MoonConfig::default();
        config.download.url_template = "https://frames.test/{segment}/moon.{key}.jpg".into();
        config.hemisphere = Hemisphere::South;
        let args = KeyArgs {
            at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
        };
        let mut ui = MockUI::new();

        KeyCommand::new(config, args).execute(&mut ui).unwrap();

        assert_eq!(
            ui.messages(),
            [
                "key: 0011".to_string(),
                "url: https://frames.test/5/moon.0011.jpg".to_string()
            ]
        );
    }

    #[test]
    fn follows_configured_granularity() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 45, 0).unwrap();
        let mut config = MoonConfig::default();

        config.granularity = Granularity::Hour;
        let mut ui = MockUI::new();
        KeyCommand::new(config.clone(), KeyArgs { at: Some(at) })
            .execute(&mut ui)
            .unwrap();
        assert!(ui.has_message("key: 0011"));

        config.granularity = Granularity::NearestHour;
        let mut ui = MockUI::new();
        KeyCommand::new(config, KeyArgs { at: Some(at) })
            .execute(&mut ui)
            .unwrap();
        assert!(ui.has_message("key: 0012"));
    }
}

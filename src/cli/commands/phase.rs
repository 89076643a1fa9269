//! Phase command implementation.

use chrono::Utc;

use crate::cli::args::PhaseArgs;
use crate::config::MoonConfig;
use crate::error::Result;
use crate::phase::{phase_symbol, synodic_age};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The phase command implementation.
pub struct PhaseCommand {
    config: MoonConfig,
    args: PhaseArgs,
}

impl PhaseCommand {
    /// Create a new phase command.
    pub fn new(config: MoonConfig, args: PhaseArgs) -> Self {
        Self { config, args }
    }
}

impl Command for PhaseCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let date = self.args.date.unwrap_or_else(|| Utc::now().date_naive());
        let hemisphere = self.args.hemisphere.unwrap_or(self.config.hemisphere);

        let symbol = phase_symbol(date, hemisphere);
        ui.message(symbol);
        ui.success(&format!(
            "{} seen from the {} on {} (age {:.1} days)",
            symbol,
            hemisphere,
            date,
            synodic_age(date)
        ));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Hemisphere;
    use crate::ui::MockUI;
    use chrono::NaiveDate;

    fn run(config: MoonConfig, args: PhaseArgs) -> MockUI {
        let mut ui = MockUI::new();
        let result = PhaseCommand::new(config, args).execute(&mut ui).unwrap();
        assert!(result.success);
        ui
    }

    #[test]
    fn flag_overrides_configured_hemisphere() {
        let mut config = MoonConfig::default();
        config.hemisphere = Hemisphere::North;
        let args = PhaseArgs {
            date: NaiveDate::from_ymd_opt(2000, 1, 11),
            hemisphere: Some(Hemisphere::South),
        };

        let ui = run(config, args);

        assert_eq!(ui.messages(), ["🌘".to_string()]);
        assert!(ui.has_success("south"));
    }

    #[test]
    fn uses_configured_hemisphere() {
        let args = PhaseArgs {
            date: NaiveDate::from_ymd_opt(2000, 1, 11),
            hemisphere: None,
        };

        let ui = run(MoonConfig::default(), args);

        assert_eq!(ui.messages(), ["🌒".to_string()]);
    }

    #[test]
    fn defaults_to_today() {
        let ui = run(MoonConfig::default(), PhaseArgs::default());

        assert_eq!(ui.messages().len(), 1);
        assert!(ui.has_success(&Utc::now().date_naive().to_string()));
    }
}

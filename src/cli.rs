//! Command line definitions using clap

use std::path::PathBuf;

use clap::Parser;

use crate::config::GameConfig;
use crate::domain::color::Color;
use crate::domain::variant::Variant;

#[derive(Parser, Debug)]
#[command(name = "hueguess", version)]
#[command(about = "Terminal color-matching game: pick the button that matches the box")]
pub struct Cli {
    /// Config file to use instead of searching for config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Game variant: classic (random decoys) or near_miss (look-alike decoys)
    #[arg(long)]
    pub variant: Option<Variant>,

    /// Seed for the color generator, for reproducible sessions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Status banner lifetime and restart delay after a correct guess
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Spread of near-miss decoys
    #[arg(long)]
    pub variation: Option<u8>,

    /// Target color of the first round, as `rgb(r, g, b)` or `#rrggbb`
    #[arg(long, value_name = "COLOR")]
    pub target: Option<Color>,

    /// Print the first round as text and exit
    #[arg(long)]
    pub print_round: bool,

    /// Print one near-miss of COLOR and exit (unparsable input gives a random color)
    #[arg(long, value_name = "COLOR")]
    pub similar_to: Option<String>,
}

impl Cli {
    /// Command line flags take precedence over the config file.
    pub fn apply(&self, cfg: &mut GameConfig) {
        if let Some(variant) = self.variant {
            cfg.rules.variant = variant;
        }
        if let Some(ms) = self.delay_ms {
            cfg.rules.status_delay_ms = ms;
        }
        if let Some(variation) = self.variation {
            cfg.rules.similar_variation = variation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "hueguess", "--variant", "near-miss", "--delay-ms", "250", "--variation", "12",
        ])
        .unwrap();
        let mut cfg = GameConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.rules.variant, Variant::NearMiss);
        assert_eq!(cfg.rules.status_delay_ms, 250);
        assert_eq!(cfg.rules.similar_variation, 12);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::try_parse_from(["hueguess"]).unwrap();
        let mut cfg = GameConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.rules, GameConfig::default().rules);
        assert!(!cli.print_round);
    }

    #[test]
    fn target_is_parsed_as_color() {
        let cli = Cli::try_parse_from(["hueguess", "--target", "rgb(1, 2, 3)"]).unwrap();
        assert_eq!(cli.target, Some(Color::new(1, 2, 3)));
        assert!(Cli::try_parse_from(["hueguess", "--target", "blue"]).is_err());
        assert!(Cli::try_parse_from(["hueguess", "--variant", "hard"]).is_err());
    }
}

use std::path::PathBuf;
use std::str::FromStr;

use office_engine::{
    resolve_app_paths, Clock, LoopConfig, MonotonicClock, Scene, StartupError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::office::{
    default_roster, load_roster_file, OfficeScene, Roster, RosterLoadError, SimConfig, Simulation,
};

const ROSTER_ENV_VAR: &str = "OFFICE_ROSTER";
const CHARACTER_SPEED_ENV_VAR: &str = "OFFICE_CHARACTER_SPEED";
const ANIMATION_INTERVAL_ENV_VAR: &str = "OFFICE_ANIMATION_MS";
const ROSTER_ASSET: &str = "roster.json";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Roster(#[from] RosterLoadError),
    #[error(transparent)]
    Startup(#[from] StartupError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Office Startup ===");

    let sim_config = apply_env_overrides(SimConfig::default(), |var| std::env::var(var).ok());
    let roster = resolve_roster()?;
    info!(
        roles = roster.len(),
        speed = sim_config.character_speed,
        animation_interval_ms = sim_config.animation_interval_ms,
        "office_configured"
    );

    let now_ms = MonotonicClock::new().now_ms();
    let simulation = Simulation::new(roster, sim_config, StdRng::from_os_rng(), now_ms);
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(OfficeScene::new(simulation)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Picks the roster file: `OFFICE_ROSTER`, then `assets/roster.json` under the
/// project root, then the built-in roles.
fn resolve_roster() -> Result<Roster, BootstrapError> {
    if let Some(path) = std::env::var_os(ROSTER_ENV_VAR) {
        let path = PathBuf::from(path);
        info!(path = %path.display(), "roster_from_env");
        return Ok(load_roster_file(&path)?);
    }

    let paths = match resolve_app_paths() {
        Ok(paths) => paths,
        Err(StartupError::RootNotFound { start_dir, .. }) => {
            info!(
                start_dir = %start_dir.display(),
                "project_root_not_found_using_default_roster"
            );
            return Ok(default_roster());
        }
        Err(error) => return Err(error.into()),
    };

    let roster_path = paths.asset(ROSTER_ASSET);
    if roster_path.is_file() {
        info!(path = %roster_path.display(), "roster_from_assets");
        return Ok(load_roster_file(&roster_path)?);
    }
    info!(root = %paths.root.display(), "using_default_roster");
    Ok(default_roster())
}

fn apply_env_overrides(
    mut config: SimConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SimConfig {
    if let Some(speed) = parse_override::<f32>(&lookup, CHARACTER_SPEED_ENV_VAR) {
        if speed.is_finite() && speed > 0.0 {
            config.character_speed = speed;
        } else {
            warn!(
                var = CHARACTER_SPEED_ENV_VAR,
                value = speed,
                "invalid_env_override_ignored"
            );
        }
    }
    if let Some(interval) = parse_override::<u64>(&lookup, ANIMATION_INTERVAL_ENV_VAR) {
        if interval > 0 {
            config.animation_interval_ms = interval;
        } else {
            warn!(var = ANIMATION_INTERVAL_ENV_VAR, "invalid_env_override_ignored");
        }
    }
    config
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Option<T> {
    let raw = lookup(var)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var, value = raw.as_str(), "invalid_env_override_ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(key, _)| *key == var)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn overrides_apply_when_valid() {
        let config = apply_env_overrides(
            SimConfig::default(),
            env_of(&[
                ("OFFICE_CHARACTER_SPEED", " 3.5 "),
                ("OFFICE_ANIMATION_MS", "150"),
            ]),
        );
        assert_eq!(config.character_speed, 3.5);
        assert_eq!(config.animation_interval_ms, 150);
    }

    #[test]
    fn bad_overrides_fall_back_to_defaults() {
        let config = apply_env_overrides(
            SimConfig::default(),
            env_of(&[
                ("OFFICE_CHARACTER_SPEED", "fast"),
                ("OFFICE_ANIMATION_MS", "0"),
            ]),
        );
        assert_eq!(config, SimConfig::default());

        let negative = apply_env_overrides(
            SimConfig::default(),
            env_of(&[("OFFICE_CHARACTER_SPEED", "-2")]),
        );
        assert_eq!(negative.character_speed, 2.0);
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let config = apply_env_overrides(SimConfig::default(), env_of(&[]));
        assert_eq!(config, SimConfig::default());
    }
}

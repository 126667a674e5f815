pub mod frost_runner;

use crate::catalog::{self, Game};
use crate::config::RunnerConfig;
use crate::error::{FrostError, Result};

pub struct GameDescriptor
{
    pub slug: &'static str,
    pub run: fn(&RunnerConfig) -> Result<()>,
}

pub fn registry() -> Vec<GameDescriptor>
{
    vec![GameDescriptor {
        slug: "frost-runner",
        run: frost_runner::run_with_config,
    }]
}

pub fn is_playable(slug: &str) -> bool
{
    registry().iter().any(|game| game.slug == slug)
}

pub fn playable() -> Vec<&'static Game>
{
    catalog::all()
        .iter()
        .filter(|game| is_playable(game.slug))
        .collect()
}

pub fn find(slug: &str) -> Result<GameDescriptor>
{
    if catalog::get(slug).is_none() {
        return Err(FrostError::UnknownGame(slug.to_string()));
    }
    registry()
        .into_iter()
        .find(|game| game.slug == slug)
        .ok_or_else(|| FrostError::NotPlayable(slug.to_string()))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_registry_entries_exist_in_catalog()
    {
        for game in registry() {
            assert!(catalog::get(game.slug).is_some(), "{} missing from catalog", game.slug);
        }
    }

    #[test]
    fn test_find_distinguishes_unknown_and_unplayable()
    {
        assert!(find("frost-runner").is_ok());
        assert!(matches!(find("neon-puzzle"), Err(FrostError::NotPlayable(_))));
        assert!(matches!(find("tetris"), Err(FrostError::UnknownGame(_))));
    }

    #[test]
    fn test_playable_filters_catalog()
    {
        let slugs: Vec<&str> = playable().iter().map(|game| game.slug).collect();
        assert_eq!(slugs, vec!["frost-runner"]);
    }
}

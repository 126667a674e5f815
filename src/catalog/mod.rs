use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty
{
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

#[derive(Debug, PartialEq)]
pub struct Game
{
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub thumbnail_path: &'static str,
    pub featured: bool,
    pub created_at: &'static str,
    pub build_path: &'static str,
    pub difficulty: Option<Difficulty>,
    pub play_time: Option<&'static str>,
    pub og_image_path: Option<&'static str>,
}

impl Game
{
    pub fn has_tag(&self, tag: &str) -> bool
    {
        self.tags.contains(&tag)
    }

    fn matches(&self, lowercase_query: &str) -> bool
    {
        self.title.to_lowercase().contains(lowercase_query)
            || self.description.to_lowercase().contains(lowercase_query)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(lowercase_query))
    }
}

static GAMES: [Game; 3] = [
    Game {
        slug: "frost-runner",
        title: "Frost Runner",
        description: "Navigate through icy obstacles in this fast-paced endless runner with stunning visual effects.",
        tags: &["Action", "Endless", "Casual"],
        thumbnail_path: "games/frost-runner/thumbnail.png",
        featured: true,
        created_at: "2024-01-15",
        build_path: "games/frost-runner/",
        difficulty: Some(Difficulty::Medium),
        play_time: Some("10-30 min"),
        og_image_path: Some("games/frost-runner/og-image.png"),
    },
    Game {
        slug: "neon-puzzle",
        title: "Neon Puzzle",
        description: "Solve mind-bending puzzles with glowing neon blocks in this atmospheric brain teaser.",
        tags: &["Puzzle", "Strategy", "Relaxing"],
        thumbnail_path: "games/neon-puzzle/thumbnail.png",
        featured: false,
        created_at: "2024-01-10",
        build_path: "games/neon-puzzle/",
        difficulty: Some(Difficulty::Hard),
        play_time: Some("30-60 min"),
        og_image_path: None,
    },
    Game {
        slug: "cyber-defense",
        title: "Cyber Defense",
        description: "Defend your digital fortress against waves of cyber threats in this tower defense game.",
        tags: &["Strategy", "Defense", "Cyberpunk"],
        thumbnail_path: "games/cyber-defense/thumbnail.png",
        featured: true,
        created_at: "2024-01-05",
        build_path: "games/cyber-defense/",
        difficulty: Some(Difficulty::Hard),
        play_time: Some("45-90 min"),
        og_image_path: None,
    },
];

pub fn all() -> &'static [Game]
{
    &GAMES
}

pub fn get(slug: &str) -> Option<&'static Game>
{
    GAMES.iter().find(|game| game.slug == slug)
}

pub fn featured() -> Vec<&'static Game>
{
    GAMES.iter().filter(|game| game.featured).collect()
}

pub fn by_tag(tag: &str) -> Vec<&'static Game>
{
    GAMES.iter().filter(|game| game.has_tag(tag)).collect()
}

pub fn all_tags() -> Vec<&'static str>
{
    GAMES
        .iter()
        .flat_map(|game| game.tags.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Case-insensitive substring search over title, description and tags.
pub fn search(query: &str) -> Vec<&'static Game>
{
    let query = query.to_lowercase();
    GAMES.iter().filter(|game| game.matches(&query)).collect()
}

pub fn filter(query: &str, tag: Option<&str>) -> Vec<&'static Game>
{
    let mut result = if query.is_empty() {
        GAMES.iter().collect()
    } else {
        search(query)
    };
    if let Some(tag) = tag {
        result.retain(|game| game.has_tag(tag));
    }
    result
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn slugs(games: &[&Game]) -> Vec<&'static str>
    {
        games.iter().map(|game| game.slug).collect()
    }

    #[test]
    fn test_get()
    {
        assert_eq!(get("neon-puzzle").map(|game| game.title), Some("Neon Puzzle"));
        assert!(get("missing").is_none());
    }

    #[test]
    fn test_featured_keeps_order()
    {
        assert_eq!(slugs(&featured()), vec!["frost-runner", "cyber-defense"]);
    }

    #[test]
    fn test_by_tag_is_exact()
    {
        assert_eq!(slugs(&by_tag("Strategy")), vec!["neon-puzzle", "cyber-defense"]);
        assert!(by_tag("strategy").is_empty());
    }

    #[test]
    fn test_all_tags_sorted_unique()
    {
        let tags = all_tags();
        assert_eq!(tags.len(), 8);
        assert_eq!(tags.first(), Some(&"Action"));
        assert!(tags.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_search_case_insensitive()
    {
        assert_eq!(slugs(&search("FROST")), vec!["frost-runner"]);
        assert_eq!(slugs(&search("cyberpunk")), vec!["cyber-defense"]);
        assert_eq!(slugs(&search("neon blocks")), vec!["neon-puzzle"]);
        assert_eq!(search("").len(), 3);
        assert!(search("racing").is_empty());
    }

    #[test]
    fn test_filter_combines_query_and_tag()
    {
        assert_eq!(slugs(&filter("", Some("Strategy"))), vec!["neon-puzzle", "cyber-defense"]);
        assert_eq!(slugs(&filter("defense", Some("Strategy"))), vec!["cyber-defense"]);
        assert!(filter("frost", Some("Puzzle")).is_empty());
        assert_eq!(filter("", None).len(), all().len());
    }

    #[test]
    fn test_optional_fields()
    {
        let runner = get("frost-runner").unwrap();
        assert_eq!(runner.difficulty, Some(Difficulty::Medium));
        assert_eq!(runner.difficulty.map(|d| d.to_string()), Some("Medium".to_string()));
        assert!(get("cyber-defense").unwrap().og_image_path.is_none());
    }
}

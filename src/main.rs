use clap::Parser;
use env_logger::{Env, Target};
use frostplay::catalog::{self, Game};
use frostplay::config::{Cli, Command, RunnerConfig};
use frostplay::{games, FrostError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()>
{
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        None => interactive_menu(),
        Some(Command::List {
            featured,
            tag,
            playable,
        }) => {
            print_games(&list_selection(featured, tag.as_deref(), playable));
            Ok(())
        }
        Some(Command::Search { query, tag }) => {
            print_games(&catalog::filter(&query, tag.as_deref()));
            Ok(())
        }
        Some(Command::Tags) => {
            for tag in catalog::all_tags() {
                println!("{tag}");
            }
            Ok(())
        }
        Some(Command::Show { slug }) => {
            let game = catalog::get(&slug).ok_or_else(|| FrostError::UnknownGame(slug.clone()))?;
            print_details(game);
            Ok(())
        }
        Some(Command::Play { slug, runner }) => run_game(&slug, &runner),
    }
}

fn init_logging(path: Option<&Path>) -> Result<()>
{
    // Raw mode owns the terminal while playing, so logs only go to a file.
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| FrostError::Logger(format!("{}: {err}", path.display())))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|err| FrostError::Logger(err.to_string()))
}

fn run_game(slug: &str, config: &RunnerConfig) -> Result<()>
{
    let game = games::find(slug)?;
    log::info!("launching {slug}");
    (game.run)(config)
}

fn interactive_menu() -> Result<()>
{
    let entries = catalog::all();
    println!("FrostPlay");
    println!();
    println!("Select a game:");
    for (idx, game) in entries.iter().enumerate() {
        let note = if games::is_playable(game.slug) { "" } else { " (web only)" };
        println!("  {}. {} - {}{}", idx + 1, game.title, game.description, note);
    }
    println!();
    print!("Enter number or slug (default 1, q to quit): ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let choice = input.trim();

    let config = RunnerConfig::default();
    if choice.is_empty() {
        return run_game(entries[0].slug, &config);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= entries.len() {
            return run_game(entries[index - 1].slug, &config);
        }
    }

    for game in entries {
        if game.slug.eq_ignore_ascii_case(choice) || game.title.eq_ignore_ascii_case(choice) {
            return run_game(game.slug, &config);
        }
    }

    Err(FrostError::InvalidSelection(choice.to_string()))
}

fn list_selection(featured: bool, tag: Option<&str>, playable: bool) -> Vec<&'static Game>
{
    let mut selection: Vec<&'static Game> = catalog::all().iter().collect();
    let mut narrow = |keep: Vec<&'static Game>| selection.retain(|game| keep.contains(game));
    if let Some(tag) = tag {
        narrow(catalog::by_tag(tag));
    }
    if featured {
        narrow(catalog::featured());
    }
    if playable {
        narrow(games::playable());
    }
    selection
}

fn print_games(selection: &[&Game])
{
    if selection.is_empty() {
        println!("No games found. Try adjusting your search or filter criteria.");
        return;
    }
    for game in selection {
        let marker = if game.featured { "*" } else { " " };
        println!("{marker} {:<15} - {} [{}]", game.slug, game.title, game.tags.join(", "));
    }
}

fn print_details(game: &Game)
{
    println!("{}", game.title);
    println!("{}", game.description);
    println!();
    println!("Slug:       {}", game.slug);
    println!("Tags:       {}", game.tags.join(", "));
    if let Some(difficulty) = game.difficulty {
        println!("Difficulty: {difficulty}");
    }
    if let Some(play_time) = game.play_time {
        println!("Play time:  {play_time}");
    }
    println!("Added:      {}", game.created_at);
    println!("Build:      {}", game.build_path);
    println!("Thumbnail:  {}", game.thumbnail_path);
    if let Some(og_image) = game.og_image_path {
        println!("OG image:   {og_image}");
    }
    let playable = if games::is_playable(game.slug) { "yes" } else { "no" };
    println!("Terminal:   {playable}");
}

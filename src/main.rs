/// Entry point and game loop.

mod cli;
mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cli::Cli;
use config::GameConfig;
use domain::color::similar_color_str;
use domain::options::OPTION_COUNT;
use sim::event::GameEvent;
use sim::step::{self, FocusMove};
use sim::world::GameState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::layout::{Element, Layout};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load_from(path),
        None => GameConfig::load(),
    };
    cli.apply(&mut config);

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: {e:#}; continuing without a log file");
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(base) = &cli.similar_to {
        println!("{}", similar_color_str(base, config.rules.similar_variation, &mut rng));
        return Ok(());
    }

    let mut game = match cli.target {
        Some(target) => GameState::with_target(config.rules.clone(), target, rng),
        None => GameState::new(config.rules.clone(), rng),
    };

    if cli.print_round {
        print_round(&game);
        return Ok(());
    }

    let mut renderer = Renderer::new(config.rules.variant);

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        return Err(e).context("terminal init failed");
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    tracing::info!(score = game.score, rounds = game.round, "session ended");
    result?;

    println!();
    println!("Thanks for playing Hue Guess!");
    println!("Final Score: {}", game.score);
    Ok(())
}

/// Headless view of the first round.
fn print_round(game: &GameState) {
    println!("variant: {}", game.rules.variant);
    println!("target:  {}", game.target);
    for (i, color) in game.options.iter().enumerate() {
        let mark = if color == game.target { "  <- target" } else { "" };
        println!("  {}. {color}{mark}", i + 1);
    }
}

fn game_loop(
    game: &mut GameState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_input(game, renderer.layout(), sound, &kb, &gp) {
            break;
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            let events = step::advance(game, elapsed);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(game, gp.connected)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CorrectGuess { .. } => sfx.play_correct(),
            GameEvent::WrongGuess { .. } => sfx.play_wrong(),
            GameEvent::RoundStarted { .. } => sfx.play_round(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_NEW_GAME: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_CHANGE_COLOR: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Run the action behind a clicked element.
fn activate(game: &mut GameState, element: Element) -> Vec<GameEvent> {
    match element {
        Element::ColorOption(i) => step::guess(game, i),
        Element::NewGameButton => step::new_game(game),
        Element::ChangeColorButton => step::change_color(game),
        _ => Vec::new(),
    }
}

/// Apply this frame's input. Returns true when the player quits.
fn handle_input(
    game: &mut GameState,
    layout: &Layout,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
) -> bool {
    if kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
        return true;
    }

    let mut events = Vec::new();

    for &(col, row) in &kb.clicks {
        if let Some(element) = layout.hit_test(col, row) {
            tracing::debug!(id = element.id(), col, row, "click");
            events.extend(activate(game, element));
        }
    }

    if let Some(index) = kb.digit_pressed(OPTION_COUNT) {
        events.extend(step::guess(game, index));
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        let index = game.cursor;
        events.extend(step::guess(game, index));
    }
    if kb.any_pressed(KEYS_NEW_GAME) || gp.new_game_pressed() {
        events.extend(step::new_game(game));
    }
    if kb.any_pressed(KEYS_CHANGE_COLOR) || gp.change_color_pressed() {
        events.extend(step::change_color(game));
    }

    let moves = [
        (kb.any_pressed(KEYS_LEFT) || gp.left_pressed(), FocusMove::Left),
        (kb.any_pressed(KEYS_RIGHT) || gp.right_pressed(), FocusMove::Right),
        (kb.any_pressed(KEYS_UP) || gp.up_pressed(), FocusMove::Up),
        (kb.any_pressed(KEYS_DOWN) || gp.down_pressed(), FocusMove::Down),
    ];
    for (pressed, dir) in moves {
        if pressed {
            step::move_cursor(game, dir);
        }
    }

    process_sound_events(sound, &events);
    false
}

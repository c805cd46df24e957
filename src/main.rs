//! keyglow demo binary
//!
//! Runs the lighting controller against a scripted game session and a
//! terminal keyboard so the whole behavior surface can be watched without a
//! game client or an LED device attached.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    terminal, ExecutableCommand,
};

use keyglow::config::{self, ConfigManager};
use keyglow::controller::LightController;
use keyglow::preview::PreviewDriver;
use keyglow::sim::{Scenario, SimHost};

// CLI definitions
mod cli;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keyglow=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    match cli.command {
        // Default: run the demo session
        None => run_demo(config_path, 20),
        Some(Commands::Demo { tps }) => run_demo(config_path, tps),
        Some(Commands::Config { write }) => show_config(config_path, write),
    }
}

fn run_demo(config_path: PathBuf, tps: u32) -> anyhow::Result<()> {
    let tps = tps.clamp(1, 60);
    let frame = Duration::from_secs_f64(1.0 / tps as f64);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    // Construct before entering the alternate screen so startup logs stay
    // readable.
    let mut controller = LightController::new(PreviewDriver::new(), SimHost::new(), config_path);
    let mut scenario = Scenario::new();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout
        .execute(terminal::EnterAlternateScreen)?
        .execute(cursor::Hide)?;

    let result = demo_loop(
        &mut stdout,
        &mut controller,
        &mut scenario,
        frame,
        tps,
        &running,
    );

    stdout
        .execute(cursor::Show)?
        .execute(terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    controller.shutdown();
    result
}

fn demo_loop(
    stdout: &mut io::Stdout,
    controller: &mut LightController<PreviewDriver, SimHost>,
    scenario: &mut Scenario,
    frame: Duration,
    tps: u32,
    running: &AtomicBool,
) -> anyhow::Result<()> {
    let mut in_world = false;

    while running.load(Ordering::SeqCst) {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => {}
                }
            }
        }

        let label = match scenario.advance(controller.host_mut()) {
            Some(label) => label,
            None => {
                scenario.restart();
                continue;
            }
        };

        // The join and disconnect callbacks a real client would fire.
        let now_in_world = controller.host().in_world();
        if now_in_world && !in_world {
            controller.on_join();
        } else if !now_in_world && in_world {
            controller.on_disconnect();
        }
        in_world = now_in_world;

        controller.on_tick();

        let header = format!("keyglow demo  {tps} tps  (q or Esc quits)");
        let status = format!("{label}  |  effect: {:?}", controller.active_effect());
        controller.session().driver().draw(stdout, &header, &status)?;

        std::thread::sleep(frame);
    }
    Ok(())
}

fn show_config(path: PathBuf, write: bool) -> anyhow::Result<()> {
    let mut config = ConfigManager::load(&path);

    println!("config file: {}", config.path().display());
    println!();
    println!("colors:");
    for (category, color) in config.colors() {
        println!("  {category:<20} {color}");
    }

    let s = config.settings();
    println!();
    println!("settings:");
    println!("  enabled                {}", s.enabled);
    println!("  damageEffect           {}", s.damage_effect);
    println!("  underwaterEffect       {}", s.underwater_effect);
    println!("  poisonEffect           {}", s.poison_effect);
    println!("  witherEffect           {}", s.wither_effect);
    println!("  frozenEffect           {}", s.frozen_effect);
    println!("  lowHealthBlink         {}", s.low_health_blink);
    println!("  netherPortalEffect     {}", s.nether_portal_effect);
    println!("  highlightSelectedSlot  {}", s.highlight_selected_slot);

    if write {
        config.save();
        println!();
        println!("written to {}", config.path().display());
    }
    Ok(())
}

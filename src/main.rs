//! Catchfall headless runner
//!
//! Plays one round in real time with an autopilot on the paddle and logs the
//! scoreboard. Usage: `catchfall [settings.json]`, with `CATCHFALL_SEED` to
//! pick the spawn seed.

#[cfg(not(target_arch = "wasm32"))]
mod session {
    use std::error::Error;
    use std::time::{Duration, Instant};

    use catchfall::consts::{DEFAULT_FRAME_RATE, DEFAULT_SEED};
    use catchfall::{Direction, Engine, PaintSnapshot, Settings};

    /// Paddle follows the lowest object once it is this far off-center
    const AUTOPILOT_DEADZONE: f32 = 8.0;

    pub fn load_settings(path: Option<String>) -> Result<Settings, Box<dyn Error>> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                let settings = Settings::from_json(&json)?;
                log::info!("Loaded settings from {}", path);
                Ok(settings)
            }
            None => {
                log::info!("Using default settings");
                Ok(Settings::default())
            }
        }
    }

    pub fn seed_from_env() -> u64 {
        std::env::var("CATCHFALL_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEED)
    }

    /// Steer toward the object closest to the bottom
    fn autopilot(engine: &mut Engine, snapshot: &PaintSnapshot) {
        let target = snapshot
            .objects
            .iter()
            .max_by(|a, b| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|o| o.pos.x);

        engine.release(Direction::Left);
        engine.release(Direction::Right);
        if let Some(x) = target {
            let offset = x - snapshot.paddle.x;
            if offset < -AUTOPILOT_DEADZONE {
                engine.press(Direction::Left);
            } else if offset > AUTOPILOT_DEADZONE {
                engine.press(Direction::Right);
            }
        }
    }

    pub fn run(settings: Settings, seed: u64) -> Result<(), Box<dyn Error>> {
        let mut engine = Engine::builder().with_seed(seed).build();
        engine.start_game(settings)?;

        let scoreboard = engine.subscribe_state();
        let frames = engine.subscribe_frames();

        let frame_period = Duration::from_secs(1) / DEFAULT_FRAME_RATE;
        let mut last = Instant::now();

        'round: loop {
            std::thread::sleep(frame_period);
            let now = Instant::now();
            engine.advance(now - last);
            last = now;

            if frames.latest().is_some() {
                let snapshot = engine.paintable();
                autopilot(&mut engine, &snapshot);
            }

            for state in scoreboard.drain() {
                log::info!(
                    "caught {:>3} | {:>3}s left",
                    state.caught_objects,
                    state.time_remaining
                );
                if !state.running {
                    break 'round;
                }
            }
        }

        let final_state = engine.state();
        println!("{}", serde_json::to_string(&final_state)?);
        engine.dispose();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Catchfall (headless) starting...");

    let seed = session::seed_from_env();
    let result = session::load_settings(std::env::args().nth(1))
        .and_then(|settings| session::run(settings, seed));

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build drives the engine from its own frame loop
}

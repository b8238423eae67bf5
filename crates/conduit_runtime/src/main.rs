//! Conduit Runtime
//!
//! Runs the demo behaviours against the in-process host for a fixed number
//! of frames, feeding them a scripted input sequence.

mod demos;
mod settings;

use anyhow::Result;
use conduit_core::types::KeyCode;
use conduit_host::HostEngine;
use conduit_metrics::TickTimer;
use conduit_script::ScriptContext;
use glam::Vec2;
use settings::RuntimeSettings;
use std::path::PathBuf;
use std::rc::Rc;

/// Hold W for the first second, sweep the mouse, and trigger the compute
/// pass once.
fn drive_input(host: &HostEngine, tick: u32) {
    match tick {
        0 => host.press_key(KeyCode::W),
        30 => host.press_key(KeyCode::Enter),
        31 => host.release_key(KeyCode::Enter),
        60 => host.release_key(KeyCode::W),
        _ => {}
    }
    let sweep = (tick as f32 * 0.05).sin() * 200.0;
    host.set_mouse_position(Vec2::new(640.0 + sweep, 360.0 - sweep * 0.25));
}

fn main() -> Result<()> {
    let settings = match std::env::args_os().nth(1) {
        Some(path) => RuntimeSettings::load(&PathBuf::from(path))?,
        None => RuntimeSettings::default(),
    };
    tracing_subscriber::fmt()
        .with_max_level(settings.level()?)
        .init();

    tracing::info!("Conduit v{}", conduit_core::VERSION);

    let host = Rc::new(HostEngine::new(settings.host.clone()));
    let ctx = ScriptContext::new(host.clone()).with_direction_source(settings.direction_source);

    let mut scene = demos::build_scene(&host, &ctx)?;
    tracing::info!("Spawned {} scripted entities", scene.len());

    for attached in &mut scene {
        attached.behaviour.on_start(&attached.entity)?;
    }

    let mut timer = TickTimer::new(settings.ticks.max(1) as usize);
    for tick in 0..settings.ticks {
        host.advance_time(settings.fixed_delta);
        drive_input(&host, tick);

        timer.begin();
        for attached in &mut scene {
            attached.behaviour.on_fixed_update(&attached.entity)?;
            attached.behaviour.on_update(&attached.entity)?;
        }
        timer.end();

        host.end_frame();
    }

    for attached in &mut scene {
        attached.behaviour.on_destroy(&attached.entity)?;
    }
    drop(scene);

    if conduit_metrics::ENABLED {
        for (entry, count) in host.call_summary() {
            tracing::debug!("{entry}: {count}");
        }
        tracing::info!(
            "{} ticks, {} boundary calls, {:.3} ms per tick",
            timer.ticks(),
            host.total_calls(),
            timer.average_ms()
        );
    } else {
        tracing::info!("{} ticks", settings.ticks);
    }
    if host.live_buffers() > 0 {
        tracing::warn!("{} compute buffers leaked", host.live_buffers());
    }
    Ok(())
}

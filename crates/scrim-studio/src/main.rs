use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use scrim_engine::headless::{Call, HeadlessEngine, Probe};
use scrim_engine::logging::{init_logging, LoggingConfig};
use scrim_engine::resource::{PassResource, PlaneResource};
use scrim_fx::prelude::*;

const WAVE_FS: &str = "precision mediump float; uniform float uTime; void main() {}";
const BLUR_FS: &str = "precision mediump float; uniform sampler2D uRenderTexture; void main() {}";

/// One gallery card: a plane drawing into the shared "gallery" target.
fn card(index: usize, fov: f32, frames: &Rc<Cell<u32>>) -> Node {
    let frames = frames.clone();
    Node::element("figure").attr("class", "card").child(Node::plane(
        format!("card-{index}"),
        PlaneProps::new()
            .fragment_shader(WAVE_FS)
            .uniform("time", Uniform::new("uTime", UniformValue::Float(0.0)))
            .fov(fov)
            .rotation([0.0, 0.0, 0.05 * index as f32])
            .on_render(move |p: &mut dyn PlaneResource| {
                frames.set(frames.get() + 1);
                p.set_uniform("uTime", UniformValue::Float(frames.get() as f32 / 60.0));
            }),
    ))
}

fn scene(cards: usize, fov: f32, frames: &Rc<Cell<u32>>) -> Vec<Node> {
    let gallery = (0..cards).fold(
        Node::render_target(RenderTargetProps::new().unique_key("gallery").on_ready(|t| {
            println!("  [TARGET] {} ready", t.id());
        })),
        |target, i| target.child(card(i, fov, frames)),
    );
    let blur = Node::render_target(RenderTargetProps::new().unique_key("gallery")).child(
        Node::shader_pass(
            PassProps::new()
                .fragment_shader(BLUR_FS)
                .render_order(1)
                .on_ready(|p: &mut dyn PassResource| println!("  [PASS]   {} ready", p.id())),
        ),
    );
    vec![Node::element("main").child(gallery), blur, Node::text("scrim studio")]
}

fn summary(probe: &Probe) {
    let creates = probe.count(|c| {
        matches!(c, Call::CreatePlane { .. } | Call::CreateTarget { .. } | Call::CreatePass { .. })
    });
    let removes = probe.count(|c| matches!(c, Call::Remove { .. }));
    let patches = probe.calls().len() - creates - removes;
    println!();
    println!("  creates  > {creates}");
    println!("  patches  > {patches}");
    println!("  removes  > {removes}");
    println!(
        "  live     > {} plane(s), {} target(s), {} pass(es)",
        probe.live_planes().len(),
        probe.live_targets().len(),
        probe.live_passes().len(),
    );
    println!();
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║           SCRIM STUDIO v0.1            ║");
    println!("  ║   headless engine  ·  scrim-fx stage   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let frames = Rc::new(Cell::new(0));
    let mut stage = Stage::new();

    // Declared before the engine exists: everything stays pending.
    stage.render(scene(3, 50.0, &frames));
    let engine = HeadlessEngine::new();
    let probe = engine.probe();
    stage.attach_engine(Box::new(engine)).context("attaching headless engine")?;

    let target = stage
        .context()
        .render_targets()
        .find("gallery")
        .context("gallery target was not created")?;
    anyhow::ensure!(probe.live_targets().len() == 1, "keyed targets did not collapse");
    println!("  [STAGE]  gallery target {} has {} attachment(s)", target.id(), target.attachments());

    for _ in 0..3 {
        probe.run_frame();
    }
    stage.pump_events();
    println!("  [STAGE]  {} card frame(s) rendered", frames.get());

    // Same tree with a narrower lens: only the perspective is rewritten.
    probe.clear_calls();
    stage.render(scene(3, 35.0, &frames));
    log::info!("fov change issued {} engine call(s)", probe.calls().len());

    // Drop a card; the shared target stays up for the others.
    stage.render(scene(2, 35.0, &frames));
    println!("  [STAGE]  gallery target {} has {} attachment(s)", target.id(), target.attachments());

    stage.unmount();
    anyhow::ensure!(target.is_removed(), "gallery target leaked");
    summary(&probe);

    let _engine = stage.detach_engine().context("engine was not attached")?;
    Ok(())
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Headless demo of the inspector: boots the editor services, builds a small
//! scene, and drives the inspector panel for a number of frames.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_editor::inspector::{inspect_var, InspectError, InspectResult, TypedInspector, VarInfo};
use lumen_editor::lumen_core::bootstrap::{Bootstrap, Subsystem};
use lumen_editor::lumen_core::context::TypedContext;
use lumen_editor::lumen_core::reflect::MetadataAccessor;
use lumen_editor::lumen_core::Reflect;
use lumen_editor::ui::Edit;
use lumen_editor::{
    EditingManager, EditingSubsystem, HeadlessUi, InspectorPanel, InspectorSettings, ObjectRef,
    UiSurface,
};

#[derive(Parser, Debug)]
#[command(name = "lumen-editor")]
#[command(about = "Runs the inspector panel headlessly over a demo scene")]
struct Cli {
    /// Inspector settings file
    #[arg(short, long, default_value = "Inspector.toml")]
    config: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 6)]
    frames: usize,

    /// Lock the panel on this frame
    #[arg(long)]
    lock_after: Option<usize>,
}

#[derive(Reflect, Debug, Default, Clone, Copy)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Reflect, Debug)]
struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::default(),
            rotation: Vec3::default(),
            scale: Vec3 {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
        }
    }
}

const LIGHT_VERSION: u32 = 2;

#[derive(Reflect, Debug)]
struct Light {
    #[reflect(read_only)]
    version: u32,
    enabled: bool,
    #[reflect(min = 0.0, max = 10.0, tooltip = "Luminous intensity")]
    intensity: f32,
    range: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            version: LIGHT_VERSION,
            enabled: true,
            intensity: 1.0,
            range: 10.0,
        }
    }
}

#[derive(Reflect, Debug, Default)]
struct SpotLight {
    base: Light,
    #[reflect(min = 1.0, max = 90.0)]
    angle: f32,
    name: String,
}

/// Draws a [`Light`] field by field, refusing data saved by another version.
#[derive(Default)]
struct LightInspector;

impl TypedInspector<Light> for LightInspector {
    fn inspect_typed(
        &self,
        ctx: &TypedContext,
        value: &mut Light,
        info: &VarInfo,
        _meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        if value.version != LIGHT_VERSION {
            return Ok(InspectResult::Invalid);
        }
        let mut result = InspectResult::Unchanged;
        for (index, field) in value.fields().iter().enumerate() {
            let child = info.nested(field.name, field.read_only);
            if let Some(var) = value.field_mut(index) {
                result |= inspect_var(ctx, var, &child, field)?;
            }
        }
        Ok(result)
    }
}

lumen_editor::register_inspector!(LightInspector => Light);

fn scene() -> Vec<ObjectRef> {
    let stale = Light {
        version: 1,
        ..Light::default()
    };
    vec![
        ObjectRef::new(Transform::default()),
        ObjectRef::new(Light::default()),
        ObjectRef::new(SpotLight {
            angle: 30.0,
            name: "key".to_owned(),
            ..SpotLight::default()
        }),
        ObjectRef::new(stale),
    ]
}

/// Queues a plausible user edit for whatever `object` is.
fn queue_edits(ui: &mut HeadlessUi, object: &ObjectRef, frame: usize) {
    let bump = frame as f64;
    if object.is::<Transform>() {
        ui.queue_edit("Transform/position/x", Edit::Number(bump));
    } else if object.is::<Light>() {
        ui.queue_edit("Light/intensity", Edit::Number(bump));
    } else if object.is::<SpotLight>() {
        ui.queue_edit("SpotLight/base/enabled", Edit::Bool(frame % 2 == 0));
        ui.queue_edit("SpotLight/angle", Edit::Number(bump * 20.0));
    }
}

fn run(cli: &Cli, ctx: &TypedContext, panel: &mut InspectorPanel) -> Result<()> {
    let objects = scene();

    for frame in 0..cli.frames {
        let selected = objects[frame % objects.len()].clone();
        ctx.get_mut::<EditingManager>()?.select(selected.clone());

        {
            let mut surface = ctx.get_mut::<UiSurface>()?;
            let ui = surface
                .backend_mut::<HeadlessUi>()
                .context("UI surface is not headless")?;
            ui.begin_frame();
            if cli.lock_after == Some(frame) {
                ui.queue_click(lumen_editor::panel::LOCK_TOGGLE);
            }
            queue_edits(
                ui,
                panel.dispatch_target(Some(&selected)).unwrap_or(&selected),
                frame,
            );
        }

        match panel.on_frame_ui_render(ctx)? {
            Some(result) if result.is_changed() => {
                log::info!("frame {frame}: {selected:?} marked dirty ({result:?})");
            }
            Some(InspectResult::Invalid) => {
                log::warn!("frame {frame}: {selected:?} could not be inspected");
            }
            Some(_) => log::info!("frame {frame}: {selected:?} unchanged"),
            None => log::info!("frame {frame}: nothing to inspect"),
        }
        if let Some(locked) = panel.locked_object() {
            log::debug!("frame {frame}: panel locked on {locked:?}");
        }

        ctx.get_mut::<EditingManager>()?.on_frame_update();
    }
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = InspectorSettings::load(&cli.config)?;
    let mut ctx = TypedContext::new();
    ctx.add(UiSurface::new(HeadlessUi::new()))?;
    ctx.add(settings.clone())?;

    let mut bootstrap = Bootstrap::new().with(EditingSubsystem);
    bootstrap.init(&mut ctx)?;
    let mut panel = InspectorPanel::new(settings);
    panel.init(&mut ctx)?;

    log::info!(
        "Services: {}",
        ctx.service_names().collect::<Vec<_>>().join(", ")
    );
    let outcome = run(&cli, &ctx, &mut panel);

    panel.deinit(&mut ctx)?;
    bootstrap.deinit(&mut ctx)?;
    outcome
}

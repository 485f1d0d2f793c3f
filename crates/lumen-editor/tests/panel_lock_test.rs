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


use std::cell::RefMut;

use lumen_editor::lumen_core::bootstrap::{Bootstrap, Subsystem};
use lumen_editor::lumen_core::context::TypedContext;
use lumen_editor::lumen_core::Reflect;
use lumen_editor::panel::LOCK_TOGGLE;
use lumen_editor::ui::Edit;
use lumen_editor::{
    EditingManager, EditingSubsystem, HeadlessUi, InspectResult, InspectorPanel,
    InspectorRegistry, ObjectRef, UiSurface,
};

// --- DUMMY TYPES FOR THESE TESTS ---
#[derive(Reflect, Debug, Default)]
struct Mesh {
    vertices: u32,
    visible: bool,
}

#[derive(Reflect, Debug, Default)]
struct Material {
    #[reflect(min = 0.0, max = 1.0)]
    roughness: f32,
    #[reflect(read_only)]
    shader: String,
}

struct Editor {
    ctx: TypedContext,
    bootstrap: Bootstrap,
    panel: InspectorPanel,
}

impl Editor {
    fn boot() -> Self {
        let mut ctx = TypedContext::new();
        ctx.add(UiSurface::new(HeadlessUi::new())).unwrap();
        let mut bootstrap = Bootstrap::new().with(EditingSubsystem);
        bootstrap.init(&mut ctx).unwrap();
        let mut panel = InspectorPanel::default();
        panel.init(&mut ctx).unwrap();
        Self {
            ctx,
            bootstrap,
            panel,
        }
    }

    fn ui(&self) -> RefMut<'_, HeadlessUi> {
        RefMut::map(self.ctx.get_mut::<UiSurface>().unwrap(), |surface| {
            surface.backend_mut::<HeadlessUi>().unwrap()
        })
    }

    fn select(&self, object: &ObjectRef) {
        self.ctx
            .get_mut::<EditingManager>()
            .unwrap()
            .select(object.clone());
    }

    fn frame(&mut self) -> Option<InspectResult> {
        self.ui().begin_frame();
        self.panel.on_frame_ui_render(&self.ctx).unwrap()
    }

    fn shutdown(mut self) -> TypedContext {
        self.panel.deinit(&mut self.ctx).unwrap();
        self.bootstrap.deinit(&mut self.ctx).unwrap();
        self.ctx
    }
}

#[test]
fn test_lock_freezes_target_across_selection_changes() {
    // --- 1. ARRANGE ---
    let mut editor = Editor::boot();
    let mesh = ObjectRef::new(Mesh::default());
    let material = ObjectRef::new(Material::default());
    editor.select(&mesh);

    // --- 2. ACT ---
    // Lock on the mesh, then move the selection to the material.
    editor.ui().queue_click(LOCK_TOGGLE);
    editor.frame();
    editor.select(&material);
    editor.ui().queue_edit("Mesh/vertices", Edit::Number(36.0));
    let locked_result = editor.frame();

    // --- 3. ASSERT ---
    assert!(editor.panel.is_locked());
    assert_eq!(editor.panel.locked_object(), Some(&mesh));
    assert!(locked_result.is_some_and(|r| r.is_changed()));
    assert_eq!(mesh.with::<Mesh, _>(|m| m.vertices), Some(36));
    assert!(editor.ui().widget("Material").is_none());

    // Unlocking retargets to the live selection on the same frame.
    editor.ui().queue_click(LOCK_TOGGLE);
    editor.frame();
    assert!(!editor.panel.is_locked());
    assert!(editor.ui().widget("Material/roughness").is_some());
    assert!(editor.ui().widget("Mesh").is_none());

    editor.shutdown();
}

#[test]
fn test_read_only_field_is_never_edited() {
    let mut editor = Editor::boot();
    let material = ObjectRef::new(Material {
        roughness: 0.5,
        shader: "pbr".to_owned(),
    });
    editor.select(&material);
    editor
        .ui()
        .queue_edit("Material/shader", Edit::Text("unlit".to_owned()));
    editor
        .ui()
        .queue_edit("Material/roughness", Edit::Number(2.0));

    let result = editor.frame();

    assert_eq!(result, Some(InspectResult::finished()));
    assert_eq!(
        material.with::<Material, _>(|m| (m.roughness, m.shader.clone())),
        Some((1.0, "pbr".to_owned()))
    );
}

#[test]
fn test_frames_without_edits_are_unchanged() {
    let mut editor = Editor::boot();
    let mesh = ObjectRef::new(Mesh::default());
    editor.select(&mesh);
    editor.ui().queue_edit("Mesh/visible", Edit::Bool(true));

    assert!(editor.frame().is_some_and(|r| r.is_changed()));
    assert_eq!(editor.frame(), Some(InspectResult::Unchanged));
    assert_eq!(editor.frame(), Some(InspectResult::Unchanged));
}

#[test]
fn test_shutdown_removes_every_editor_service() {
    let editor = Editor::boot();
    assert!(editor.ctx.has::<InspectorRegistry>());
    assert!(editor.ctx.has::<EditingManager>());

    let ctx = editor.shutdown();

    assert!(!ctx.has::<InspectorRegistry>());
    assert!(!ctx.has::<EditingManager>());
    assert_eq!(ctx.len(), 1);
    assert!(ctx.has::<UiSurface>());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "used after the service was removed")]
fn test_stale_cached_handle_trips_debug_assertion() {
    let mut editor = Editor::boot();
    let handle = editor.ctx.get_cached::<EditingManager>().unwrap();
    editor.bootstrap.deinit(&mut editor.ctx).unwrap();

    let _ = handle.get();
}

// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! The formation editor: scene, selection sync, transitions and settings
//! behind one interface.
//!
//! The host application forwards pointer, selection, zoom and timer events
//! here and passes in its collaborators (rendering host, formation store,
//! selection state, page timeline) with each call. Anything that changes
//! formation coordinates for good ends in a single
//! `FormationStore::commit_positions` call.

use crate::animation::{CacheDebounce, CancelToken, TransitionAnimator};
use crate::canvas::{CanvasRef, PerformerDot, Scene, SceneHost};
use crate::editing::{
    ExternalSelection, HandleRef, SegmentGroup, SelectionCanvas, SelectionSet,
    SelectionSynchronizer,
};
use crate::error::Result;
use crate::model::{
    EntityId, FormationPage, FormationPoint, FormationStore, PageTimeline, PerformerId,
    PositionUpdate,
};
use crate::path::{CommandKind, KurboMeasure, Path};
use crate::settings::FieldSettings;
use anyhow::Context;
use kurbo::Point;
use std::time::Instant;

pub struct FormationEditor {
    scene: Scene,
    sync: SelectionSynchronizer,
    animator: TransitionAnimator,
    debounce: CacheDebounce,
    measure: KurboMeasure,
    settings: FieldSettings,
}

impl Default for FormationEditor {
    fn default() -> Self {
        Self::new(FieldSettings::default())
    }
}

impl FormationEditor {
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            scene: Scene::new(),
            sync: SelectionSynchronizer::new(),
            animator: TransitionAnimator::new(),
            debounce: CacheDebounce::new(settings.zoom_cache_delay()),
            measure: KurboMeasure::new(settings.arclen_accuracy),
            settings,
        }
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    /// Swap in new settings, rebuild performer graphics with them and
    /// redraw every placed performer
    pub fn replace_settings(&mut self, settings: FieldSettings, host: &mut dyn SceneHost) {
        self.measure = KurboMeasure::new(settings.arclen_accuracy);
        self.debounce.set_delay(settings.zoom_cache_delay());
        self.settings = settings;
        self.scene.restyle_performers(&self.settings);

        let bound: Vec<FormationPoint> = self
            .scene
            .performers()
            .filter_map(PerformerDot::bound_point)
            .collect();
        for point in bound {
            if let Err(err) =
                self.scene
                    .show_performer_at(point.performer, point.point(), &self.settings, host)
            {
                tracing::warn!("Could not redraw performer: {err}");
            }
        }
        host.request_redraw();
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn add_performer(&mut self, performer: PerformerId, label: impl Into<String>) {
        self.scene
            .add_performer(PerformerDot::new(performer, label, &self.settings));
    }

    /// Draw the performers of the current page
    pub fn render_page(&mut self, page: &FormationPage, host: &mut dyn SceneHost) -> usize {
        self.scene.render_page(page, &self.settings, host)
    }

    /// Put `performers` on a new path and distribute them along it
    pub fn create_segment_group(
        &mut self,
        performers: Vec<PerformerId>,
        path: Path,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<EntityId> {
        let group = SegmentGroup::new(performers, path);
        group.draw(host);
        let id = self.scene.add_group(group);
        tracing::info!("Created segment group {}", id.raw());
        self.redistribute(id, host, store)?;
        Ok(id)
    }

    /// Remove a path; its performers stay where they are
    pub fn remove_segment_group(&mut self, id: EntityId, host: &mut dyn SceneHost) -> Result<()> {
        self.scene.remove_group(id, host)?;
        host.request_redraw();
        Ok(())
    }

    /// Show the handles of `id` and hide those of every other group
    pub fn enable_control(&mut self, id: EntityId, host: &mut dyn SceneHost) -> Result<()> {
        self.scene.group(id)?;
        for group in self.scene.groups_mut() {
            if group.id() == id {
                group.enable_control(host);
            } else {
                group.disable_control(host);
            }
        }
        host.request_redraw();
        Ok(())
    }

    pub fn disable_control(&mut self, id: EntityId, host: &mut dyn SceneHost) -> Result<()> {
        self.scene.group_mut(id)?.disable_control(host);
        host.request_redraw();
        Ok(())
    }

    /// Live handle drag. Performers stay put until the drag is committed.
    pub fn drag_handle(
        &mut self,
        group: EntityId,
        handle: HandleRef,
        position: Point,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        self.scene
            .group_mut(group)?
            .drag_handle(handle, position, host)?;
        host.request_redraw();
        Ok(())
    }

    /// End of a handle drag: rebuild the path and redistribute
    pub fn commit_handles(
        &mut self,
        group: EntityId,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<Vec<PositionUpdate>> {
        self.scene.group_mut(group)?.commit(host)?;
        self.redistribute(group, host, store)
    }

    /// Live whole-path drag. Handles and performers follow the path.
    pub fn move_path(
        &mut self,
        group: EntityId,
        position: Point,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        let segment_group = self.scene.group_mut(group)?;
        segment_group.move_path_to(position, host);
        let delta = segment_group.offset().from_initial;
        let performers = segment_group.performers().to_vec();

        for performer in performers {
            let bound = match self.scene.performer(performer) {
                Ok(dot) => dot.bound_point(),
                Err(err) => {
                    tracing::warn!("{err}");
                    continue;
                }
            };
            if let Some(bound) = bound {
                self.scene
                    .show_performer_at(performer, bound.point() + delta, &self.settings, host)?;
            }
        }
        host.request_redraw();
        Ok(())
    }

    /// End of a whole-path drag: fold the move into the path and
    /// redistribute
    pub fn commit_move(
        &mut self,
        group: EntityId,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<Vec<PositionUpdate>> {
        self.commit_handles(group, host, store)
    }

    /// Change the kind of one command of a group's path
    pub fn update_segment(
        &mut self,
        group: EntityId,
        index: usize,
        kind: CommandKind,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<Vec<PositionUpdate>> {
        self.scene
            .group_mut(group)?
            .update_segment(index, kind, host)?;
        self.redistribute(group, host, store)
    }

    /// Replace a group's path wholesale
    pub fn set_path(
        &mut self,
        group: EntityId,
        path: Path,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<Vec<PositionUpdate>> {
        self.scene.group_mut(group)?.update_path(path, host);
        self.redistribute(group, host, store)
    }

    /// Place the group's performers along its path and commit the result
    pub fn redistribute(
        &mut self,
        group: EntityId,
        host: &mut dyn SceneHost,
        store: &mut dyn FormationStore,
    ) -> anyhow::Result<Vec<PositionUpdate>> {
        let distribution = self.scene.group(group)?.distribute(&self.measure)?;

        let mut updates = Vec::with_capacity(distribution.placements.len());
        for placement in &distribution.placements {
            let point = FormationPoint::from(*placement);
            if let Err(err) = self.scene.place_performer(point, &self.settings, host) {
                tracing::warn!("Performer not drawn after distribution: {err}");
            }
            updates.push(PositionUpdate {
                performer: point.performer,
                x: point.x,
                y: point.y,
            });
        }
        host.request_redraw();

        store
            .commit_positions(&updates)
            .with_context(|| format!("failed to commit positions for group {}", group.raw()))?;
        Ok(updates)
    }

    /// The user selected `targets` on the canvas
    pub fn select_on_canvas(
        &mut self,
        targets: Vec<CanvasRef>,
        external: &mut dyn ExternalSelection,
        host: &mut dyn SceneHost,
    ) -> bool {
        self.scene.select(targets);
        self.canvas_selection_changed(external, host)
    }

    /// Push the canvas selection to the application
    pub fn canvas_selection_changed(
        &mut self,
        external: &mut dyn ExternalSelection,
        host: &mut dyn SceneHost,
    ) -> bool {
        let active = self.scene.active_objects();
        let pushed = self.sync.canvas_changed_selection(&active, external);
        self.update_control_for_selection(host);
        host.request_redraw();
        pushed
    }

    /// Mirror the application's selection on the canvas
    pub fn external_selection_changed(
        &mut self,
        selection: &SelectionSet,
        host: &mut dyn SceneHost,
    ) -> bool {
        let changed = self
            .sync
            .external_changed_selection(selection, &mut self.scene);
        if changed {
            self.update_control_for_selection(host);
            host.request_redraw();
        }
        changed
    }

    /// Selecting performers of a group turns on that group's handles and
    /// turns off every other group's
    fn update_control_for_selection(&mut self, host: &mut dyn SceneHost) {
        let selected = self.scene.selected_performers();
        if selected.is_empty() {
            return;
        }
        for group in self.scene.groups_mut() {
            if selected.iter().any(|p| group.contains(*p)) {
                group.enable_control(host);
            } else {
                group.disable_control(host);
            }
        }
    }

    /// Start moving every performer towards the next page. Performers that
    /// are not on the canvas are skipped.
    pub fn begin_page_transition(
        &mut self,
        timeline: &dyn PageTimeline,
        now: Instant,
    ) -> Vec<CancelToken> {
        let Some(page) = timeline.next_page() else {
            tracing::debug!("No next page to transition to");
            return Vec::new();
        };

        let mut tokens = Vec::with_capacity(page.targets.len());
        for target in &page.targets {
            match self.scene.formation_of(target.performer, &self.settings) {
                Ok(from) => tokens.push(self.animator.begin_transition(
                    target.performer,
                    from,
                    target.point(),
                    page.duration,
                    now,
                )),
                Err(err) => tracing::warn!("Not animating performer: {err}"),
            }
        }
        tokens
    }

    pub fn cancel_transition(&mut self, token: CancelToken) -> bool {
        self.animator.cancel(token)
    }

    pub fn cancel_transitions(&mut self) {
        self.animator.cancel_all();
    }

    pub fn zoom(&mut self, now: Instant, host: &mut dyn SceneHost) {
        self.debounce.zoom_event(now, host);
    }

    /// Advance time-driven work. Returns the number of running transitions.
    pub fn tick(&mut self, now: Instant, host: &mut dyn SceneHost) -> usize {
        self.debounce.tick(now, host);
        self.animator.tick(now, &mut self.scene, &self.settings, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{HeadlessHost, SceneKey, SceneObject};
    use crate::editing::ClassTag;
    use crate::model::{MemoryStore, PageTransition, page_of};
    use std::time::Duration;

    #[derive(Default)]
    struct App {
        selection: SelectionSet,
    }

    impl ExternalSelection for App {
        fn current(&self) -> SelectionSet {
            self.selection.clone()
        }

        fn replace(&mut self, selection: SelectionSet) {
            self.selection = selection;
        }
    }

    struct OnePage(PageTransition);

    impl PageTimeline for OnePage {
        fn next_page(&self) -> Option<PageTransition> {
            Some(self.0.clone())
        }
    }

    fn editor_with(count: u64) -> (FormationEditor, HeadlessHost, MemoryStore) {
        let mut editor = FormationEditor::default();
        for id in 1..=count {
            editor.add_performer(PerformerId(id), format!("A{id}"));
        }
        (editor, HeadlessHost::new(), MemoryStore::new())
    }

    fn ids(count: u64) -> Vec<PerformerId> {
        (1..=count).map(PerformerId).collect()
    }

    #[test]
    fn new_group_distributes_and_commits_once() {
        let (mut editor, mut host, mut store) = editor_with(3);
        let path = Path::parse("M 0 0 L 100 0").unwrap();
        editor
            .create_segment_group(ids(3), path, &mut host, &mut store)
            .unwrap();

        assert_eq!(store.commits().len(), 1);
        let latest = store.latest();
        assert!((latest[&PerformerId(2)].x - 50.0).abs() < 1e-6);
        let drawn = editor
            .scene()
            .formation_of(PerformerId(3), editor.settings())
            .unwrap();
        assert!((drawn.x - 100.0).abs() < 1e-6);
    }

    #[test]
    fn handle_drag_redistributes_only_on_commit() {
        let (mut editor, mut host, mut store) = editor_with(3);
        let group = editor
            .create_segment_group(
                ids(3),
                Path::parse("M 0 0 L 100 0").unwrap(),
                &mut host,
                &mut store,
            )
            .unwrap();
        editor.enable_control(group, &mut host).unwrap();
        let end = editor
            .scene()
            .group(group)
            .unwrap()
            .controller()
            .find(1, 0)
            .unwrap();

        editor
            .drag_handle(group, end, Point::new(200.0, 0.0), &mut host)
            .unwrap();
        assert_eq!(store.commits().len(), 1);

        let updates = editor.commit_handles(group, &mut host, &mut store).unwrap();
        assert_eq!(store.commits().len(), 2);
        assert!((updates[1].x - 100.0).abs() < 1e-6);
        assert!((updates[2].x - 200.0).abs() < 1e-6);

        // The old reference died with the rebuild
        assert!(
            editor
                .drag_handle(group, end, Point::ZERO, &mut host)
                .is_err()
        );
    }

    #[test]
    fn whole_path_move_previews_then_commits() {
        let (mut editor, mut host, mut store) = editor_with(2);
        let group = editor
            .create_segment_group(
                ids(2),
                Path::parse("M 0 0 L 100 0").unwrap(),
                &mut host,
                &mut store,
            )
            .unwrap();

        editor
            .move_path(group, Point::new(0.0, 50.0), &mut host)
            .unwrap();
        let shown = editor
            .scene()
            .formation_of(PerformerId(2), editor.settings())
            .unwrap();
        assert!((shown - Point::new(100.0, 50.0)).hypot() < 1e-6);
        assert_eq!(store.commits().len(), 1);

        let updates = editor.commit_move(group, &mut host, &mut store).unwrap();
        assert_eq!(
            editor.scene().group(group).unwrap().path().to_svg(),
            "M 0 50 L 100 50"
        );
        assert!((updates[0].y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn selecting_a_performer_enables_its_group_only() {
        let (mut editor, mut host, mut store) = editor_with(4);
        let first = editor
            .create_segment_group(
                ids(2),
                Path::parse("M 0 0 L 100 0").unwrap(),
                &mut host,
                &mut store,
            )
            .unwrap();
        let second = editor
            .create_segment_group(
                vec![PerformerId(3), PerformerId(4)],
                Path::parse("M 0 100 L 100 100").unwrap(),
                &mut host,
                &mut store,
            )
            .unwrap();
        editor.enable_control(second, &mut host).unwrap();

        let mut app = App::default();
        assert!(editor.select_on_canvas(
            vec![CanvasRef::Performer(PerformerId(1))],
            &mut app,
            &mut host
        ));
        assert!(app.selection.contains(ClassTag::Performer, 1));
        assert!(editor.scene().group(first).unwrap().control_enabled());
        assert!(!editor.scene().group(second).unwrap().control_enabled());
    }

    #[test]
    fn external_selection_forms_canvas_group() {
        let (mut editor, mut host, mut store) = editor_with(2);
        editor
            .create_segment_group(
                ids(2),
                Path::parse("M 0 0 L 100 0").unwrap(),
                &mut host,
                &mut store,
            )
            .unwrap();
        let selection: SelectionSet = [(ClassTag::Performer, 1), (ClassTag::Performer, 2)]
            .into_iter()
            .collect();

        assert!(editor.external_selection_changed(&selection, &mut host));
        assert_eq!(editor.scene().active().members().len(), 2);
        // Same selection again changes nothing
        assert!(!editor.external_selection_changed(&selection, &mut host));
        // Formation coordinates survive the group offset
        let second = editor
            .scene()
            .formation_of(PerformerId(2), editor.settings())
            .unwrap();
        assert!((second.x - 100.0).abs() < 1e-6);
    }

    #[test]
    fn page_transition_runs_to_completion() {
        let (mut editor, mut host, _store) = editor_with(1);
        editor.render_page(&page_of([FormationPoint::new(PerformerId(1), 0.0, 0.0)]), &mut host);
        let timeline = OnePage(PageTransition {
            duration: Duration::from_secs(1),
            targets: vec![
                FormationPoint::new(PerformerId(1), 10.0, 0.0),
                FormationPoint::new(PerformerId(7), 10.0, 0.0),
            ],
        });

        let start = Instant::now();
        let tokens = editor.begin_page_transition(&timeline, start);
        assert_eq!(tokens.len(), 1);
        assert_eq!(editor.tick(start + Duration::from_secs(2), &mut host), 0);
        let landed = editor
            .scene()
            .formation_of(PerformerId(1), editor.settings())
            .unwrap();
        assert!((landed.x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn replacing_settings_moves_dots_with_the_grid_offset() {
        let (mut editor, mut host, _store) = editor_with(1);
        editor.render_page(&page_of([FormationPoint::new(PerformerId(1), 0.0, 0.0)]), &mut host);
        let before = editor
            .scene()
            .performer(PerformerId(1))
            .unwrap()
            .render_position()
            .unwrap();

        let settings = FieldSettings {
            grid_stroke_width: 3.0,
            ..FieldSettings::default()
        };
        editor.replace_settings(settings, &mut host);
        let after = editor
            .scene()
            .performer(PerformerId(1))
            .unwrap()
            .render_position()
            .unwrap();
        assert!((after.x - before.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn replacing_settings_rebuilds_graphics_and_keeps_formation_points() {
        let (mut editor, mut host, _store) = editor_with(1);
        editor.render_page(
            &page_of([FormationPoint::new(PerformerId(1), 30.0, 40.0)]),
            &mut host,
        );
        let anchor_before = editor
            .scene()
            .performer(PerformerId(1))
            .unwrap()
            .anchor_offset()
            .unwrap();

        let settings = FieldSettings {
            dot_radius: 20.0,
            ..FieldSettings::default()
        };
        editor.replace_settings(settings, &mut host);
        let dot = editor.scene().performer(PerformerId(1)).unwrap();
        assert_ne!(dot.anchor_offset().unwrap(), anchor_before);
        let formation = editor
            .scene()
            .formation_of(PerformerId(1), editor.settings())
            .unwrap();
        assert!((formation - Point::new(30.0, 40.0)).hypot() < 1e-9);
        match host.get(SceneKey::Performer(PerformerId(1))) {
            Some(SceneObject::Performer { dot_center, .. }) => {
                assert!((*dot_center - Point::new(30.5, 40.5)).hypot() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

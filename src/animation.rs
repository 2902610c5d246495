// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Page transitions and zoom-time render caching.
//!
//! `TransitionAnimator` moves performers linearly from their position on
//! one page to their position on the next. Time is supplied by the caller:
//! every `tick(now)` sets each running tween to where it should be at
//! `now`, so the animator owns no timers.
//!
//! Tweens run in formation coordinates. Each tick converts through the
//! transform that applies at that moment, so a selection that forms or
//! dissolves mid-transition does not throw the performer off its track.

use crate::canvas::{Scene, SceneHost};
use crate::model::PerformerId;
use crate::settings::FieldSettings;
use kurbo::Point;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Identifies one running transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelToken {
    performer: PerformerId,
    serial: u64,
}

impl CancelToken {
    pub fn performer(&self) -> PerformerId {
        self.performer
    }
}

#[derive(Debug, Clone)]
struct Tween {
    serial: u64,
    from: Point,
    to: Point,
    start: Instant,
    duration: Duration,
}

impl Tween {
    /// Formation position at `now` and whether the tween has finished
    fn sample(&self, now: Instant) -> (Point, bool) {
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        (self.from.lerp(self.to, t), t >= 1.0)
    }
}

/// Linear, cancelable position tweens, at most one per performer
#[derive(Debug, Default)]
pub struct TransitionAnimator {
    tweens: BTreeMap<PerformerId, Tween>,
    next_serial: u64,
}

impl TransitionAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start moving `performer` from formation point `from` to `to`.
    /// A transition already running for the performer is cancelled first.
    pub fn begin_transition(
        &mut self,
        performer: PerformerId,
        from: Point,
        to: Point,
        duration: Duration,
        now: Instant,
    ) -> CancelToken {
        if let Some(previous) = self.tweens.remove(&performer) {
            tracing::debug!(
                "Replacing transition {} for performer {performer}",
                previous.serial
            );
        }
        self.next_serial += 1;
        let serial = self.next_serial;
        self.tweens.insert(
            performer,
            Tween {
                serial,
                from,
                to,
                start: now,
                duration,
            },
        );
        CancelToken { performer, serial }
    }

    /// Stop a transition where it is. Returns false if it already ended.
    pub fn cancel(&mut self, token: CancelToken) -> bool {
        match self.tweens.get(&token.performer) {
            Some(tween) if tween.serial == token.serial => {
                self.tweens.remove(&token.performer);
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.tweens.clear();
    }

    pub fn is_running(&self, performer: PerformerId) -> bool {
        self.tweens.contains_key(&performer)
    }

    pub fn running(&self) -> usize {
        self.tweens.len()
    }

    /// Advance every transition to `now`. Finished transitions are dropped.
    /// Returns the number still running.
    pub fn tick(
        &mut self,
        now: Instant,
        scene: &mut Scene,
        settings: &FieldSettings,
        host: &mut dyn SceneHost,
    ) -> usize {
        if self.tweens.is_empty() {
            return 0;
        }
        let mut finished = Vec::new();
        for (performer, tween) in &self.tweens {
            let (position, done) = tween.sample(now);
            if let Err(err) = scene.show_performer_at(*performer, position, settings, host) {
                tracing::warn!("Dropping transition: {err}");
                finished.push(*performer);
                continue;
            }
            if done {
                finished.push(*performer);
            }
        }
        for performer in finished {
            self.tweens.remove(&performer);
        }
        host.request_redraw();
        self.tweens.len()
    }
}

/// Turns render caching off again a fixed time after the last zoom event.
///
/// Caching the static field layer keeps zooming fast at the cost of a
/// blurry field; once zooming stops the layer is redrawn sharp.
#[derive(Debug, Clone)]
pub struct CacheDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl CacheDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// A zoom happened at `now`; restarts the delay
    pub fn zoom_event(&mut self, now: Instant, host: &mut dyn SceneHost) {
        if self.deadline.is_none() {
            host.set_render_caching(true);
        }
        self.deadline = Some(now + self.delay);
    }

    /// Returns true when the delay expired on this tick
    pub fn tick(&mut self, now: Instant, host: &mut dyn SceneHost) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                host.set_render_caching(false);
                host.request_redraw();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasRef, HeadlessHost, PerformerDot};
    use crate::model::FormationPoint;

    fn setup() -> (Scene, FieldSettings, HeadlessHost) {
        let settings = FieldSettings::default();
        let mut scene = Scene::new();
        let mut host = HeadlessHost::new();
        scene.add_performer(PerformerDot::new(PerformerId(1), "A1", &settings));
        scene
            .place_performer(FormationPoint::new(PerformerId(1), 0.0, 0.0), &settings, &mut host)
            .unwrap();
        (scene, settings, host)
    }

    #[test]
    fn tween_moves_linearly_and_finishes() {
        let (mut scene, settings, mut host) = setup();
        let mut animator = TransitionAnimator::new();
        let start = Instant::now();
        animator.begin_transition(
            PerformerId(1),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Duration::from_secs(2),
            start,
        );

        assert_eq!(
            animator.tick(start + Duration::from_secs(1), &mut scene, &settings, &mut host),
            1
        );
        let halfway = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((halfway.x - 50.0).abs() < 1e-6);

        assert_eq!(
            animator.tick(start + Duration::from_secs(3), &mut scene, &settings, &mut host),
            0
        );
        let end = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((end.x - 100.0).abs() < 1e-6);
        assert!(!animator.is_running(PerformerId(1)));
    }

    #[test]
    fn cancel_stops_without_snapping() {
        let (mut scene, settings, mut host) = setup();
        let mut animator = TransitionAnimator::new();
        let start = Instant::now();
        let token = animator.begin_transition(
            PerformerId(1),
            Point::ZERO,
            Point::new(0.0, 80.0),
            Duration::from_secs(4),
            start,
        );
        animator.tick(start + Duration::from_secs(1), &mut scene, &settings, &mut host);
        assert!(animator.cancel(token));
        assert!(!animator.cancel(token));

        animator.tick(start + Duration::from_secs(4), &mut scene, &settings, &mut host);
        let stopped = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((stopped.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn new_transition_replaces_running_one() {
        let mut animator = TransitionAnimator::new();
        let now = Instant::now();
        let first = animator.begin_transition(
            PerformerId(1),
            Point::ZERO,
            Point::new(1.0, 0.0),
            Duration::from_secs(1),
            now,
        );
        let second = animator.begin_transition(
            PerformerId(1),
            Point::ZERO,
            Point::new(2.0, 0.0),
            Duration::from_secs(1),
            now,
        );
        assert_eq!(animator.running(), 1);
        assert!(!animator.cancel(first));
        assert!(animator.cancel(second));
    }

    #[test]
    fn zero_duration_lands_immediately() {
        let (mut scene, settings, mut host) = setup();
        let mut animator = TransitionAnimator::new();
        let now = Instant::now();
        animator.begin_transition(
            PerformerId(1),
            Point::ZERO,
            Point::new(5.0, 5.0),
            Duration::ZERO,
            now,
        );
        assert_eq!(animator.tick(now, &mut scene, &settings, &mut host), 0);
        let landed = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((landed - Point::new(5.0, 5.0)).hypot() < 1e-6);
    }

    #[test]
    fn tween_stays_on_track_when_selection_regroups() {
        let (mut scene, settings, mut host) = setup();
        scene.add_performer(PerformerDot::new(PerformerId(2), "A2", &settings));
        scene
            .place_performer(FormationPoint::new(PerformerId(2), 40.0, 40.0), &settings, &mut host)
            .unwrap();
        let mut animator = TransitionAnimator::new();
        let start = Instant::now();
        animator.begin_transition(
            PerformerId(1),
            Point::ZERO,
            Point::new(100.0, 0.0),
            Duration::from_secs(2),
            start,
        );
        animator.tick(start + Duration::from_secs(1), &mut scene, &settings, &mut host);

        scene.select(vec![
            CanvasRef::Performer(PerformerId(1)),
            CanvasRef::Performer(PerformerId(2)),
        ]);
        animator.tick(start + Duration::from_millis(1500), &mut scene, &settings, &mut host);
        let moving = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((moving - Point::new(75.0, 0.0)).hypot() < 1e-6);

        scene.select(Vec::new());
        animator.tick(start + Duration::from_secs(2), &mut scene, &settings, &mut host);
        let end = scene.formation_of(PerformerId(1), &settings).unwrap();
        assert!((end - Point::new(100.0, 0.0)).hypot() < 1e-6);
    }

    #[test]
    fn cache_turns_off_after_last_zoom() {
        let mut host = HeadlessHost::new();
        let mut debounce = CacheDebounce::new(Duration::from_millis(50));
        let start = Instant::now();

        debounce.zoom_event(start, &mut host);
        assert!(host.render_caching());
        debounce.zoom_event(start + Duration::from_millis(40), &mut host);

        assert!(!debounce.tick(start + Duration::from_millis(60), &mut host));
        assert!(host.render_caching());
        assert!(debounce.tick(start + Duration::from_millis(90), &mut host));
        assert!(!host.render_caching());
        assert!(!debounce.is_pending());
    }
}

//! The lifted arc between two contacts, its animated reveal and the pulse
//! that travels along it once drawn.

use std::f32::consts::PI;

use common::GeoPoint;
use glam::Vec3;
use web_time::Duration;

use crate::config::RouteConfig;
use crate::timeline::{Epoch, Timeline};
use crate::types::surface_position;

/// Build the arc from `from` to `to` as `segments + 1` points.
///
/// Points are spread evenly along the straight chord and then pushed out to
/// `radius * (1 + lift * sin(πt))`, so the path leaves and lands on the
/// surface and peaks halfway.
pub fn build_arc(from: GeoPoint, to: GeoPoint, radius: f32, segments: u32, lift: f32) -> Vec<Vec3> {
    let segments = segments.max(1);
    let start = surface_position(from, radius);
    let end = surface_position(to, radius);

    // Exactly antipodal endpoints put the chord through the centre.
    let fallback = start.any_orthonormal_vector();

    (0..=segments)
        .map(|step| {
            let t = step as f32 / segments as f32;
            let height = radius * (1. + lift * (PI * t).sin());

            start
                .lerp(end, t)
                .try_normalize()
                .unwrap_or(fallback)
                * height
        })
        .collect()
}

/// The part of `arc` drawn so far.
///
/// All points up to `progress` along the arc, plus an interpolated "pen" point
/// when `progress` falls between two of them. At 0 this is the first point,
/// at 1 the whole arc.
pub fn revealed_prefix(arc: &[Vec3], progress: f32) -> Vec<Vec3> {
    let Some(&first) = arc.first() else {
        return Vec::new();
    };

    let progress = if progress.is_nan() { 0. } else { progress };

    if progress <= 0. {
        return vec![first];
    }
    if progress >= 1. {
        return arc.to_vec();
    }

    let position = progress * (arc.len() - 1) as f32;
    let whole = (position.floor() as usize).min(arc.len() - 1);
    let fraction = position - whole as f32;

    let mut prefix = arc[..=whole].to_vec();
    if fraction > 0. && whole + 1 < arc.len() {
        prefix.push(arc[whole].lerp(arc[whole + 1], fraction));
    }

    prefix
}

/// Point `fraction` of the way along `arc`, by point index.
pub fn sample_arc(arc: &[Vec3], fraction: f32) -> Option<Vec3> {
    let last = arc.len().checked_sub(1)?;
    let position = fraction.clamp(0., 1.) * last as f32;
    let whole = (position.floor() as usize).min(last);

    if whole == last {
        return Some(arc[last]);
    }

    Some(arc[whole].lerp(arc[whole + 1], position - whole as f32))
}

#[derive(Debug, Clone, PartialEq)]
struct RouteKey {
    from: [u32; 2],
    to: [u32; 2],
    radius: u32,
    segments: u32,
    lift: u32,
}

impl RouteKey {
    fn new(from: GeoPoint, to: GeoPoint, radius: f32, segments: u32, lift: f32) -> Self {
        Self {
            from: [from.lat.to_bits(), from.lon.to_bits()],
            to: [to.lat.to_bits(), to.lon.to_bits()],
            radius: radius.to_bits(),
            segments,
            lift: lift.to_bits(),
        }
    }
}

/// Holds the last built arc and rebuilds only when its inputs change.
#[derive(Debug, Default)]
pub struct RouteCache {
    key: Option<RouteKey>,
    arc: Vec<Vec3>,
    builds: usize,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, from: GeoPoint, to: GeoPoint, radius: f32, config: &RouteConfig) -> &[Vec3] {
        let key = RouteKey::new(from, to, radius, config.segments, config.lift_factor);

        if self.key.as_ref() != Some(&key) {
            log::debug!("Building route arc {from:?} -> {to:?}");
            self.arc = build_arc(from, to, radius, config.segments, config.lift_factor);
            self.key = Some(key);
            self.builds += 1;
        }

        &self.arc
    }

    /// Last built arc, if any.
    pub fn arc(&self) -> Option<&[Vec3]> {
        self.key.as_ref().map(|_| self.arc.as_slice())
    }

    pub fn builds(&self) -> usize {
        self.builds
    }
}

/// Ticket for one reveal run; completions carrying an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket(Epoch);

/// Animates reveal progress from 0 to 1 after every focus change.
///
/// Progress follows an ease-out curve over the configured duration. The
/// final "set to 1" step is a scheduled completion tagged with the run's
/// epoch: restarting before it fires leaves it stale, so an old run can
/// never snap a newer one to fully drawn.
#[derive(Debug)]
pub struct RevealDriver {
    duration: Duration,
    epoch: Epoch,
    elapsed: Option<Duration>,
    completions: Timeline<()>,
}

impl RevealDriver {
    pub fn new(config: &RouteConfig) -> Self {
        Self {
            duration: Duration::from_secs_f32(config.reveal_seconds),
            epoch: Epoch::default(),
            elapsed: None,
            completions: Timeline::new(),
        }
    }

    /// Start a new reveal from 0, superseding any run in flight.
    pub fn restart(&mut self) -> RevealTicket {
        let epoch = self.epoch.bump();
        self.elapsed = Some(Duration::ZERO);
        self.completions.schedule(self.duration, epoch, ());

        RevealTicket(epoch)
    }

    /// Stop without finishing; a pending completion goes stale.
    pub fn cancel(&mut self) {
        if self.elapsed.take().is_some() {
            self.epoch.bump();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.elapsed.is_some()
    }

    pub fn ticket(&self) -> RevealTicket {
        RevealTicket(self.epoch)
    }

    /// Progress for this frame, or `None` when no reveal is running.
    pub fn advance(&mut self, dt: Duration) -> Option<f32> {
        let elapsed = self.elapsed.as_mut()?;
        *elapsed += dt;
        let linear = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.);

        for fired in self.completions.advance(dt) {
            if self.complete(RevealTicket(fired.epoch)) {
                return Some(1.);
            }
        }

        Some(ease_out(linear).min(1. - f32::EPSILON))
    }

    /// Finish the run named by `ticket`. Returns false for a stale ticket.
    pub fn complete(&mut self, ticket: RevealTicket) -> bool {
        if ticket.0 != self.epoch {
            log::trace!("Dropping stale reveal completion {:?}", ticket.0);
            return false;
        }

        self.elapsed = None;
        true
    }
}

fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0., 1.);
    1. - (1. - t).powi(3)
}

/// A marker looping along a finished arc.
#[derive(Debug)]
pub struct TravelingPulse {
    period: Duration,
    phase: Duration,
}

impl TravelingPulse {
    pub fn new(config: &RouteConfig) -> Self {
        Self {
            period: Duration::from_secs_f32(config.pulse_period_seconds),
            phase: Duration::ZERO,
        }
    }

    pub fn reset(&mut self) {
        self.phase = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) -> f32 {
        let period = self.period.as_nanos().max(1);
        let phase = (self.phase + dt).as_nanos() % period;
        self.phase = Duration::from_nanos(phase as u64);

        phase as f32 / period as f32
    }

    /// Position after advancing by `dt`.
    pub fn position(&mut self, arc: &[Vec3], dt: Duration) -> Option<Vec3> {
        let fraction = self.advance(dt);
        sample_arc(arc, fraction)
    }
}

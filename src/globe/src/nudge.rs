//! The nudge beam: orbs fly along the route and burst on arrival.

use glam::{Quat, Vec3};
use web_time::Duration;

use crate::config::NudgeConfig;
use crate::route::sample_arc;
use crate::timeline::{Epoch, Timeline};
use crate::types::{rotation_between, HandleAllocator, NodeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NudgePhase {
    #[default]
    Idle,
    /// Triggered, no orb has left yet.
    Charging,
    Traveling,
    /// The last orb landed; the burst is playing out.
    Arrived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Orb { index: usize },
    Flash,
    Ring { index: u32 },
}

/// A transient node of a running nudge. Removes itself once its lifetime is
/// over.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectNode {
    pub handle: NodeHandle,
    pub kind: EffectKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub opacity: f32,

    born: Duration,
    lifetime: Duration,
}

impl EffectNode {
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NudgeAction {
    Launch(usize),
    Land(usize),
    Ring(u32),
}

/// Runs one nudge at a time.
///
/// A run is started by the rising edge of the caller's flag (or by
/// [`trigger`](Self::trigger)) and ignored while an earlier run still has
/// effects on screen. All staged work goes through a [`Timeline`] tagged with
/// the run's epoch.
#[derive(Debug)]
pub struct NudgeSequencer {
    config: NudgeConfig,

    phase: NudgePhase,
    epoch: Epoch,
    timeline: Timeline<NudgeAction>,
    flag: bool,

    arc: Vec<Vec3>,
    scale: f32,
    effects: Vec<EffectNode>,
}

impl NudgeSequencer {
    pub fn new(config: &NudgeConfig) -> Self {
        Self {
            config: config.clone(),

            phase: NudgePhase::Idle,
            epoch: Epoch::default(),
            timeline: Timeline::new(),
            flag: false,

            arc: Vec::new(),
            scale: 1.,
            effects: Vec::new(),
        }
    }

    pub fn phase(&self) -> NudgePhase {
        self.phase
    }

    pub fn effects(&self) -> &[EffectNode] {
        &self.effects
    }

    /// Whether a run is in flight or still has effects on screen.
    pub fn is_active(&self) -> bool {
        self.phase != NudgePhase::Idle || !self.effects.is_empty()
    }

    /// Feed the caller's flag; a false to true transition triggers a run.
    pub fn observe(&mut self, flag: bool, arc: Option<&[Vec3]>, scale: f32) -> bool {
        let rising = flag && !self.flag;
        self.flag = flag;

        if !rising {
            return false;
        }

        match arc {
            Some(arc) => self.trigger(arc, scale),
            None => {
                log::debug!("Nudge ignored: no route to travel along");
                false
            }
        }
    }

    /// Start a run along `arc`. Returns false when one is already running or
    /// the arc is too short to travel.
    pub fn trigger(&mut self, arc: &[Vec3], scale: f32) -> bool {
        if self.is_active() {
            log::debug!("Nudge ignored: previous run still in flight");
            return false;
        }

        if arc.len() < 2 {
            log::debug!("Nudge ignored: route has {} points", arc.len());
            return false;
        }

        let epoch = self.epoch.bump();
        self.arc = arc.to_vec();
        self.scale = scale;

        for (index, offset) in self.config.orb_launch_seconds.iter().enumerate() {
            let delay = Duration::from_secs_f32(offset.max(0.));
            self.timeline.schedule(delay, epoch, NudgeAction::Launch(index));
        }

        self.set_phase(NudgePhase::Charging);
        true
    }

    /// Run the clock forward. Returns the handles of effects that ended.
    pub fn advance(&mut self, dt: Duration, handles: &mut HandleAllocator) -> Vec<NodeHandle> {
        // Actions may schedule follow-ups that are already due.
        let mut fired = self.timeline.advance(dt);
        while !fired.is_empty() {
            for action in fired {
                if action.epoch != self.epoch {
                    log::trace!("Dropping stale nudge action {:?}", action.action);
                    continue;
                }

                self.apply(action.action, action.at, handles);
            }

            fired = self.timeline.advance(Duration::ZERO);
        }

        let now = self.timeline.now();
        let mut removed = Vec::new();

        self.effects.retain(|effect| {
            let alive = now - effect.born < effect.lifetime;
            if !alive {
                removed.push(effect.handle);
            }
            alive
        });

        for effect in &mut self.effects {
            let age = (now - effect.born).as_secs_f32() / effect.lifetime.as_secs_f32();
            animate(&self.config, &self.arc, self.scale, effect, age);
        }

        if self.phase == NudgePhase::Arrived && self.effects.is_empty() && self.timeline.is_idle() {
            self.set_phase(NudgePhase::Idle);
        }

        removed
    }

    fn apply(&mut self, action: NudgeAction, at: Duration, handles: &mut HandleAllocator) {
        let travel = Duration::from_secs_f32(self.config.orb_travel_seconds);

        match action {
            NudgeAction::Launch(index) => {
                let Some(start) = self.arc.first().copied() else {
                    return;
                };

                self.spawn(handles, EffectKind::Orb { index }, start, Quat::IDENTITY, at, travel);
                self.timeline.schedule_at(at + travel, self.epoch, NudgeAction::Land(index));

                if self.phase == NudgePhase::Charging {
                    self.set_phase(NudgePhase::Traveling);
                }
            }
            NudgeAction::Land(index) => {
                if index + 1 != self.config.orb_launch_seconds.len() {
                    return;
                }

                let Some(arrival) = self.arc.last().copied() else {
                    return;
                };

                let flash = Duration::from_secs_f32(self.config.flash_seconds);
                self.spawn(handles, EffectKind::Flash, arrival, Quat::IDENTITY, at, flash);

                let stagger = Duration::from_secs_f32(self.config.ring_stagger_seconds);
                for ring in 0..self.config.ring_count {
                    self.timeline
                        .schedule_at(at + stagger * ring, self.epoch, NudgeAction::Ring(ring));
                }

                self.set_phase(NudgePhase::Arrived);
            }
            NudgeAction::Ring(index) => {
                let Some(arrival) = self.arc.last().copied() else {
                    return;
                };

                let rotation = rotation_between(Vec3::Y, arrival);
                let lifetime = Duration::from_secs_f32(self.config.ring_seconds);
                self.spawn(handles, EffectKind::Ring { index }, arrival, rotation, at, lifetime);
            }
        }
    }

    fn spawn(
        &mut self,
        handles: &mut HandleAllocator,
        kind: EffectKind,
        position: Vec3,
        rotation: Quat,
        born: Duration,
        lifetime: Duration,
    ) {
        self.effects.push(EffectNode {
            handle: handles.allocate(),
            kind,
            position,
            rotation,
            scale: 0.,
            opacity: 0.,

            born,
            lifetime,
        });
    }

    fn set_phase(&mut self, phase: NudgePhase) {
        if self.phase != phase {
            log::debug!("Nudge {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0., 1.);
    t * t * (3. - 2. * t)
}

/// Pose an effect `age` (0 to 1) of the way through its lifetime.
fn animate(config: &NudgeConfig, arc: &[Vec3], scale: f32, effect: &mut EffectNode, age: f32) {
    match effect.kind {
        EffectKind::Orb { index } => {
            if let Some(position) = sample_arc(arc, smoothstep(age)) {
                effect.position = position;
            }

            let orbs = config.orb_launch_seconds.len().max(1) as f32;
            effect.scale = config.orb_base_size * (1. + config.orb_growth * index as f32) * scale;
            effect.opacity = 0.6 + 0.4 * (index + 1) as f32 / orbs;
        }
        EffectKind::Flash => {
            effect.scale = config.orb_base_size * 4. * (1. + age) * scale;
            effect.opacity = 1. - age;
        }
        EffectKind::Ring { .. } => {
            effect.scale = config.ring_radius * age * scale;
            effect.opacity = 1. - age;
        }
    }
}

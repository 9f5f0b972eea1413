//! Enemy behavior: idle, chasing, attacking, dead
//!
//! Navigation is a straight-line stand-in; a host with a nav mesh reads
//! [`EnemyContext::nav_destination`] and moves the enemy itself.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use super::system::{FsmState, FsmSystem, StateId};
use crate::combat::{popup_text, DamageableEntity, OffensiveEntity};
use crate::core::config::ForgeConfig;
use crate::core::scheduler::Scheduler;
use crate::events::{AnimationTrigger, ForgeEvent, SoundCue};
use crate::scene::Pose;
use crate::stats::{FloatStat, ModifierName};

pub const START_CHASING: &str = "StartChasing";
pub const START_ATTACKING: &str = "StartAttacking";

/// Tags of things that can hurt an enemy
const VALID_HIT_TAGS: [&str; 2] = ["Projectile", "Tool"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EnemyState {
    Idle,
    Chasing,
    Attacking,
    Dead,
}

impl EnemyState {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyState::Idle => "Idle",
            EnemyState::Chasing => "Chasing",
            EnemyState::Attacking => "Attacking",
            EnemyState::Dead => "Dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTask {
    AttackReady,
    /// The attack animation reached the hit frame
    DealDamage,
    GrowlReady,
}

/// Everything the enemy states read and write
#[derive(Debug, Clone)]
pub struct EnemyContext {
    pub position: Vec3,
    pub rotation: Quat,
    /// Where the target is, at the enemy's own height
    pub destination: Vec3,
    /// Where the navigation agent is told to go
    pub nav_destination: Vec3,
    pub target_acquired: bool,
    pub player_dead: bool,
    pub can_attack: bool,
    reset_requested: bool,
    dt: f32,
    damage: FloatStat,
    config: ForgeConfig,
    timers: Scheduler<EnemyTask>,
    events: Vec<ForgeEvent>,
}

impl EnemyContext {
    fn distance_to_destination(&self) -> f32 {
        self.position.distance(self.destination)
    }

    fn animate(&mut self, trigger: AnimationTrigger) {
        self.events.push(ForgeEvent::Animation { trigger });
    }

    fn sound(&mut self, cue: SoundCue) {
        self.events.push(ForgeEvent::Sound {
            cue,
            at: self.position,
        });
    }

    pub fn damage(&self) -> f32 {
        self.damage.current()
    }
}

struct IdleState;

impl FsmState<EnemyContext> for IdleState {
    fn name(&self) -> &'static str {
        EnemyState::Idle.name()
    }

    fn reason(&mut self, ctx: &mut EnemyContext) -> Option<&'static str> {
        if !ctx.target_acquired || ctx.player_dead {
            return None;
        }
        if ctx.distance_to_destination() > ctx.config.chase_start_distance {
            ctx.nav_destination = ctx.destination;
            ctx.animate(AnimationTrigger::Walk);
            return Some(START_CHASING);
        }
        None
    }
}

struct ChasingState;

impl FsmState<EnemyContext> for ChasingState {
    fn name(&self) -> &'static str {
        EnemyState::Chasing.name()
    }

    fn reason(&mut self, ctx: &mut EnemyContext) -> Option<&'static str> {
        if ctx.distance_to_destination() <= ctx.config.attack_range {
            ctx.nav_destination = ctx.position;
            ctx.animate(AnimationTrigger::Idle);
            return Some(START_ATTACKING);
        }
        None
    }

    fn act(&mut self, ctx: &mut EnemyContext) {
        ctx.nav_destination = ctx.destination;
        if ctx.player_dead {
            ctx.reset_requested = true;
            ctx.animate(AnimationTrigger::Idle);
        }
    }
}

struct AttackingState;

impl FsmState<EnemyContext> for AttackingState {
    fn name(&self) -> &'static str {
        EnemyState::Attacking.name()
    }

    fn reason(&mut self, ctx: &mut EnemyContext) -> Option<&'static str> {
        if ctx.distance_to_destination() > ctx.config.attack_leave_distance {
            ctx.nav_destination = ctx.position;
            ctx.animate(AnimationTrigger::Walk);
            return Some(START_CHASING);
        }
        None
    }

    fn act(&mut self, ctx: &mut EnemyContext) {
        if ctx.can_attack {
            if ctx.player_dead {
                ctx.reset_requested = true;
                return;
            }
            ctx.can_attack = false;
            let (cooldown, delay) = (ctx.config.attack_cooldown, ctx.config.damage_delay);
            ctx.timers.schedule(cooldown, EnemyTask::AttackReady);
            ctx.timers.schedule(delay, EnemyTask::DealDamage);
            ctx.animate(AnimationTrigger::Attack);
            ctx.sound(SoundCue::EnemyAttack);
        }

        let facing = ctx.destination - ctx.position;
        if facing.length_squared() > f32::EPSILON {
            let target = Pose::looking(ctx.position, facing, Vec3::Y).rotation;
            let t = (ctx.config.turn_rate * ctx.dt).clamp(0.0, 1.0);
            ctx.rotation = ctx.rotation.slerp(target, t).normalize();
        }
    }
}

struct DeadState;

impl FsmState<EnemyContext> for DeadState {
    fn name(&self) -> &'static str {
        EnemyState::Dead.name()
    }
}

pub struct Enemy {
    fsm: FsmSystem<EnemyContext>,
    ctx: EnemyContext,
    damageable: DamageableEntity,
    idle: StateId,
    chasing: StateId,
    attacking: StateId,
    dead_state: StateId,
    dead: bool,
    can_growl: bool,
    player_position: Option<Vec3>,
    rng: ChaCha8Rng,
}

impl Enemy {
    pub fn new(position: Vec3, health: f32, damage: f32, config: &ForgeConfig, seed: u64) -> Self {
        let mut fsm = FsmSystem::new();
        let idle = fsm.add_state(Box::new(IdleState));
        let chasing = fsm.add_state(Box::new(ChasingState));
        let attacking = fsm.add_state(Box::new(AttackingState));
        let dead_state = fsm.add_state(Box::new(DeadState));

        fsm.add_transition(idle, START_CHASING, chasing);
        fsm.add_transition(chasing, START_ATTACKING, attacking);
        fsm.add_transition(attacking, START_CHASING, chasing);

        Self {
            fsm,
            ctx: EnemyContext {
                position,
                rotation: Quat::IDENTITY,
                destination: position,
                nav_destination: position,
                target_acquired: false,
                player_dead: false,
                can_attack: true,
                reset_requested: false,
                dt: 0.0,
                damage: FloatStat::new(ModifierName::Damage, damage),
                config: config.clone(),
                timers: Scheduler::new(),
                events: Vec::new(),
            },
            damageable: DamageableEntity::new(ModifierName::Health, health, &VALID_HIT_TAGS),
            idle,
            chasing,
            attacking,
            dead_state,
            dead: false,
            can_growl: true,
            player_position: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> EnemyState {
        match self.fsm.current() {
            Some(id) if id == self.chasing => EnemyState::Chasing,
            Some(id) if id == self.attacking => EnemyState::Attacking,
            Some(id) if id == self.dead_state => EnemyState::Dead,
            _ => EnemyState::Idle,
        }
    }

    fn state_id(&self, state: EnemyState) -> StateId {
        match state {
            EnemyState::Idle => self.idle,
            EnemyState::Chasing => self.chasing,
            EnemyState::Attacking => self.attacking,
            EnemyState::Dead => self.dead_state,
        }
    }

    pub fn context(&self) -> &EnemyContext {
        &self.ctx
    }

    pub fn position(&self) -> Vec3 {
        self.ctx.position
    }

    pub fn health(&self) -> &FloatStat {
        &self.damageable.health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Where the player is (`None` when there is no player) and whether
    /// they are dead
    pub fn set_player(&mut self, position: Option<Vec3>, dead: bool) {
        self.player_position = position;
        self.ctx.player_dead = dead;
    }

    /// The player entered the detection trigger
    pub fn player_detected(&mut self) {
        if self.state() == EnemyState::Idle && self.player_position.is_some() {
            self.ctx.target_acquired = true;
        }
    }

    pub fn perform_transition(&mut self, label: &str) -> bool {
        self.fsm.perform_transition(label, &mut self.ctx)
    }

    pub fn force_state(&mut self, state: EnemyState) -> bool {
        let id = self.state_id(state);
        self.fsm.force_perform_transition(id, &mut self.ctx)
    }

    /// Stop moving and go back to idle
    pub fn reset(&mut self) {
        self.ctx.reset_requested = false;
        self.ctx.nav_destination = self.ctx.position;
        self.fsm.force_perform_transition(self.idle, &mut self.ctx);
    }

    /// Advance timers, reason and act, then move. Returns the events
    /// produced this tick.
    pub fn update(&mut self, dt: f32) -> Vec<ForgeEvent> {
        self.ctx.dt = dt;

        for task in self.ctx.timers.advance(dt) {
            match task {
                EnemyTask::AttackReady => self.ctx.can_attack = true,
                EnemyTask::DealDamage => {
                    if !self.dead {
                        let amount = self.ctx.damage.current();
                        self.ctx.events.push(ForgeEvent::PlayerDamaged { amount });
                    }
                }
                EnemyTask::GrowlReady => self.can_growl = true,
            }
        }

        if self.ctx.target_acquired {
            if let Some(player) = self.player_position {
                self.ctx.destination = Vec3::new(player.x, self.ctx.position.y, player.z);
            }
        }

        if self.can_growl && !self.dead {
            self.can_growl = false;
            let delay = self.rng.gen_range(5u32..11) as f32;
            self.ctx.timers.schedule(delay, EnemyTask::GrowlReady);
            self.ctx.sound(SoundCue::EnemyGrowl);
        }

        self.fsm.update(&mut self.ctx);
        if self.ctx.reset_requested {
            self.reset();
        }

        if !self.dead {
            self.step_towards_nav_destination(dt);
        }

        std::mem::take(&mut self.ctx.events)
    }

    fn step_towards_nav_destination(&mut self, dt: f32) {
        let offset = self.ctx.nav_destination - self.ctx.position;
        let offset = Vec3::new(offset.x, 0.0, offset.z);
        let step = self.ctx.config.enemy_speed * dt.max(0.0);
        if offset.length() <= step {
            self.ctx.position.x = self.ctx.nav_destination.x;
            self.ctx.position.z = self.ctx.nav_destination.z;
        } else {
            self.ctx.position += offset.normalize() * step;
        }
    }

    /// A weapon touched the enemy. Returns the damage dealt.
    pub fn on_hit(&mut self, tag: &str, attacker: &mut OffensiveEntity, velocity: f32) -> Option<f32> {
        let damage = self.damageable.on_hit(tag, attacker, velocity)?;
        self.ctx.events.push(ForgeEvent::Popup {
            position: self.ctx.position,
            text: popup_text(damage),
        });
        for change in self.damageable.drain_changes() {
            self.on_damage_taken(change.current);
        }
        Some(damage)
    }

    fn on_damage_taken(&mut self, current: f32) {
        if self.dead {
            return;
        }

        if current.abs() <= f32::EPSILON {
            self.dead = true;
            self.ctx.nav_destination = self.ctx.position;
            self.fsm.force_perform_transition(self.dead_state, &mut self.ctx);
            self.ctx.animate(AnimationTrigger::Dead);
            self.ctx.sound(SoundCue::EnemyDeath);
            tracing::debug!(position = ?self.ctx.position, "Enemy died");
        } else {
            self.ctx.sound(SoundCue::EnemyHit);
        }

        if self.state() == EnemyState::Idle && self.player_position.is_some() {
            self.ctx.target_acquired = true;
        }
    }

    /// Events produced outside `update` (hits) not yet collected
    pub fn drain_events(&mut self) -> Vec<ForgeEvent> {
        std::mem::take(&mut self.ctx.events)
    }
}

//! Gun base: trigger handling, shooting and magazines

use glam::Vec2;
use rand::Rng;

use crate::assembly::{Reloader, TimerTask, Workshop};
use crate::core::error::Result;
use crate::core::types::ComponentId;
use crate::events::{ForgeEvent, SoundCue};
use crate::stats::{find_stat, FloatStat, ModifierName};

/// Tag an object must carry to refill a magazine
pub const AMMO_TAG: &str = "Ammo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// No engine attached, nothing happens
    NoEngine,
    /// Magazine empty; a click plays when any barrel is attached
    Empty,
    /// One projectile per shooting point
    Fired(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    WrongAmmo,
    AlreadyFull,
    Reloaded,
}

#[derive(Debug, Clone)]
pub struct GunBase {
    end_points: Vec<ComponentId>,
    engine: Option<ComponentId>,
    automatic: bool,
    /// Manual guns: trigger still held since the last shot
    too_tight: bool,
    /// Automatic guns: fire-rate cooldown elapsed
    can_shoot: bool,
    current_magazine: u32,
}

impl GunBase {
    pub fn new() -> Self {
        Self {
            end_points: Vec::new(),
            engine: None,
            automatic: false,
            too_tight: false,
            can_shoot: true,
            current_magazine: 0,
        }
    }

    pub fn end_points(&self) -> &[ComponentId] {
        &self.end_points
    }

    pub fn engine(&self) -> Option<ComponentId> {
        self.engine
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    pub fn can_shoot(&self) -> bool {
        self.can_shoot
    }

    pub fn current_magazine(&self) -> u32 {
        self.current_magazine
    }

    pub(crate) fn rearm(&mut self) {
        self.can_shoot = true;
    }

    /// Pick up barrels, an engine and reloaders from the joining cluster
    pub(crate) fn on_component_connection(
        &mut self,
        owner: ComponentId,
        workshop: &mut Workshop,
        new_members: &[ComponentId],
    ) -> Result<()> {
        for member in new_members {
            let capabilities = &workshop.component(*member)?.capabilities;
            let has_muzzle = capabilities.shooting_point.is_some();
            let engine = capabilities.engine;
            let is_reloader = capabilities.reloader.is_some();

            if has_muzzle && !self.end_points.contains(member) {
                self.end_points.push(*member);
            }
            if let Some(engine) = engine {
                self.engine = Some(*member);
                self.automatic = engine.automatic;
            }
            if is_reloader {
                workshop.component_mut(*member)?.capabilities.reloader = Some(Reloader {
                    gun_base: Some(owner),
                });
            }
        }

        tracing::debug!(
            gun = %owner,
            barrels = self.end_points.len(),
            engine = ?self.engine,
            automatic = self.automatic,
            "Gun updated"
        );
        Ok(())
    }

    pub(crate) fn update_trigger(
        &mut self,
        owner: ComponentId,
        stats: &[FloatStat],
        workshop: &mut Workshop,
        pressure: f32,
    ) -> Result<()> {
        let pull = workshop.config().trigger_pull_threshold;
        let release = workshop.config().trigger_release_threshold;

        if !self.automatic {
            if pressure > pull && !self.too_tight {
                self.shoot(owner, stats, workshop)?;
                self.too_tight = true;
            } else if pressure <= release && self.too_tight {
                self.too_tight = false;
            }
            return Ok(());
        }

        if pressure > pull && self.can_shoot {
            self.shoot(owner, stats, workshop)?;
            self.can_shoot = false;
            let fire_rate = stat_value(stats, ModifierName::FireRate);
            let delay = if fire_rate > 0.0 { 1.0 / fire_rate } else { f32::MAX };
            workshop.timers.schedule(delay, TimerTask::GunRearm(owner));
        }
        Ok(())
    }

    pub(crate) fn shoot(
        &mut self,
        owner: ComponentId,
        stats: &[FloatStat],
        workshop: &mut Workshop,
    ) -> Result<ShotOutcome> {
        if self.engine.is_none() {
            return Ok(ShotOutcome::NoEngine);
        }

        let at = workshop.world_pose(owner)?.position;
        if self.current_magazine == 0 {
            if !self.end_points.is_empty() {
                workshop.events.push(ForgeEvent::Sound {
                    cue: SoundCue::GunEmpty,
                    at,
                });
            }
            tracing::debug!(gun = %owner, "Magazine empty");
            return Ok(ShotOutcome::Empty);
        }

        let spread = accuracy_range(
            stat_value(stats, ModifierName::Accuracy),
            workshop.config().max_accuracy_spread,
        );
        let muzzle_offset = workshop.config().muzzle_offset;
        let velocity = stat_value(stats, ModifierName::Velocity);
        let damage = stat_value(stats, ModifierName::Damage);

        let mut fired = 0;
        for point in &self.end_points {
            let Some(shooting_point) = workshop.component(*point)?.capabilities.shooting_point else {
                continue;
            };
            let muzzle = workshop.scene.world_pose(shooting_point.muzzle)?;

            let jitter = random_in_unit_circle(&mut workshop.rng) * spread;
            let direction = (muzzle.forward() + muzzle.right() * jitter.x + muzzle.up() * jitter.y).normalize();
            let position = muzzle.position - direction * muzzle_offset;

            workshop.events.push(ForgeEvent::ProjectileSpawned {
                gun: owner,
                position,
                direction,
                force: direction * velocity,
                damage,
            });
            fired += 1;
        }

        if fired > 0 {
            workshop.events.push(ForgeEvent::Sound {
                cue: SoundCue::GunShot,
                at,
            });
        }
        self.current_magazine = self.current_magazine.saturating_sub(fired as u32);

        tracing::debug!(gun = %owner, fired, left = self.current_magazine, "Gun fired");
        Ok(ShotOutcome::Fired(fired))
    }

    pub(crate) fn reload(
        &mut self,
        owner: ComponentId,
        stats: &[FloatStat],
        workshop: &mut Workshop,
        tag: &str,
    ) -> Result<ReloadOutcome> {
        if tag != AMMO_TAG {
            return Ok(ReloadOutcome::WrongAmmo);
        }

        let max = stat_value(stats, ModifierName::MagazineSize).max(0.0) as u32;
        if self.current_magazine == max {
            return Ok(ReloadOutcome::AlreadyFull);
        }

        self.current_magazine = max;
        let at = workshop.world_pose(owner)?.position;
        workshop.events.push(ForgeEvent::Sound {
            cue: SoundCue::GunReload,
            at,
        });
        workshop.events.push(ForgeEvent::AmmoConsumed { gun: owner });
        Ok(ReloadOutcome::Reloaded)
    }
}

impl Default for GunBase {
    fn default() -> Self {
        Self::new()
    }
}

fn stat_value(stats: &[FloatStat], name: ModifierName) -> f32 {
    find_stat(stats, name).map_or(0.0, FloatStat::current)
}

/// Jitter radius for an accuracy in `[0, 100]`; 100 is perfectly straight
pub fn accuracy_range(accuracy: f32, max_spread: f32) -> f32 {
    (100.0 - accuracy.clamp(0.0, 100.0)) / 100.0 * max_spread
}

fn random_in_unit_circle(rng: &mut impl Rng) -> Vec2 {
    loop {
        let point = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if point.length_squared() <= 1.0 {
            return point;
        }
    }
}

impl Workshop {
    /// Pull the trigger of a gun base once, ignoring trigger thresholds
    pub fn shoot(&mut self, gun: ComponentId) -> Result<Option<ShotOutcome>> {
        if !self.base(gun).is_some_and(|base| base.is_gun()) {
            return Ok(None);
        }
        self.with_base(gun, |base, workshop| base.shoot(workshop)).map(Some)
    }

    /// An object tagged `tag` touched a reloader. `None` when the reloader
    /// is not attached to any gun.
    pub fn reload_via(&mut self, reloader: ComponentId, tag: &str) -> Result<Option<ReloadOutcome>> {
        let Some(Reloader { gun_base: Some(gun) }) = self.component(reloader)?.capabilities.reloader else {
            return Ok(None);
        };
        if !self.base(gun).is_some_and(|base| base.is_gun()) {
            return Ok(None);
        }
        self.with_base(gun, |base, workshop| base.reload(workshop, tag)).map(Some)
    }
}

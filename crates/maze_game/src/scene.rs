//! Scene host loop
//!
//! Owns every entity and component and runs them in a fixed order once per
//! step. All timers compare against the clock sampled at the top of the
//! step, and destruction requested during a step is applied at its end.

use crate::config::SceneConfig;
use glam::Vec3;
use maze_ai::{FireCommand, Turret, TurretContext};
use maze_combat::{
    Combatant, ContactDamage, DamageFlash, Health, HealthEvent, Projectile, ProjectileBody,
    StatusEffects,
};
use maze_core::{Capabilities, Capability, CapabilityRegistry, Clock, EntityId, IdAllocator};
use maze_physics::{
    ColliderDesc, ColliderWorld, CollisionLayer, CollisionMask, ContactEvent, ContactPhase,
    ContactTracker,
};
use maze_world::{
    make_rng, Coin, CoinCollector, CoinSpawner, Forest, ForestGenerator, ProximityActivator,
};
use parking_lot::Mutex;
use rand::Rng;
use rand_pcg::Pcg64;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Half-size of a turret's body
const TURRET_HALF_EXTENT: f32 = 0.5;
/// Pickup radius of a coin
const COIN_RADIUS: f32 = 0.5;

/// Game session state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Session {
    Playing,
    /// The player died at `at`
    GameOver { at: f32 },
}

impl Session {
    pub fn is_over(&self) -> bool {
        matches!(self, Session::GameOver { .. })
    }
}

/// What happened during one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Clock time after the step
    pub time: f32,
    /// Scaled step duration
    pub dt: f32,
    pub shots_fired: usize,
    pub projectile_hits: usize,
    pub projectiles_expired: usize,
    pub hazard_damage: f32,
    pub poison_damage: f32,
    pub coins_collected: u32,
    pub colliders_flipped: usize,
    /// Entities removed at the end of the step
    pub destroyed: Vec<EntityId>,
    /// Entities whose health reached zero
    pub deaths: Vec<EntityId>,
    pub game_over: bool,
}

/// Host-side spawn calls, replayed on restart
#[derive(Debug, Clone, PartialEq)]
enum SpawnRecord {
    Player(Vec3),
    Turret(Vec3),
    Hazard(Vec3, f32),
    Obstacle(Vec3, Vec3),
    Coins(Vec<Vec3>),
    Forest,
}

type HealthJournal = Arc<Mutex<Vec<(EntityId, HealthEvent)>>>;

/// A running level
pub struct Scene {
    config: SceneConfig,
    clock: Clock,
    ids: IdAllocator,
    capabilities: CapabilityRegistry,
    positions: BTreeMap<EntityId, Vec3>,
    colliders: ColliderWorld,
    contacts: ContactTracker,
    combatants: BTreeMap<EntityId, Combatant>,
    turrets: BTreeMap<EntityId, Turret>,
    projectiles: BTreeMap<EntityId, Projectile>,
    hazards: BTreeMap<EntityId, ContactDamage>,
    coins: BTreeMap<EntityId, Coin>,
    collector: CoinCollector,
    forest: Option<Forest>,
    trees: Vec<EntityId>,
    activator: ProximityActivator,
    player: Option<EntityId>,
    pending_destroy: BTreeSet<EntityId>,
    journal: HealthJournal,
    session: Session,
    rng: Pcg64,
    layout: Vec<SpawnRecord>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let rng = make_rng(config.seed);
        let activator = ProximityActivator::new(config.activation);
        Self {
            config,
            clock: Clock::new(),
            ids: IdAllocator::new(),
            capabilities: CapabilityRegistry::new(),
            positions: BTreeMap::new(),
            colliders: ColliderWorld::new(),
            contacts: ContactTracker::new(),
            combatants: BTreeMap::new(),
            turrets: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            hazards: BTreeMap::new(),
            coins: BTreeMap::new(),
            collector: CoinCollector::new(),
            forest: None,
            trees: Vec::new(),
            activator,
            player: None,
            pending_destroy: BTreeSet::new(),
            journal: Arc::new(Mutex::new(Vec::new())),
            session: Session::Playing,
            rng,
            layout: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    fn create(&mut self, position: Vec3, capabilities: impl Into<Capabilities>) -> EntityId {
        let id = self.ids.allocate();
        self.capabilities.insert(id, capabilities);
        self.positions.insert(id, position);
        id
    }

    /// Spawn the player. The first player spawned is the one turrets and
    /// tree activation track.
    pub fn spawn_player(&mut self, position: Vec3) -> EntityId {
        self.layout.push(SpawnRecord::Player(position));
        let id = self.create(position, [Capability::Player, Capability::Damageable]);

        let mut combatant = Combatant::new(self.config.player.max_health);
        if let Some(flash) = self.config.player.flash {
            combatant = combatant.with_flash(DamageFlash::new(flash));
        }
        let journal = Arc::clone(&self.journal);
        combatant.health.subscribe(move |event| journal.lock().push((id, *event)));
        self.combatants.insert(id, combatant);

        self.colliders.insert(
            id,
            ColliderDesc::ball(self.config.player.radius)
                .at(position)
                .with_layer(CollisionLayer::PLAYER)
                .dynamic(),
        );

        if self.player.is_none() {
            self.player = Some(id);
        }
        log::info!("player {} spawned at {}", id, position);
        id
    }

    /// Spawn a turret. It looks for its target right away and never again.
    pub fn spawn_turret(&mut self, position: Vec3) -> EntityId {
        self.layout.push(SpawnRecord::Turret(position));
        let id = self.create(position, Capability::Turret);

        let mut turret = Turret::new(self.config.turret, position).with_projectile(self.config.projectile);
        turret.acquire_target(&self.capabilities);
        self.turrets.insert(id, turret);

        self.colliders.insert(
            id,
            ColliderDesc::cuboid(Vec3::splat(TURRET_HALF_EXTENT))
                .at(position)
                .with_layer(CollisionLayer::ENEMIES),
        );
        id
    }

    /// Spawn a contact-damage zone
    pub fn spawn_hazard(&mut self, position: Vec3, radius: f32) -> EntityId {
        self.layout.push(SpawnRecord::Hazard(position, radius));
        let id = self.create(position, Capability::Hazard);
        self.hazards.insert(id, ContactDamage::new(self.config.hazard));
        self.colliders.insert(
            id,
            ColliderDesc::ball(radius)
                .at(position)
                .with_layer(CollisionLayer::TRIGGERS)
                .sensor(),
        );
        id
    }

    /// Spawn a solid wall or block
    pub fn spawn_obstacle(&mut self, center: Vec3, half_extents: Vec3) -> EntityId {
        self.layout.push(SpawnRecord::Obstacle(center, half_extents));
        let id = self.create(center, Capability::Obstacle);
        self.colliders.insert(
            id,
            ColliderDesc::cuboid(half_extents)
                .at(center)
                .with_layer(CollisionLayer::ENVIRONMENT),
        );
        id
    }

    /// Scatter coins over floor tiles (or the configured manual points)
    pub fn spawn_coins(&mut self, floor_tiles: &[Vec3]) -> Vec<EntityId> {
        self.layout.push(SpawnRecord::Coins(floor_tiles.to_vec()));
        let spawner = CoinSpawner::new(self.config.coins.clone()).with_coin(self.config.coin);
        let coins = spawner.spawn_coins(floor_tiles, &mut self.rng);

        coins
            .into_iter()
            .map(|coin| {
                let id = self.create(coin.position, [Capability::Coin, Capability::Collectible]);
                self.colliders.insert(
                    id,
                    ColliderDesc::ball(COIN_RADIUS)
                        .at(coin.position)
                        .with_layer(CollisionLayer::PICKUPS)
                        .sensor(),
                );
                self.coins.insert(id, coin);
                id
            })
            .collect()
    }

    /// Generate the forest, replacing any previous one. Returns the number
    /// of trees placed.
    pub fn generate_forest(&mut self) -> usize {
        self.layout.retain(|record| *record != SpawnRecord::Forest);
        self.layout.push(SpawnRecord::Forest);
        self.clear_forest();

        let mut rng = match self.config.forest.seed {
            Some(seed) => make_rng(Some(seed)),
            None => make_rng(Some(self.rng.gen())),
        };
        let generator = ForestGenerator::flat(self.config.forest.clone()).with_prefabs(self.config.trees.prefabs);
        let forest = generator.generate(&mut rng);

        let with_colliders = !self.config.forest.instanced || self.config.trees.instanced_colliders;
        if with_colliders {
            let trunks: Vec<(Vec3, f32)> = match forest.layout() {
                maze_world::ForestLayout::Instanced(instances) => {
                    instances.iter().map(|i| (i.position, i.scale)).collect()
                }
                maze_world::ForestLayout::Entities(spawns) => {
                    spawns.iter().map(|s| (s.position, s.scale)).collect()
                }
            };
            for (position, scale) in trunks {
                let id = self.create(position, [Capability::Tree, Capability::Obstacle]);
                self.colliders.insert(
                    id,
                    ColliderDesc::ball(self.config.trees.trunk_radius * scale)
                        .at(position)
                        .with_layer(CollisionLayer::FOLIAGE),
                );
                self.trees.push(id);
            }
            self.activator.schedule_collect(self.clock.now());
        }

        let count = forest.len();
        self.forest = Some(forest);
        count
    }

    fn clear_forest(&mut self) {
        for id in std::mem::take(&mut self.trees) {
            self.destroy(id);
        }
        self.activator.clear();
        self.forest = None;
    }

    fn spawn_projectile(&mut self, shot: FireCommand) -> EntityId {
        let now = self.clock.now();
        let projectile = Projectile::spawn(
            shot.projectile,
            shot.origin,
            shot.rotation,
            Some(shot.target),
            Some(shot.target_position),
            now,
        );

        let id = self.create(shot.origin, Capability::Projectile);
        let mut desc = ColliderDesc::ball(shot.projectile.radius)
            .at(shot.origin)
            .with_layer(CollisionLayer::PROJECTILES)
            .with_collides_with(
                CollisionMask::ALL
                    .without(CollisionLayer::ENEMIES)
                    .without(CollisionLayer::PROJECTILES),
            )
            .dynamic();
        if shot.projectile.body == ProjectileBody::Trigger {
            desc = desc.sensor();
        }
        self.colliders.insert(id, desc);
        self.projectiles.insert(id, projectile);
        id
    }

    // ------------------------------------------------------------------
    // Mutation from the host
    // ------------------------------------------------------------------

    /// Remove an entity and everything it owns right away.
    ///
    /// Its health listeners and status effects go with it. Projectiles
    /// chasing it keep their last heading; turrets tracking it go idle.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.ids.free(id) {
            return false;
        }

        self.capabilities.remove(id);
        self.positions.remove(&id);
        self.colliders.remove(id);
        self.contacts.forget(id);
        self.combatants.remove(&id);
        self.turrets.remove(&id);
        self.projectiles.remove(&id);
        self.hazards.remove(&id);
        self.coins.remove(&id);
        self.activator.forget(id);
        self.pending_destroy.remove(&id);
        if self.player == Some(id) {
            self.player = None;
        }
        log::debug!("destroyed {}", id);
        true
    }

    /// Move an entity (and its collider). Returns false for unknown entities.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.positions.get_mut(&id) {
            Some(current) => {
                *current = position;
                self.colliders.set_position(id, position);
                true
            }
            None => false,
        }
    }

    /// Rebuild the scene from its config and replay every spawn call
    pub fn restart(&mut self) {
        let layout = std::mem::take(&mut self.layout);
        *self = Scene::new(self.config.clone());
        for record in layout {
            match record {
                SpawnRecord::Player(position) => {
                    self.spawn_player(position);
                }
                SpawnRecord::Turret(position) => {
                    self.spawn_turret(position);
                }
                SpawnRecord::Hazard(position, radius) => {
                    self.spawn_hazard(position, radius);
                }
                SpawnRecord::Obstacle(center, half_extents) => {
                    self.spawn_obstacle(center, half_extents);
                }
                SpawnRecord::Coins(tiles) => {
                    self.spawn_coins(&tiles);
                }
                SpawnRecord::Forest => {
                    self.generate_forest();
                }
            }
        }
        log::info!("scene restarted");
    }

    // ------------------------------------------------------------------
    // Step
    // ------------------------------------------------------------------

    /// Advance the scene by `dt` seconds of real time
    pub fn step(&mut self, dt: f32) -> StepReport {
        let dt = self.clock.advance(dt);
        let now = self.clock.now();
        let mut report = StepReport {
            time: now,
            dt,
            ..Default::default()
        };

        if self.clock.is_paused() {
            report.game_over = self.session.is_over();
            return report;
        }

        // Turrets: perceive, rotate, fire
        let mut shots = Vec::new();
        for (id, turret) in &mut self.turrets {
            let mut ctx = TurretContext::new(now, dt, &self.colliders).with_owner(*id);
            ctx.target_position = turret.target().and_then(|t| self.positions.get(&t)).copied();
            if let Some(shot) = turret.step(&ctx) {
                shots.push(shot);
            }
        }
        report.shots_fired = shots.len();
        for shot in shots {
            self.spawn_projectile(shot);
        }

        // Projectiles: home, move, expire
        for (id, projectile) in &mut self.projectiles {
            let target_position = projectile.target.and_then(|t| self.positions.get(&t)).copied();
            match projectile.step(now, dt, target_position) {
                maze_combat::ProjectileStep::Expired => {
                    self.pending_destroy.insert(*id);
                    report.projectiles_expired += 1;
                }
                maze_combat::ProjectileStep::Flying => {
                    self.positions.insert(*id, projectile.position);
                }
            }
        }

        // Coins: spin and hover
        for (id, coin) in &mut self.coins {
            coin.step(now, dt);
            self.positions.insert(*id, coin.position);
        }

        // Collider sync for everything that moved on its own
        for id in self.projectiles.keys().chain(self.coins.keys()) {
            if let Some(position) = self.positions.get(id) {
                self.colliders.set_position(*id, *position);
            }
        }

        // Contacts
        for event in self.contacts.update(&self.colliders) {
            self.dispatch_contact(&event, now, &mut report);
        }

        // Status effects and hit flashes
        for combatant in self.combatants.values_mut() {
            report.poison_damage += combatant.step(now).damage_dealt;
        }

        // Tree collider activation
        if self.activator.take_due_collect(now) {
            let entries: Vec<(EntityId, Vec3)> = self
                .trees
                .iter()
                .filter_map(|id| self.positions.get(id).map(|p| (*id, *p)))
                .collect();
            self.activator.collect(entries, &mut self.colliders);
        }
        let subject = self.player.and_then(|p| self.positions.get(&p)).copied();
        report.colliders_flipped = self.activator.step(now, subject, &mut self.colliders);

        // Deferred destruction
        for id in std::mem::take(&mut self.pending_destroy) {
            if self.destroy(id) {
                report.destroyed.push(id);
            }
        }

        // Health notifications
        let events = std::mem::take(&mut *self.journal.lock());
        for (id, event) in events {
            if event != HealthEvent::Died {
                continue;
            }
            report.deaths.push(id);
            if Some(id) == self.player && !self.session.is_over() {
                self.session = Session::GameOver { at: now };
                log::info!("player died at {:.2}s, game over", now);
                if self.config.session.pause_on_death {
                    self.clock.set_time_scale(0.0);
                }
            }
        }

        report.game_over = self.session.is_over();
        report
    }

    /// Route one contact event to whichever side cares about it
    fn dispatch_contact(&mut self, event: &ContactEvent, now: f32, report: &mut StepReport) {
        for (subject, other) in [(event.a, event.b), (event.b, event.a)] {
            if self.pending_destroy.contains(&subject) || self.pending_destroy.contains(&other) {
                continue;
            }
            let other_caps = self.capabilities.get(other);

            if let Some(projectile) = self.projectiles.get_mut(&subject) {
                let outcome = projectile.on_contact(
                    event.phase,
                    event.kind,
                    other_caps,
                    self.combatants.get_mut(&other),
                    now,
                );
                if outcome.hit {
                    report.projectile_hits += 1;
                }
                if outcome.destroy {
                    self.pending_destroy.insert(subject);
                }
            } else if let Some(hazard) = self.hazards.get_mut(&subject) {
                let target = self.combatants.get_mut(&other);
                let was_alive = target.as_ref().is_some_and(|c| c.is_alive());
                let health = target.map(|c| &mut c.health);
                if let Some(dealt) = hazard.on_contact(event.phase, now, other_caps, health) {
                    report.hazard_damage += dealt;
                    if was_alive {
                        if let Some(target) = self.combatants.get_mut(&other) {
                            target.blink(now);
                        }
                    }
                }
            } else if event.phase == ContactPhase::Enter
                && Some(subject) == self.player
                && other_caps.contains(Capability::Coin)
            {
                if let Some(coin) = self.coins.get(&other) {
                    self.collector.collect(coin);
                    report.coins_collected += coin.value();
                    self.pending_destroy.insert(other);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.ids.is_alive(id)
    }

    pub fn entity_count(&self) -> usize {
        self.ids.len()
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn colliders(&self) -> &ColliderWorld {
        &self.colliders
    }

    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Mutable combat record, for host-driven damage or extra listeners
    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn health(&self, id: EntityId) -> Option<&Health> {
        self.combatants.get(&id).map(|c| &c.health)
    }

    pub fn status(&self, id: EntityId) -> Option<&StatusEffects> {
        self.combatants.get(&id).map(|c| &c.status)
    }

    pub fn turret(&self, id: EntityId) -> Option<&Turret> {
        self.turrets.get(&id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Projectiles in flight
    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &Projectile)> {
        self.projectiles.iter().map(|(id, p)| (*id, p))
    }

    pub fn coin(&self, id: EntityId) -> Option<&Coin> {
        self.coins.get(&id)
    }

    /// Coins still in the level
    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub fn coins(&self) -> &CoinCollector {
        &self.collector
    }

    pub fn coins_mut(&mut self) -> &mut CoinCollector {
        &mut self.collector
    }

    pub fn forest(&self) -> Option<&Forest> {
        self.forest.as_ref()
    }

    /// Tree entities carrying colliders
    pub fn trees(&self) -> &[EntityId] {
        &self.trees
    }

    pub fn activator(&self) -> &ProximityActivator {
        &self.activator
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("now", &self.clock.now())
            .field("entities", &self.ids.len())
            .field("session", &self.session)
            .field("projectiles", &self.projectiles.len())
            .field("coins", &self.coins.len())
            .finish()
    }
}

//! Combat-time socket gem effects and commands.
//!
//! On every entity-on-entity damage notification both combatants' equipped
//! items are scanned for socketed gems. Gems whose type fits the slot they sit
//! in fire their effects (on the wielder, the opponent, or an area around the
//! wielder) and their commands. [`dispatch_combat`] only computes what should
//! happen; the plugin system applies it.

use bevy::prelude::*;

pub mod status;

pub use status::{ActiveEffects, StatusEffect, StatusType};

use crate::config::ReferenceData;
use crate::item::ItemCategory;
use crate::player::{Equipment, Living, Player};
use crate::sockets::{gem_type_matches, CommandRunner, EffectKind, EffectTarget, SocketEffect, SocketGem};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .add_event::<SocketCommandEvent>()
            .add_event::<ParticleEvent>()
            .add_systems(
                Update,
                (dispatch_damage_events, status::tick_active_effects).chain(),
            );
    }
}

// =====================================================
// Events
// =====================================================

/// Whatever dealt the damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damager {
    Entity(Entity),
    /// A projectile counts as its shooter, when it has one
    Projectile { shooter: Option<Entity> },
}

/// Entity-on-entity damage reported by the host
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    pub damager: Damager,
    pub victim: Entity,
    /// Another handler already cancelled the damage
    pub cancelled: bool,
}

impl DamageEvent {
    pub fn new(damager: Entity, victim: Entity) -> Self {
        Self {
            damager: Damager::Entity(damager),
            victim,
            cancelled: false,
        }
    }
}

/// Command for the host's command executor
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SocketCommandEvent {
    pub runner: CommandRunner,
    /// Player the command runs as; console commands record who triggered them
    pub issuer: Entity,
    pub command: String,
}

/// Visual-only effect for the host to display on an entity
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ParticleEvent {
    pub entity: Entity,
    pub particle: String,
}

// =====================================================
// Dispatch
// =====================================================

/// What the dispatcher needs to know about the world around a fight.
pub trait CombatWorld {
    fn is_living(&self, entity: Entity) -> bool;
    /// Name when the entity is a player
    fn player_name(&self, entity: Entity) -> Option<String>;
    fn equipment(&self, entity: Entity) -> Option<&Equipment>;
    fn position(&self, entity: Entity) -> Option<Vec3>;
    /// Living entities inside the axis-aligned cube of half-width `radius`
    /// around `center`
    fn living_within(&self, center: Vec3, radius: f64) -> Vec<Entity>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectApplication {
    pub gem: String,
    pub source: Entity,
    pub recipient: Entity,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCommand {
    pub runner: CommandRunner,
    pub issuer: Entity,
    /// Player-chat commands carry their leading slash
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatReport {
    pub effects: Vec<EffectApplication>,
    pub commands: Vec<IssuedCommand>,
}

impl CombatReport {
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.commands.is_empty()
    }
}

/// One combatant's point of view
#[derive(Debug, Clone, Copy)]
struct Side {
    wielder: Entity,
    opponent: Entity,
    use_hand: bool,
    use_armor: bool,
}

/// Work out every effect and command triggered by one damage notification.
///
/// Cancelled damage, a non-living victim, a damager that does not resolve to
/// a living entity, and self-damage all produce an empty report.
pub fn dispatch_combat<W>(notice: &DamageEvent, world: &W, data: &ReferenceData) -> CombatReport
where
    W: CombatWorld + ?Sized,
{
    let mut report = CombatReport::default();
    if notice.cancelled || !world.is_living(notice.victim) {
        return report;
    }
    let attacker = match notice.damager {
        Damager::Entity(entity) | Damager::Projectile { shooter: Some(entity) } => entity,
        Damager::Projectile { shooter: None } => return report,
    };
    if !world.is_living(attacker) || attacker == notice.victim {
        return report;
    }

    let settings = &data.socketting;
    let sides = [
        Side {
            wielder: attacker,
            opponent: notice.victim,
            use_hand: settings.use_attacker_item_in_hand,
            use_armor: settings.use_attacker_armor_equipped,
        },
        Side {
            wielder: notice.victim,
            opponent: attacker,
            use_hand: settings.use_defender_item_in_hand,
            use_armor: settings.use_defender_armor_equipped,
        },
    ];
    for side in &sides {
        dispatch_side(side, world, data, &mut report);
    }

    if !report.is_empty() {
        tracing::debug!(
            ?attacker,
            victim = ?notice.victim,
            effects = report.effects.len(),
            commands = report.commands.len(),
            "socket gems triggered"
        );
    }
    report
}

/// Gems in the slots this side uses, each already checked against the slot.
fn equipped_gems<'a, W>(side: &Side, world: &W, data: &'a ReferenceData) -> Vec<&'a SocketGem>
where
    W: CombatWorld + ?Sized,
{
    let Some(equipment) = world.equipment(side.wielder) else {
        return Vec::new();
    };
    let mut gems = Vec::new();
    if side.use_armor {
        for piece in equipment.armor() {
            gems.extend(
                data.socket_gems_on(piece)
                    .into_iter()
                    .filter(|gem| gem_type_matches(gem, ItemCategory::Armor)),
            );
        }
    }
    if side.use_hand {
        if let Some(hand) = equipment.main_hand.as_ref() {
            gems.extend(
                data.socket_gems_on(hand)
                    .into_iter()
                    .filter(|gem| gem_type_matches(gem, ItemCategory::Tool)),
            );
        }
    }
    gems
}

fn dispatch_side<W>(side: &Side, world: &W, data: &ReferenceData, report: &mut CombatReport)
where
    W: CombatWorld + ?Sized,
{
    let gems = equipped_gems(side, world, data);
    if gems.is_empty() {
        return;
    }
    let wielder_name = world.player_name(side.wielder);
    let opponent_name = world.player_name(side.opponent);

    for gem in gems {
        for effect in &gem.effects {
            for recipient in recipients(effect, side, world) {
                report.effects.push(EffectApplication {
                    gem: gem.name.clone(),
                    source: side.wielder,
                    recipient,
                    kind: effect.kind.clone(),
                });
            }
        }

        // Only players run commands
        let Some(wielder) = wielder_name.as_deref() else {
            continue;
        };
        for command in &gem.commands {
            let Some(text) = command.render(wielder, opponent_name.as_deref()) else {
                tracing::trace!(gem = %gem.name, "command needs a player target");
                continue;
            };
            let command_line = match command.runner {
                CommandRunner::Console => text,
                CommandRunner::PlayerChat => format!("/{text}"),
            };
            report.commands.push(IssuedCommand {
                runner: command.runner,
                issuer: side.wielder,
                command: command_line,
            });
        }
    }
}

fn recipients<W>(effect: &SocketEffect, side: &Side, world: &W) -> Vec<Entity>
where
    W: CombatWorld + ?Sized,
{
    match effect.target {
        EffectTarget::Wielder => vec![side.wielder],
        EffectTarget::Opponent => vec![side.opponent],
        EffectTarget::Area => {
            let Some(center) = world.position(side.wielder) else {
                return Vec::new();
            };
            let mut hits: Vec<Entity> = world
                .living_within(center, effect.radius)
                .into_iter()
                .filter(|e| *e != side.wielder && (effect.affects_target || *e != side.opponent))
                .collect();
            if effect.affects_wielder {
                hits.push(side.wielder);
            }
            hits
        }
    }
}

// =====================================================
// ECS adapter
// =====================================================

pub type CombatantData = (
    Entity,
    &'static Transform,
    Option<&'static Player>,
    Option<&'static Equipment>,
);

/// [`CombatWorld`] over living entities in the bevy world
pub struct QueryCombatWorld<'q, 'w, 's> {
    pub combatants: &'q Query<'w, 's, CombatantData, With<Living>>,
}

impl CombatWorld for QueryCombatWorld<'_, '_, '_> {
    fn is_living(&self, entity: Entity) -> bool {
        self.combatants.contains(entity)
    }

    fn player_name(&self, entity: Entity) -> Option<String> {
        let (_, _, player, _) = self.combatants.get(entity).ok()?;
        player.map(|p| p.name.clone())
    }

    fn equipment(&self, entity: Entity) -> Option<&Equipment> {
        let (_, _, _, equipment) = self.combatants.get(entity).ok()?;
        equipment
    }

    fn position(&self, entity: Entity) -> Option<Vec3> {
        let (_, transform, _, _) = self.combatants.get(entity).ok()?;
        Some(transform.translation)
    }

    fn living_within(&self, center: Vec3, radius: f64) -> Vec<Entity> {
        let radius = radius as f32;
        self.combatants
            .iter()
            .filter(|(_, transform, _, _)| {
                let d = (transform.translation - center).abs();
                d.x <= radius && d.y <= radius && d.z <= radius
            })
            .map(|(entity, ..)| entity)
            .collect()
    }
}

/// System: run the dispatcher for each damage event and apply its report.
pub fn dispatch_damage_events(
    mut events: EventReader<DamageEvent>,
    combatants: Query<CombatantData, With<Living>>,
    mut effects: Query<&mut ActiveEffects>,
    data: Res<ReferenceData>,
    mut commands_out: EventWriter<SocketCommandEvent>,
    mut particles: EventWriter<ParticleEvent>,
) {
    let world = QueryCombatWorld {
        combatants: &combatants,
    };
    for event in events.read() {
        let report = dispatch_combat(event, &world, &data);

        for application in report.effects {
            match application.kind {
                EffectKind::Status {
                    status,
                    duration_ticks,
                    intensity,
                } => match effects.get_mut(application.recipient) {
                    Ok(mut active) => active.apply(
                        StatusEffect::new(status, duration_ticks, intensity).with_source(application.source),
                    ),
                    Err(_) => {
                        tracing::trace!(recipient = ?application.recipient, "no ActiveEffects component")
                    }
                },
                EffectKind::Particle { particle } => {
                    particles.send(ParticleEvent {
                        entity: application.recipient,
                        particle,
                    });
                }
            }
        }

        for issued in report.commands {
            commands_out.send(SocketCommandEvent {
                runner: issued.runner,
                issuer: issued.issuer,
                command: issued.command,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemMeta, Material};
    use crate::sockets::{GemType, SocketCommand};
    use std::collections::HashMap;

    struct Actor {
        position: Vec3,
        name: Option<String>,
        equipment: Equipment,
        living: bool,
    }

    #[derive(Default)]
    struct MockWorld {
        actors: HashMap<Entity, Actor>,
    }

    impl MockWorld {
        fn add(&mut self, id: u32, position: Vec3, name: Option<&str>) -> Entity {
            let entity = Entity::from_raw(id);
            self.actors.insert(
                entity,
                Actor {
                    position,
                    name: name.map(str::to_string),
                    equipment: Equipment::default(),
                    living: true,
                },
            );
            entity
        }

        fn equip(&mut self, entity: Entity, item: Item) {
            if let Some(actor) = self.actors.get_mut(&entity) {
                actor.equipment.equip(item);
            }
        }
    }

    impl CombatWorld for MockWorld {
        fn is_living(&self, entity: Entity) -> bool {
            self.actors.get(&entity).is_some_and(|a| a.living)
        }

        fn player_name(&self, entity: Entity) -> Option<String> {
            self.actors.get(&entity).and_then(|a| a.name.clone())
        }

        fn equipment(&self, entity: Entity) -> Option<&Equipment> {
            self.actors.get(&entity).map(|a| &a.equipment)
        }

        fn position(&self, entity: Entity) -> Option<Vec3> {
            self.actors.get(&entity).map(|a| a.position)
        }

        fn living_within(&self, center: Vec3, radius: f64) -> Vec<Entity> {
            let r = radius as f32;
            let mut found: Vec<Entity> = self
                .actors
                .iter()
                .filter(|(_, a)| {
                    let d = (a.position - center).abs();
                    a.living && d.x <= r && d.y <= r && d.z <= r
                })
                .map(|(e, _)| *e)
                .collect();
            found.sort();
            found
        }
    }

    fn burn(target: EffectTarget) -> SocketEffect {
        SocketEffect {
            target,
            radius: 0.0,
            affects_wielder: false,
            affects_target: false,
            kind: EffectKind::Status {
                status: StatusType::Burning,
                duration_ticks: 60,
                intensity: 1,
            },
        }
    }

    fn gem(name: &str, gem_type: GemType, effects: Vec<SocketEffect>) -> SocketGem {
        let mut gem = SocketGem::new(name, gem_type);
        gem.effects = effects;
        gem
    }

    fn socketed(material: &str, gem: &str) -> Item {
        Item::new(Material::new(material))
            .with_meta(ItemMeta::named("Gear").with_lore(vec![format!("§6{gem}")]))
    }

    fn recipients_of(report: &CombatReport) -> Vec<Entity> {
        report.effects.iter().map(|e| e.recipient).collect()
    }

    #[test]
    fn test_attacker_hand_gem_hits_opponent() {
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem("Ember", GemType::Tool, vec![burn(EffectTarget::Opponent)]));
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let zombie = world.add(2, Vec3::X, None);
        world.equip(ann, socketed("IRON_SWORD", "Ember"));

        let report = dispatch_combat(&DamageEvent::new(ann, zombie), &world, &data);
        assert_eq!(recipients_of(&report), vec![zombie]);
        assert_eq!(report.effects[0].source, ann);
    }

    #[test]
    fn test_slot_gating_by_gem_type() {
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem("Ember", GemType::Tool, vec![burn(EffectTarget::Wielder)]));
        data.socket_gems.push(gem("Bark", GemType::Armor, vec![burn(EffectTarget::Wielder)]));
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let bo = world.add(2, Vec3::X, Some("Bo"));
        // Tool gem in armor never fires; armor gem in armor fires for the defender
        world.equip(bo, socketed("IRON_CHESTPLATE", "Ember"));
        world.equip(bo, socketed("IRON_HELMET", "Bark"));
        // Armor gem in the attacker's hand never fires
        world.equip(ann, socketed("IRON_SWORD", "Bark"));

        let report = dispatch_combat(&DamageEvent::new(ann, bo), &world, &data);
        assert_eq!(recipients_of(&report), vec![bo]);
        assert_eq!(report.effects[0].gem, "Bark");
    }

    #[test]
    fn test_toggles_select_slots() {
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem("Any", GemType::Any, vec![burn(EffectTarget::Wielder)]));
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let bo = world.add(2, Vec3::X, Some("Bo"));
        world.equip(ann, socketed("IRON_BOOTS", "Any"));
        world.equip(bo, socketed("IRON_SWORD", "Any"));

        // Defaults: attacker hand and defender armor only
        let report = dispatch_combat(&DamageEvent::new(ann, bo), &world, &data);
        assert!(report.is_empty());

        data.socketting.use_attacker_armor_equipped = true;
        data.socketting.use_defender_item_in_hand = true;
        let report = dispatch_combat(&DamageEvent::new(ann, bo), &world, &data);
        let mut hit = recipients_of(&report);
        hit.sort();
        assert_eq!(hit, vec![ann, bo]);
    }

    #[test]
    fn test_area_excludes_opponent_and_wielder_by_default() {
        let mut area = burn(EffectTarget::Area);
        area.radius = 5.0;
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem("Nova", GemType::Tool, vec![area.clone()]));
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let target = world.add(2, Vec3::new(1.0, 0.0, 0.0), None);
        let near = world.add(3, Vec3::new(0.0, 4.0, -5.0), None);
        world.add(4, Vec3::new(0.0, 0.0, 5.5), None);
        world.equip(ann, socketed("IRON_SWORD", "Nova"));

        let report = dispatch_combat(&DamageEvent::new(ann, target), &world, &data);
        assert_eq!(recipients_of(&report), vec![near]);

        area.affects_target = true;
        area.affects_wielder = true;
        data.socket_gems[0].effects = vec![area];
        let report = dispatch_combat(&DamageEvent::new(ann, target), &world, &data);
        assert_eq!(recipients_of(&report), vec![target, near, ann]);
    }

    #[test]
    fn test_commands_render_for_players() {
        let mut gem = gem("Herald", GemType::Tool, Vec::new());
        gem.commands = vec![
            SocketCommand {
                runner: CommandRunner::Console,
                command: "say %wielder% struck %target%".to_string(),
            },
            SocketCommand {
                runner: CommandRunner::PlayerChat,
                command: "me feels mighty".to_string(),
            },
        ];
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem);
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let bo = world.add(2, Vec3::X, Some("Bo"));
        let zombie = world.add(3, Vec3::X, None);
        world.equip(ann, socketed("IRON_SWORD", "Herald"));

        let report = dispatch_combat(&DamageEvent::new(ann, bo), &world, &data);
        let lines: Vec<&str> = report.commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(lines, vec!["say Ann struck Bo", "/me feels mighty"]);

        // %target% needs a player opponent
        let report = dispatch_combat(&DamageEvent::new(ann, zombie), &world, &data);
        let lines: Vec<&str> = report.commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(lines, vec!["/me feels mighty"]);
    }

    #[test]
    fn test_non_player_wielder_issues_no_commands() {
        let mut gem = gem("Herald", GemType::Tool, vec![burn(EffectTarget::Opponent)]);
        gem.commands = vec![SocketCommand {
            runner: CommandRunner::Console,
            command: "say hi".to_string(),
        }];
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem);
        let mut world = MockWorld::default();
        let skeleton = world.add(1, Vec3::ZERO, None);
        let ann = world.add(2, Vec3::X, Some("Ann"));
        world.equip(skeleton, socketed("BOW", "Herald"));

        let report = dispatch_combat(&DamageEvent::new(skeleton, ann), &world, &data);
        assert_eq!(report.effects.len(), 1);
        assert!(report.commands.is_empty());
    }

    #[test]
    fn test_unresolvable_actors_abort() {
        let mut data = ReferenceData::default();
        data.socket_gems.push(gem("Ember", GemType::Tool, vec![burn(EffectTarget::Opponent)]));
        let mut world = MockWorld::default();
        let ann = world.add(1, Vec3::ZERO, Some("Ann"));
        let zombie = world.add(2, Vec3::X, None);
        world.equip(ann, socketed("IRON_SWORD", "Ember"));

        let orphan = DamageEvent {
            damager: Damager::Projectile { shooter: None },
            victim: zombie,
            cancelled: false,
        };
        assert!(dispatch_combat(&orphan, &world, &data).is_empty());

        let arrow = DamageEvent {
            damager: Damager::Projectile { shooter: Some(ann) },
            victim: zombie,
            cancelled: false,
        };
        assert_eq!(dispatch_combat(&arrow, &world, &data).effects.len(), 1);

        assert!(dispatch_combat(&DamageEvent::new(ann, ann), &world, &data).is_empty());

        let mut cancelled = DamageEvent::new(ann, zombie);
        cancelled.cancelled = true;
        assert!(dispatch_combat(&cancelled, &world, &data).is_empty());

        if let Some(actor) = world.actors.get_mut(&zombie) {
            actor.living = false;
        }
        assert!(dispatch_combat(&DamageEvent::new(ann, zombie), &world, &data).is_empty());
    }

    #[test]
    fn test_plugin_applies_status_and_commands() {
        let mut data = ReferenceData::default();
        let mut ember = gem("Ember", GemType::Tool, vec![burn(EffectTarget::Opponent)]);
        ember.commands = vec![SocketCommand {
            runner: CommandRunner::Console,
            command: "say %wielder%".to_string(),
        }];
        data.socket_gems.push(ember);

        let mut app = App::new();
        app.insert_resource(data).add_plugins(CombatPlugin);

        let mut equipment = Equipment::default();
        equipment.equip(socketed("IRON_SWORD", "Ember"));
        let ann = app
            .world_mut()
            .spawn((Living, Player::new("Ann"), Transform::default(), equipment))
            .id();
        let zombie = app
            .world_mut()
            .spawn((Living, Transform::from_xyz(1.0, 0.0, 0.0), ActiveEffects::default()))
            .id();

        app.world_mut().send_event(DamageEvent::new(ann, zombie));
        app.update();

        let effects = app.world().get::<ActiveEffects>(zombie).expect("effects");
        assert!(effects.has(StatusType::Burning));

        let sent = app.world().resource::<Events<SocketCommandEvent>>();
        let mut reader = sent.get_cursor();
        let commands: Vec<&SocketCommandEvent> = reader.read(sent).collect();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].command, "say Ann");
    }
}

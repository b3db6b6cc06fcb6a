//! Loads the shipped data directory and a hand-written one.

use std::path::PathBuf;

use game_content::{ContentFactory, DEFAULT_SPELL, SpellBuilder};
use game_core::{EffectKind, SpawnLocation, SpellKind, TriggerKind, plan_spawn};

fn shipped_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

#[test]
fn shipped_content_loads() {
    let bundle = ContentFactory::new(shipped_data()).load_bundle().unwrap();

    assert!(bundle.classes.get("mage").is_some());
    assert_eq!(bundle.config.relic_offer_cadence, 3);
    // Four data relics plus the four built-in ones.
    assert_eq!(bundle.relics.len(), 8);
    assert!(bundle.level("Endless").unwrap().is_endless());

    let builder = SpellBuilder::new(bundle.spells);
    for key in ["arcane_bolt", "magic_missile", "arcane_blast", "arcane_spray", "arcane_nova"] {
        assert!(builder.try_build(key).is_ok(), "{key} should build");
    }
    let modifiers: Vec<&str> = builder.catalog().modifier_names().collect();
    assert_eq!(modifiers.len(), 8);
}

#[test]
fn mage_stats_follow_the_wave_curves() {
    let bundle = ContentFactory::new(shipped_data()).load_bundle().unwrap();
    let mage = bundle.classes.resolve("mage");
    let wave3 = mage.stats_at(3).unwrap();
    assert_eq!(wave3.health, 149);
    assert_eq!(wave3.spell_power, 36);
}

#[test]
fn hand_written_directory_round_trips_through_the_factory() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, content: &str| std::fs::write(dir.path().join(name), content).unwrap();
    write("config.toml", "relic_offer_size = 2\n");
    write("classes.json", r#"{"mage": {"spellpower": 7}}"#);
    write(
        "spells.json",
        r#"{"arcane_bolt": {"damage": {"amount": 30}}, "homing": {"damage_multiplier": 0.5}}"#,
    );
    write(
        "relics.json",
        r#"[{"name": "Broken", "trigger": {"type": "on-kill"}, "effect": {"type": "gain-spellpower"}},
            {"name": "Calm", "trigger": {"type": "stand-still", "amount": "2"}, "effect": {"type": "gain-mana"}}]"#,
    );
    write("enemies.json", r#"[{"name": "zombie", "hp": 20, "speed": 5, "damage": 5}]"#);
    write(
        "levels.json",
        r#"[{"name": "Trial", "waves": 3, "spawns": [{"enemy": "zombie", "count": "wave 2 *", "location": "random blue"}]}]"#,
    );

    let bundle = ContentFactory::new(dir.path()).load_bundle().unwrap();
    assert_eq!(bundle.config.relic_offer_size, 2);

    // The malformed relic is dropped; the built-in ones follow the data ones.
    assert_eq!(bundle.relics.len(), 5);
    assert_eq!(
        bundle.relics[0].trigger,
        TriggerKind::OnStandStill { duration_secs: 2.0 }
    );
    assert_eq!(bundle.relics[0].effect, EffectKind::GainMana(5));

    let builder = SpellBuilder::new(bundle.spells.clone());
    let spell = builder.wrap(builder.build(DEFAULT_SPELL), "homing");
    assert_eq!(spell.base().kind, SpellKind::Bolt);
    assert_eq!(spell.stats().unwrap().damage.amount, 15);

    let level = bundle.level("Trial").unwrap();
    let rule = &level.spawns[0];
    let plan = plan_spawn(rule, bundle.enemy("zombie").unwrap(), 2).unwrap();
    assert_eq!(plan.total(), 4);
    assert_eq!(plan.location, SpawnLocation::RandomOf("BLUE".into()));
}

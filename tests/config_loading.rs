mod common;

use std::fs;

use common::*;
use voxel_edit::{
    ActorId, ConfigError, EditConfig, EditError, FixedQuota, Material, MaterialLedger,
    PermissionSet, QuotaResolver, RankQuota, RegionEditor, VirtualInventory, WorldId,
};

const NETHER: WorldId = WorldId(1);

const CONFIG: &str = r#"{
    "execution": { "direct_threshold": 64, "batch_size": 16, "undo_depth": 3 },
    "blacklist": ["BEDROCK", "GLOWSTONE"],
    "ranks": {
        "tiers": [{ "name": "Builder", "permission": "voxeledit.rank.builder", "block_limit": 40 }],
        "default": { "name": "Visitor", "permission": "voxeledit.rank.visitor", "block_limit": 8 }
    },
    "worlds": [{ "world": 1, "block_limit_multiplier": 0.5 }]
}"#;

#[test]
fn config_file_drives_limits_blacklist_and_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxel-edit.json");
    fs::write(&path, CONFIG).unwrap();

    let config = EditConfig::from_file(&path).unwrap();
    assert_eq!(config.execution.direct_threshold, 64);
    assert_eq!(config.execution.batch_interval_ticks, 1);
    assert!(config.blacklist.contains(Material::GLOWSTONE));
    assert!(!config.blacklist.contains(Material::BARRIER));

    let mut permissions = PermissionSet::new();
    permissions.grant(ALICE, "voxeledit.rank.builder");
    let quota = RankQuota::from_config(&config, permissions);
    assert_eq!(quota.quota_for(ALICE, OVERWORLD), 40);
    assert_eq!(quota.quota_for(ALICE, NETHER), 20);
    assert_eq!(quota.quota_for(BOB, OVERWORLD), 8);
    assert_eq!(quota.quota_for(BOB, NETHER), 4);

    let mut editor = RegionEditor::new(empty_world(), VirtualInventory::new(), quota, config);
    editor.ledger_mut().credit(BOB, Material::STONE, 100);
    assert_eq!(
        editor.execute_set(BOB, &selection((0, 0, 0), (2, 2, 0)), Material::STONE),
        Err(EditError::QuotaExceeded {
            requested: 9,
            limit: 8
        })
    );
    assert_eq!(
        editor.execute_set(BOB, &selection((0, 0, 0), (0, 0, 0)), Material::GLOWSTONE),
        Err(EditError::BlacklistedMaterial(Material::GLOWSTONE))
    );
}

#[test]
fn undo_depth_comes_from_the_config() {
    let config = EditConfig::from_json_str(CONFIG).unwrap();
    let mut editor = RegionEditor::new(
        empty_world(),
        VirtualInventory::new(),
        FixedQuota(100),
        config,
    );
    editor.ledger_mut().credit(ALICE, Material::STONE, 5);
    for x in 0..5 {
        editor
            .execute_set(ALICE, &selection((x, 0, 0), (x, 0, 0)), Material::STONE)
            .unwrap();
    }
    assert_eq!(editor.history(ALICE).map(|h| h.len()), Some(3));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = EditConfig::load_or_default(dir.path().join("absent.json")).unwrap();
    assert_eq!(config, EditConfig::default());
    assert!(matches!(
        EditConfig::from_file(dir.path().join("absent.json")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn saved_config_loads_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.json");
    let mut config = EditConfig::default();
    config.execution.scan_workers = 2;
    config.blacklist.insert(Material::WATER);
    fs::write(&path, config.to_json().unwrap()).unwrap();

    assert_eq!(EditConfig::load_or_default(&path).unwrap(), config);
}

#[test]
fn unusable_values_are_rejected() {
    for json in [
        r#"{ "execution": { "batch_size": 0 } }"#,
        r#"{ "execution": { "batch_interval_ticks": 0 } }"#,
        r#"{ "execution": { "progress_interval_percent": 0 } }"#,
        r#"{ "execution": { "max_replace_volume": 0 } }"#,
        r#"{ "worlds": [{ "world": 3, "block_limit_multiplier": -1.0 }] }"#,
    ] {
        assert!(
            matches!(EditConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
            "accepted {json}"
        );
    }
    assert!(matches!(
        EditConfig::from_json_str("{ not json"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn inventory_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    let mut editor = editor(empty_world(), config(1000, 500));
    editor.ledger_mut().credit(ALICE, Material::STONE, 10);
    editor
        .execute_set(ALICE, &selection((0, 0, 0), (3, 0, 0)), Material::STONE)
        .unwrap();
    editor.ledger().save(&path).unwrap();

    let restored = VirtualInventory::load(&path).unwrap();
    assert_eq!(restored.balance(ALICE, Material::STONE), 6);
    assert_eq!(restored.balance(ActorId(99), Material::STONE), 0);
}

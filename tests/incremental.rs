mod common;

use std::collections::BTreeMap;

use cgmath::Point3;
use common::*;
use voxel_edit::{
    BlockPattern, EditError, EditEvent, EditOutcome, ExecutionMode, FixedQuota, Material,
    MaterialLedger, RegionEditor, VirtualInventory,
};

fn stocked(editor: &mut TestEditor, amount: u64) {
    for material in [
        Material::STONE,
        Material::DIRT,
        Material::SAND,
        Material::GLASS,
        Material::OAK_PLANKS,
    ] {
        editor.ledger_mut().credit(ALICE, material, amount);
    }
}

fn completed_reports(events: &[EditEvent]) -> Vec<&voxel_edit::EditReport> {
    events
        .iter()
        .filter_map(|event| match event {
            EditEvent::Completed { report, .. } => Some(report),
            _ => None,
        })
        .collect()
}

#[test]
fn cancel_at_forty_percent_keeps_written_blocks_and_refunds_the_rest() {
    let mut editor = editor(empty_world(), config(100, 100));
    editor.ledger_mut().credit(ALICE, Material::STONE, 1000);
    let events = editor.subscribe();

    let sel = selection((0, 0, 0), (9, 9, 9));
    let outcome = editor.execute_set(ALICE, &sel, Material::STONE).unwrap();
    assert!(matches!(outcome, EditOutcome::Started { total: 1000, .. }));
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 0);

    for _ in 0..4 {
        editor.tick();
    }
    assert_eq!(editor.operation_progress(ALICE), Some((400, 1000)));

    assert!(editor.cancel(ALICE));
    assert!(!editor.cancel(ALICE));
    assert_eq!(editor.tick(), 0);

    let bounds = sel.bounds().unwrap();
    assert_eq!(count_material(&editor, bounds, Material::STONE), 400);
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 600);
    assert!(editor.history(ALICE).is_none());
    assert!(!editor.has_active_operation(ALICE));

    let events = drain(&events);
    assert!(matches!(events.first(), Some(EditEvent::Started { total: 1000, .. })));
    assert_eq!(
        events.last(),
        Some(&EditEvent::Cancelled {
            actor: ALICE,
            operation: outcome.operation(),
            written: 400,
            refunded: BTreeMap::from([(Material::STONE, 600)]),
        })
    );
    assert!(completed_reports(&events).is_empty());
}

#[test]
fn direct_and_incremental_runs_are_indistinguishable() {
    let mut direct = editor(layered_world(), config(u64::MAX, 500));
    let mut incremental = editor(layered_world(), config(0, 7));
    stocked(&mut direct, 1000);
    stocked(&mut incremental, 1000);

    let sel = selection((1, 0, 1), (8, 5, 6));
    let bounds = sel.bounds().unwrap();
    let pattern = BlockPattern::parse_lenient("glass:3,sand:2,oak_planks:1");

    type Edit = fn(&mut TestEditor, &voxel_edit::Selection, &BlockPattern) -> EditOutcome;
    let edits: [Edit; 3] = [
        |editor, sel, _| editor.execute_set(ALICE, sel, Material::STONE).unwrap(),
        |editor, sel, _| {
            editor
                .execute_replace(ALICE, sel, Material::STONE, Material::DIRT)
                .unwrap()
        },
        |editor, sel, pattern| editor.execute_set_pattern(ALICE, sel, pattern).unwrap(),
    ];

    for edit in edits {
        let outcome = edit(&mut direct, &sel, &pattern);
        let report = outcome.report().cloned().unwrap();
        assert_eq!(report.mode, ExecutionMode::Direct);

        let events = incremental.subscribe();
        let outcome = edit(&mut incremental, &sel, &pattern);
        assert!(matches!(outcome, EditOutcome::Started { .. }));
        run_to_idle(&mut incremental);
        let events = drain(&events);
        let incremental_report = completed_reports(&events)[0].clone();
        assert_eq!(incremental_report.mode, ExecutionMode::Incremental);

        assert_eq!(incremental_report.affected, report.affected);
        assert_eq!(incremental_report.skipped, report.skipped);
        assert_eq!(incremental_report.consumed, report.consumed);
        assert_eq!(incremental_report.refunded, report.refunded);
        assert_eq!(incremental_report.returned, report.returned);
        assert_eq!(snapshot(&incremental, bounds), snapshot(&direct, bounds));
        assert_eq!(
            incremental.history(ALICE).and_then(|h| h.peek()).map(captured),
            direct.history(ALICE).and_then(|h| h.peek()).map(captured),
        );
        for material in Material::ALL {
            assert_eq!(
                incremental.ledger().balance(ALICE, material),
                direct.ledger().balance(ALICE, material),
                "{material} balance diverged"
            );
        }
    }
}

#[test]
fn second_request_is_refused_while_a_job_runs() {
    let mut editor = editor(empty_world(), config(10, 10));
    editor.ledger_mut().credit(ALICE, Material::STONE, 200);
    editor
        .execute_set(ALICE, &selection((0, 0, 0), (9, 9, 0)), Material::STONE)
        .unwrap();
    editor.tick();
    let progress = editor.operation_progress(ALICE);

    assert_eq!(
        editor.execute_set(ALICE, &selection((0, 0, 1), (0, 0, 1)), Material::STONE),
        Err(EditError::OperationInProgress)
    );
    assert_eq!(editor.undo(ALICE), Err(EditError::OperationInProgress));
    assert_eq!(editor.operation_progress(ALICE), progress);
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 100);

    // other actors are not blocked
    editor.ledger_mut().credit(BOB, Material::DIRT, 1);
    assert!(editor
        .execute_set(BOB, &selection((0, 0, 2), (0, 0, 2)), Material::DIRT)
        .is_ok());
}

#[test]
fn unloading_a_chunk_mid_run_skips_its_blocks_and_refunds_them() {
    let mut editor = editor(empty_world(), config(0, 8));
    editor.ledger_mut().credit(ALICE, Material::STONE, 32);
    let events = editor.subscribe();

    let sel = selection((0, 0, 0), (31, 0, 0));
    editor.execute_set(ALICE, &sel, Material::STONE).unwrap();
    editor.tick();
    assert!(editor
        .world_mut()
        .unload_chunk(OVERWORLD, Point3::new(1, 0, 0))
        .is_some());
    run_to_idle(&mut editor);

    let events = drain(&events);
    let report = completed_reports(&events)[0];
    assert_eq!(report.affected, 16);
    assert_eq!(report.skipped, 16);
    assert_eq!(report.refunded.get(&Material::STONE), Some(&16));
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 16);
    assert_eq!(editor.history(ALICE).and_then(|h| h.peek()).map(|r| r.len()), Some(16));
}

#[test]
fn progress_is_reported_every_ten_percent() {
    let mut editor = editor(empty_world(), config(50, 10));
    editor.ledger_mut().credit(ALICE, Material::GLASS, 100);
    let events = editor.subscribe();

    editor
        .execute_set(ALICE, &selection((0, 0, 0), (9, 9, 0)), Material::GLASS)
        .unwrap();
    run_to_idle(&mut editor);

    let events = drain(&events);
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|event| match event {
            EditEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
    assert!(matches!(events.last(), Some(EditEvent::Completed { .. })));
    assert!(events.iter().all(|event| event.actor() == ALICE));
}

#[test]
fn large_regions_are_scanned_in_the_background() {
    let mut config = config(100, 250);
    config.execution.scan_workers = 1;
    let mut editor = editor(layered_world(), config);
    editor.ledger_mut().credit(ALICE, Material::GLASS, 1000);
    let events = editor.subscribe();

    let sel = selection((1, 0, 0), (10, 9, 9));
    let outcome = editor.execute_set(ALICE, &sel, Material::GLASS).unwrap();
    assert!(matches!(outcome, EditOutcome::Scanning { .. }));
    assert_eq!(editor.operation_progress(ALICE), Some((0, 1000)));
    assert_eq!(
        editor.execute_set(ALICE, &sel, Material::GLASS),
        Err(EditError::OperationInProgress)
    );

    run_to_idle(&mut editor);

    let events = drain(&events);
    assert_eq!(
        events.first(),
        Some(&EditEvent::Started {
            actor: ALICE,
            operation: outcome.operation(),
            total: 1000,
        })
    );
    let report = completed_reports(&events)[0];
    assert_eq!(report.affected, 1000);
    assert_eq!(report.mode, ExecutionMode::Incremental);
    assert_eq!(count_material(&editor, sel.bounds().unwrap(), Material::GLASS), 1000);
    assert_eq!(editor.ledger().balance(ALICE, Material::GLASS), 0);
}

#[test]
fn background_replace_fails_on_quota_without_touching_the_ledger() {
    let mut config = config(100, 250);
    config.execution.scan_workers = 1;
    let mut editor: TestEditor =
        RegionEditor::new(layered_world(), VirtualInventory::new(), FixedQuota(50), config);
    editor.ledger_mut().credit(ALICE, Material::SAND, 500);
    let events = editor.subscribe();

    let sel = selection((0, 0, 0), (9, 9, 9));
    let before = snapshot(&editor, sel.bounds().unwrap());
    let outcome = editor
        .execute_replace(ALICE, &sel, Material::DIRT, Material::SAND)
        .unwrap();
    run_to_idle(&mut editor);

    assert_eq!(
        drain(&events),
        vec![EditEvent::Failed {
            actor: ALICE,
            operation: outcome.operation(),
            error: EditError::QuotaExceeded {
                requested: 200,
                limit: 50
            },
        }]
    );
    assert_eq!(editor.ledger().balance(ALICE, Material::SAND), 500);
    assert_eq!(editor.ledger().balance(ALICE, Material::DIRT), 0);
    assert_eq!(snapshot(&editor, sel.bounds().unwrap()), before);
}

#[test]
fn cancelling_during_the_scan_never_starts_the_job() {
    let mut config = config(100, 250);
    config.execution.scan_workers = 1;
    let mut editor = editor(empty_world(), config);
    editor.ledger_mut().credit(ALICE, Material::STONE, 1000);
    let events = editor.subscribe();

    let sel = selection((0, 0, 0), (9, 9, 9));
    let outcome = editor.execute_set(ALICE, &sel, Material::STONE).unwrap();
    assert!(editor.cancel(ALICE));
    run_to_idle(&mut editor);

    assert_eq!(
        drain(&events),
        vec![EditEvent::Cancelled {
            actor: ALICE,
            operation: outcome.operation(),
            written: 0,
            refunded: BTreeMap::new(),
        }]
    );
    assert_eq!(count_material(&editor, sel.bounds().unwrap(), Material::STONE), 0);
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 1000);
}

#[test]
fn jobs_of_different_actors_interleave() {
    let mut editor = editor(empty_world(), config(10, 10));
    editor.ledger_mut().credit(ALICE, Material::STONE, 40);
    editor.ledger_mut().credit(BOB, Material::DIRT, 40);

    editor
        .execute_set(ALICE, &selection((0, 0, 0), (31, 0, 0)), Material::STONE)
        .unwrap();
    editor
        .execute_set(BOB, &selection((0, 1, 0), (31, 1, 0)), Material::DIRT)
        .unwrap();

    editor.tick();
    assert_eq!(editor.operation_progress(ALICE), Some((10, 32)));
    assert_eq!(editor.operation_progress(BOB), Some((10, 32)));
    run_to_idle(&mut editor);
    assert_eq!(editor.ledger().balance(ALICE, Material::STONE), 8);
    assert_eq!(editor.ledger().balance(BOB, Material::DIRT), 8);
}

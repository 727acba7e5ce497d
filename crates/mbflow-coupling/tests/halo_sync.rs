//! End-to-end halo synchronization through `Box<dyn BlockSolver>` lists.

use mbflow_block::BlockFields;
use mbflow_core::{Axis, BlockId, CellIndex, CouplingError, FaceEnd, March, StageTag};
use mbflow_coupling::{BlockSolver, ConnectionDescriptor, Coupling, InterBlockSynchronizer};
use mbflow_test_utils::{
    calls_for, cell_tag, numbered_fields, periodic_couplings, random_fields,
    side_by_side_couplings, RecordingSolver, SolverCall,
};
use proptest::prelude::*;

fn blocks_from(fields: Vec<BlockFields>) -> Vec<Box<dyn BlockSolver>> {
    let log = RecordingSolver::new_log();
    fields
        .into_iter()
        .enumerate()
        .map(|(k, f)| Box::new(RecordingSolver::new(format!("b{k}"), f, log.clone())) as Box<dyn BlockSolver>)
        .collect()
}

#[test]
fn two_blocks_seam_halos_match_neighbour_edges() {
    let (n, m) = (10, 10);
    let mut blocks = blocks_from(vec![numbered_fields(0, n, m), numbered_fields(1, n, m)]);
    let before: Vec<BlockFields> = blocks.iter().map(|b| b.fields().clone()).collect();
    let sync = InterBlockSynchronizer::for_blocks(side_by_side_couplings(0, 1, m), &blocks).unwrap();

    sync.synchronize(StageTag::State, &mut blocks).unwrap();

    for j in 1..=m as i32 {
        assert_eq!(
            blocks[0].fields().q[CellIndex::new(n as i32 + 1, j)],
            before[1].q[CellIndex::new(1, j)]
        );
        assert_eq!(
            blocks[1].fields().q[CellIndex::new(0, j)],
            before[0].q[CellIndex::new(n as i32, j)]
        );
    }
    for (after, before) in blocks.iter().zip(&before) {
        for c in before.interior() {
            assert_eq!(after.fields().q[c], before.q[c]);
        }
    }
    // Halos outside the seam keep their previous values.
    assert_eq!(
        blocks[0].fields().q[CellIndex::new(0, 3)],
        before[0].q[CellIndex::new(0, 3)]
    );
}

#[test]
fn reversed_march_remaps_orientation() {
    // Block 0's j-end face feeds block 1's i-start face, walking backwards.
    let owner = ConnectionDescriptor::new(BlockId(1), 1, March::Forward, Axis::I, FaceEnd::Start);
    let neighbor = ConnectionDescriptor::new(BlockId(0), 4, March::Backward, Axis::J, FaceEnd::End);
    let mut blocks = blocks_from(vec![numbered_fields(0, 4, 3), numbered_fields(1, 5, 4)]);
    let sync = InterBlockSynchronizer::for_blocks(vec![Coupling::new(owner, neighbor, 4)], &blocks).unwrap();

    sync.synchronize(StageTag::CenterVt, &mut blocks).unwrap();

    for k in 0..4 {
        let halo = CellIndex::new(0, 1 + k);
        let src = CellIndex::new(4 - k, 3);
        assert_eq!(blocks[1].fields().temp_c[halo], cell_tag(0, src));
        assert_eq!(blocks[1].fields().v_c[halo], [cell_tag(0, src), -cell_tag(0, src)]);
    }
}

#[test]
fn periodic_single_block_wraps_both_axes() {
    let (ni, nj) = (6, 4);
    let mut blocks = blocks_from(vec![numbered_fields(0, ni, nj)]);
    let sync = InterBlockSynchronizer::for_blocks(periodic_couplings(0, ni, nj), &blocks).unwrap();

    sync.synchronize(StageTag::GradientCenter, &mut blocks).unwrap();

    let f = blocks[0].fields();
    for j in 1..=nj as i32 {
        assert_eq!(f.gradient_temp_c[CellIndex::new(0, j)], [cell_tag(0, CellIndex::new(ni as i32, j)), -cell_tag(0, CellIndex::new(ni as i32, j))]);
        assert_eq!(f.gradient_v_c[CellIndex::new(ni as i32 + 1, j)], numbered_fields(0, ni, nj).gradient_v_c[CellIndex::new(1, j)]);
    }
    for i in 1..=ni as i32 {
        assert_eq!(f.gradient_temp_c[CellIndex::new(i, 0)][0], cell_tag(0, CellIndex::new(i, nj as i32)));
        assert_eq!(f.gradient_temp_c[CellIndex::new(i, nj as i32 + 1)][0], cell_tag(0, CellIndex::new(i, 1)));
    }
}

#[test]
fn surface_stages_copy_between_coupled_faces() {
    let (n, m) = (5, 3);
    let mut blocks = blocks_from(vec![numbered_fields(0, n, m), numbered_fields(1, n, m)]);
    let source = numbered_fields(1, n, m);
    let sync = InterBlockSynchronizer::for_blocks(side_by_side_couplings(0, 1, m), &blocks).unwrap();

    sync.synchronize(StageTag::GradientSurface, &mut blocks).unwrap();

    for j in 1..=m as i32 {
        let owner_face = (CellIndex::new(n as i32, j), Axis::I);
        let source_face = (CellIndex::new(0, j), Axis::I);
        assert_eq!(blocks[0].fields().gradient_temp_surf[owner_face], source.gradient_temp_surf[source_face]);
        assert_eq!(blocks[0].fields().gradient_v_surf[owner_face], source.gradient_v_surf[source_face]);
    }
}

#[test]
fn surface_stages_read_neighbour_axis_and_write_owner_axis() {
    // Block 0's i-end face is fed by block 1's j-start face.
    let owner = ConnectionDescriptor::new(BlockId(0), 1, March::Forward, Axis::I, FaceEnd::End);
    let neighbor = ConnectionDescriptor::new(BlockId(1), 1, March::Forward, Axis::J, FaceEnd::Start);
    let mut blocks = blocks_from(vec![numbered_fields(0, 4, 3), numbered_fields(1, 3, 5)]);
    let before = numbered_fields(0, 4, 3);
    let source = numbered_fields(1, 3, 5);
    let sync = InterBlockSynchronizer::for_blocks(vec![Coupling::new(owner, neighbor, 3)], &blocks).unwrap();

    sync.synchronize(StageTag::SurfaceVt, &mut blocks).unwrap();
    sync.synchronize(StageTag::GradientSurface, &mut blocks).unwrap();

    let f = blocks[0].fields();
    for k in 0..3 {
        let owner_face = CellIndex::new(4, 1 + k);
        let source_face = (CellIndex::new(1 + k, 0), Axis::J);
        assert_eq!(f.v_surf[(owner_face, Axis::I)], source.v_surf[source_face]);
        assert_eq!(f.temp_surf[(owner_face, Axis::I)], source.temp_surf[source_face]);
        assert_eq!(f.gradient_v_surf[(owner_face, Axis::I)], source.gradient_v_surf[source_face]);
        assert_eq!(
            f.gradient_temp_surf[(owner_face, Axis::I)],
            source.gradient_temp_surf[source_face]
        );
        // The neighbour's i-faces at the same index hold different tags.
        assert_ne!(f.temp_surf[(owner_face, Axis::I)], source.temp_surf[(source_face.0, Axis::I)]);
        // The owner's j-faces are left alone.
        assert_eq!(f.temp_surf[(owner_face, Axis::J)], before.temp_surf[(owner_face, Axis::J)]);
    }
}

#[test]
fn advect_flux_stage_calls_owner_hook_per_cell() {
    let log = RecordingSolver::new_log();
    let mut blocks: Vec<Box<dyn BlockSolver>> = vec![
        Box::new(RecordingSolver::new("left", BlockFields::new(3, 2), log.clone())),
        Box::new(RecordingSolver::new("right", BlockFields::new(3, 2), log.clone())),
    ];
    let sync = InterBlockSynchronizer::for_blocks(side_by_side_couplings(0, 1, 2), &blocks).unwrap();

    sync.synchronize(StageTag::AdvectFlux, &mut blocks).unwrap();

    assert_eq!(
        calls_for(&log, "left"),
        vec![
            SolverCall::AdvectFluxCell {
                cell: CellIndex::new(3, 1),
                halo: CellIndex::new(4, 1),
                face: Axis::I,
                end: FaceEnd::End,
            },
            SolverCall::AdvectFluxCell {
                cell: CellIndex::new(3, 2),
                halo: CellIndex::new(4, 2),
                face: Axis::I,
                end: FaceEnd::End,
            },
        ]
    );
    assert_eq!(calls_for(&log, "right").len(), 2);
}

#[test]
fn unknown_stage_code_fails_fast() {
    let mut blocks = blocks_from(vec![numbered_fields(0, 2, 2)]);
    let sync = InterBlockSynchronizer::for_blocks(periodic_couplings(0, 2, 2), &blocks).unwrap();
    let before = blocks[0].fields().q.clone();
    match sync.synchronize_code(5, &mut blocks) {
        Err(CouplingError::UnknownStage { code: 5 }) => {}
        other => panic!("expected UnknownStage, got {other:?}"),
    }
    assert_eq!(blocks[0].fields().q, before);
    sync.synchronize_code(0, &mut blocks).unwrap();
}

#[test]
fn wrong_block_list_is_rejected() {
    let mut blocks = blocks_from(vec![numbered_fields(0, 2, 2), numbered_fields(1, 2, 2)]);
    let sync = InterBlockSynchronizer::for_blocks(side_by_side_couplings(0, 1, 2), &blocks).unwrap();
    blocks.pop();
    match sync.synchronize(StageTag::State, &mut blocks) {
        Err(CouplingError::BlockCountMismatch { expected: 2, actual: 1 }) => {}
        other => panic!("expected BlockCountMismatch, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn state_sync_is_bit_exact_for_random_fields(seed in any::<u64>(), n in 1usize..8, m in 1usize..8) {
        let left = random_fields(n, m, seed);
        let right = random_fields(n, m, seed.wrapping_add(1));
        let mut blocks = blocks_from(vec![left.clone(), right.clone()]);
        let sync = InterBlockSynchronizer::for_blocks(side_by_side_couplings(0, 1, m), &blocks).unwrap();
        sync.synchronize(StageTag::State, &mut blocks).unwrap();
        for j in 1..=m as i32 {
            let got = blocks[0].fields().q[CellIndex::new(n as i32 + 1, j)];
            let want = right.q[CellIndex::new(1, j)];
            for k in 0..4 {
                prop_assert_eq!(got[k].to_bits(), want[k].to_bits());
            }
        }
    }
}

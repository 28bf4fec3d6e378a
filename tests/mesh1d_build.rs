use geo::Coord;
use proptest::prelude::*;
use reach_mesh::DebugInvariants;
use reach_mesh::data::branch::Branch;
use reach_mesh::data::structures::StructureChainage;
use reach_mesh::mesh_error::ReachMeshError;
use reach_mesh::mesh_generation::{Mesh1DBuilder, Mesh1DOptions, build};
use reach_mesh::topology::branch_topology::BranchTopology;

fn branch(id: &str, pts: &[(f64, f64)]) -> Branch {
    Branch::from_xy(id, pts).unwrap()
}

#[test]
fn hundred_metres_at_forty() {
    let mesh = build(&[branch("b", &[(0.0, 0.0), (100.0, 0.0)])], &[], 40.0).unwrap();
    let offsets = mesh.offsets("b").unwrap();
    let expected = [0.0, 33.33, 66.67, 100.0];
    assert_eq!(offsets.len(), 4);
    for (o, e) in offsets.iter().zip(expected) {
        assert!((o - e).abs() < 0.01, "{offsets:?}");
    }
    assert_eq!(mesh.nodes().len(), 4);
    assert_eq!(mesh.edges().len(), 3);
}

#[test]
fn shared_endpoint_gives_three_network_nodes() {
    let branches = vec![
        branch("a", &[(0.0, 0.0), (10.0, 10.0)]),
        branch("b", &[(10.0, 10.0), (40.0, 10.0)]),
    ];
    let mesh = build(&branches, &[], 5.0).unwrap();
    assert_eq!(mesh.network_nodes().len(), 3);

    // the junction is a single mesh node with two incident edges
    let (junction, d) = mesh.nearest_node(Coord { x: 10.0, y: 10.0 }).unwrap();
    assert_eq!(d, 0.0);
    assert_eq!(mesh.degree(junction), 2);
    let at_junction = mesh
        .nodes()
        .iter()
        .filter(|n| n.coord == Coord { x: 10.0, y: 10.0 })
        .count();
    assert_eq!(at_junction, 1);
    mesh.validate_invariants().unwrap();
}

#[test]
fn structure_on_grid_node_is_straddled() {
    let branches = vec![branch("b", &[(0.0, 0.0), (100.0, 0.0)])];
    let structures = vec![StructureChainage::new("weir", "b", 50.0)];
    let builder = Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing: 50.0,
        ..Default::default()
    });
    let mesh = builder.build(&branches, &structures).unwrap();
    let offsets = mesh.offsets("b").unwrap();
    assert!(!offsets.contains(&50.0));
    assert!(offsets.contains(&45.0) && offsets.contains(&55.0), "{offsets:?}");
    assert!(mesh.nodes().iter().all(|n| n.chainage != 50.0));
}

#[test]
fn fails_fast_on_bad_networks() {
    assert_eq!(build(&[], &[], 10.0).unwrap_err(), ReachMeshError::EmptyNetwork);
    assert!(matches!(
        Branch::from_xy("ring", &[(0.0, 0.0), (5.0, 5.0), (0.0, 0.0)]),
        Err(ReachMeshError::RingGeometry { .. })
    ));
    let branches = vec![branch("b", &[(0.0, 0.0), (10.0, 0.0)])];
    assert_eq!(
        build(&branches, &[StructureChainage::new("s", "c", 1.0)], 10.0).unwrap_err(),
        ReachMeshError::UnknownBranch("c".into())
    );
    assert!(matches!(
        build(&branches, &[], -1.0),
        Err(ReachMeshError::InvalidSpacingInput(_))
    ));
}

#[test]
fn schematised_and_snapping() {
    let branches = vec![
        branch("a", &[(0.0, 0.0), (0.0, 30.0)]),
        branch("b", &[(0.0, 30.0), (60.0, 30.0), (60.0, 90.0)]),
    ];
    let mesh = build(&branches, &[], 15.0).unwrap();
    let lines = mesh.schematised();
    assert_eq!(lines.len(), 2);
    let (id, line) = &lines[1];
    assert_eq!(id, "b");
    assert_eq!(line.0.first(), Some(&Coord { x: 0.0, y: 30.0 }));
    assert_eq!(line.0.last(), Some(&Coord { x: 60.0, y: 90.0 }));

    let snapped = mesh.snap(Coord { x: 62.0, y: 44.0 }).unwrap();
    assert_eq!(snapped.branch_id, "b");
    assert!((snapped.chainage - 75.0).abs() < 1e-9);
    assert!((snapped.coord.y - 45.0).abs() < 1e-9);

    let near = mesh
        .nearest_nodes_on_branch("b", Coord { x: 61.0, y: 31.0 }, 2)
        .unwrap();
    assert_eq!(near.len(), 2);
    assert!((near[0].1 - 60.0).abs() < 1e-9);
    assert!(mesh.nearest_nodes_on_branch("zz", Coord { x: 0.0, y: 0.0 }, 1).is_err());
}

fn network() -> impl Strategy<Value = Vec<((i32, i32), (i32, i32))>> {
    prop::collection::vec(((0i32..4, 0i32..4), (0i32..4, 0i32..4)), 1..8)
        .prop_map(|ends| ends.into_iter().filter(|(a, b)| a != b).collect::<Vec<_>>())
        .prop_filter("at least one branch", |v| !v.is_empty())
}

proptest! {
    #[test]
    fn shared_endpoints_counted_once(ends in network()) {
        let branches: Vec<Branch> = ends
            .iter()
            .enumerate()
            .map(|(i, &((x0, y0), (x1, y1)))| {
                let scaled = |v: i32| f64::from(v) * 10.0;
                branch(
                    &format!("b{i}"),
                    &[(scaled(x0), scaled(y0)), (scaled(x1), scaled(y1))],
                )
            })
            .collect();
        let mut distinct: Vec<(i32, i32)> = ends.iter().flat_map(|&(a, b)| [a, b]).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let (topo, _) = BranchTopology::from_branches(&branches).unwrap();
        prop_assert_eq!(topo.nodes().len(), distinct.len());
        prop_assert!(topo.nodes().len() <= 2 * branches.len());

        let mesh = build(&branches, &[], 7.0).unwrap();
        prop_assert_eq!(mesh.network_nodes().len(), distinct.len());
        for b in &branches {
            let offsets = mesh.offsets(b.id()).unwrap();
            prop_assert_eq!(offsets[0], 0.0);
            prop_assert!((offsets[offsets.len() - 1] - b.length()).abs() < 1e-9);
        }
        prop_assert!(mesh.validate_invariants().is_ok());
    }

    #[test]
    fn structures_never_sit_on_a_node(
        length in 20.0f64..500.0,
        target in 5.0f64..80.0,
        fractions in prop::collection::vec(0.02f64..0.98, 1..5),
    ) {
        let branches = vec![branch("b", &[(0.0, 0.0), (length, 0.0)])];
        let structures: Vec<_> = fractions
            .iter()
            .enumerate()
            .map(|(i, f)| StructureChainage::new(format!("s{i}"), "b", f * length))
            .collect();
        let mesh = build(&branches, &structures, target).unwrap();
        let offsets = mesh.offsets("b").unwrap();
        for s in &structures {
            prop_assert!(offsets.iter().all(|o| (o - s.chainage).abs() > 1e-9));
            prop_assert!(offsets.iter().any(|&o| o < s.chainage));
            prop_assert!(offsets.iter().any(|&o| o > s.chainage));
        }
        prop_assert_eq!(offsets[0], 0.0);
        prop_assert_eq!(offsets[offsets.len() - 1], length);
    }
}

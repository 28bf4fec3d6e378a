use geo::{Coord, Intersects, Rect};
use proptest::prelude::*;
use reach_mesh::prelude::*;

fn square(x0: f64, y0: f64, size: f64) -> geo::Polygon<f64> {
    Rect::new(Coord { x: x0, y: y0 }, Coord { x: x0 + size, y: y0 + size }).to_polygon()
}

fn two_node_mesh() -> Mesh1D {
    let branches = vec![Branch::from_xy("b", &[(0.0, 0.0), (10.0, 0.0)]).unwrap()];
    Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing: 10.0,
        ..Default::default()
    })
    .build(&branches, &[])
    .unwrap()
}

#[test]
fn one_to_two_respects_max_distance() {
    let mesh1d = two_node_mesh();
    let face = Face2D::with_centroid(square(-5.0, 2.0, 10.0), Coord { x: 0.0, y: 7.0 }).unwrap();
    let mesh2d = Mesh2D::new(vec![face]);

    let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, 5.0).unwrap();
    assert!(links.is_empty());

    let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, 7.5).unwrap();
    let expected = Link1D2D::new(MeshNodeId::from_index(0), FaceId::from_index(0));
    assert_eq!(links.as_slice(), &[expected]);

    // the limit is strict
    let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, 7.0).unwrap();
    assert!(links.is_empty());
}

#[test]
fn non_positive_distance_is_an_error() {
    let mesh1d = two_node_mesh();
    let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 5.0, 2, 2).unwrap();
    assert_eq!(
        generate(LinkMode::TwoToOneNearest, &mesh1d, &mesh2d, 0.0).unwrap_err(),
        ReachMeshError::InvalidDistance(0.0)
    );
    let options = LinkOptions {
        mode: LinkMode::TwoToOneIntersecting,
        max_distance: Some(-3.0),
    };
    assert!(options.generate(&mesh1d, &mesh2d).is_err());
}

#[test]
fn intersecting_mode_on_a_bend() {
    let branches = vec![Branch::from_xy("b", &[(5.0, 5.0), (25.0, 5.0), (25.0, 25.0)]).unwrap()];
    let mesh1d = Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing: 10.0,
        ..Default::default()
    })
    .build(&branches, &[])
    .unwrap();
    let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 3, 3).unwrap();
    let links = generate(LinkMode::TwoToOneIntersecting, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
    let faces: Vec<u64> = links.iter().map(|l| l.face.get()).collect();
    // bottom row and right column
    assert_eq!(faces, vec![1, 2, 3, 6, 9]);
}

#[test]
fn boundary_removes_links_at_branch_end() {
    let branches = vec![
        Branch::from_xy("main", &[(5.0, 15.0), (25.0, 15.0)]).unwrap(),
        Branch::from_xy("side", &[(25.0, 15.0), (25.0, 45.0)]).unwrap(),
    ];
    let mesh1d = Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing: 10.0,
        ..Default::default()
    })
    .build(&branches, &[])
    .unwrap();
    let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 5, 5).unwrap();
    let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
    assert_eq!(links.len(), mesh1d.nodes().len());

    let bc = BoundaryLocation::at_branch_end(
        &branches[1],
        Coord { x: 25.0, y: 50.0 },
        &ProbeOptions::default(),
    )
    .unwrap();
    let resolved = resolve(&links, &[bc], &mesh1d);
    assert_eq!(resolved.len(), links.len() - 2);
    let (end, _) = mesh1d.nearest_node(Coord { x: 25.0, y: 45.0 }).unwrap();
    assert!(resolved.iter().all(|l| l.node != end));
}

#[test]
fn boundary_at_junction_clears_all_three_branches() {
    let branches = vec![
        Branch::from_xy("west", &[(5.0, 15.0), (25.0, 15.0)]).unwrap(),
        Branch::from_xy("east", &[(25.0, 15.0), (45.0, 15.0)]).unwrap(),
        Branch::from_xy("north", &[(25.0, 15.0), (25.0, 45.0)]).unwrap(),
    ];
    let mesh1d = Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing: 10.0,
        ..Default::default()
    })
    .build(&branches, &[])
    .unwrap();
    assert_eq!(mesh1d.nodes().len(), 8);
    let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 5, 5).unwrap();
    let mut links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
    assert_eq!(links.len(), 8);

    let node_at = |x: f64, y: f64| mesh1d.nearest_node(Coord { x, y }).unwrap().0;
    let junction = node_at(25.0, 15.0);
    assert_eq!(mesh1d.degree(junction), 3);

    let bc = BoundaryLocation::at_point(Coord { x: 25.0, y: 16.0 });
    assert_eq!(links.resolve_boundary_conflicts(&[bc], &mesh1d), 4);
    for (x, y) in [(25.0, 15.0), (15.0, 15.0), (35.0, 15.0), (25.0, 25.0)] {
        let gone = node_at(x, y);
        assert!(links.iter().all(|l| l.node != gone), "link left at ({x}, {y})");
    }
    let mut kept: Vec<_> = links.iter().map(|l| l.node).collect();
    kept.sort_unstable();
    let mut expected: Vec<_> = [(5.0, 15.0), (45.0, 15.0), (25.0, 35.0), (25.0, 45.0)]
        .into_iter()
        .map(|(x, y)| node_at(x, y))
        .collect();
    expected.sort_unstable();
    assert_eq!(kept, expected);
}

#[test]
fn export_segments_follow_links() {
    let mesh1d = two_node_mesh();
    let mesh2d = Mesh2D::rectilinear(Coord { x: -5.0, y: -5.0 }, 10.0, 2, 1).unwrap();
    let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
    let segments = links.segments(&mesh1d, &mesh2d);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].start, Coord { x: 0.0, y: 0.0 });
    assert_eq!(segments[1].start, Coord { x: 10.0, y: 0.0 });
}

fn polyline() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((1.0f64..59.0, 1.0f64..59.0), 2..5).prop_filter("distinct ends", |pts| {
        let (a, b) = (pts[0], pts[pts.len() - 1]);
        (a.0 - b.0).hypot(a.1 - b.1) > 1.0
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn nearest_links_cross_at_most_one_face(pts in polyline(), spacing in 3.0f64..20.0) {
        let branches = vec![Branch::from_xy("b", &pts).unwrap()];
        let options = Mesh1DOptions { target_spacing: spacing, ..Default::default() };
        let mesh1d = Mesh1DBuilder::new(options).build(&branches, &[]).unwrap();
        let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 6, 6).unwrap();
        let links = generate(LinkMode::TwoToOneNearest, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
        for seg in links.segments(&mesh1d, &mesh2d) {
            let crossed = mesh2d.iter().filter(|(_, f)| f.polygon().intersects(&seg)).count();
            prop_assert!(crossed <= 1, "segment {:?} crosses {} faces", seg, crossed);
        }
    }

    #[test]
    fn resolver_is_idempotent(
        pts in polyline(),
        probes in prop::collection::vec((0.0f64..60.0, 0.0f64..60.0), 0..4),
    ) {
        let branches = vec![Branch::from_xy("b", &pts).unwrap()];
        let mesh1d = Mesh1DBuilder::new(Mesh1DOptions { target_spacing: 6.0, ..Default::default() })
            .build(&branches, &[])
            .unwrap();
        let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 6, 6).unwrap();
        let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, f64::INFINITY).unwrap();
        let boundaries: Vec<_> = probes
            .iter()
            .map(|&(x, y)| BoundaryLocation::at_point(Coord { x, y }))
            .collect();
        let once = resolve(&links, &boundaries, &mesh1d);
        let twice = resolve(&once, &boundaries, &mesh1d);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|l| links.contains(l)));
    }
}

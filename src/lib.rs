//! Planar Voronoi diagrams through Fortune's sweepline algorithm.
//!
//! Given a set of sites and a rectangular [BoundingBox], computes the Voronoi
//! diagram clipped to the box, with every cell closed into a valid convex
//! polygon along the box perimeter.
//!
//! # Example
//!
//! ```
//! use voronoi_fortune::{BoundingBox, Point, VoronoiBuilder};
//!
//! let diagram = VoronoiBuilder::default()
//!     .set_sites(vec![Point { x: 2.0, y: 5.0 }, Point { x: 8.0, y: 5.0 }])
//!     .set_bounding_box(BoundingBox::new(0.0, 10.0, 0.0, 10.0))
//!     .build()
//!     .unwrap();
//!
//! // each site gets a cell; walk its polygon through the cell view
//! for cell in diagram.iter_cells() {
//!     let vertices: Vec<_> = cell.iter_vertices().collect();
//!     assert!(vertices.len() >= 3);
//! }
//! ```
//!
//! Coordinates follow the screen convention, with y growing downward. Cell
//! polygons are traversed counter-clockwise on screen.
//!
//! For repeated computations, [Voronoi] can be reused and previously returned
//! diagrams can be handed back through [Voronoi::recycle] to avoid
//! reallocating.

mod bounding_box;
mod builder;
mod clip;
mod diagram;
mod error;
mod point;
mod rbtree;
mod sweep;
mod utils;

pub use bounding_box::BoundingBox;
pub use builder::VoronoiBuilder;
pub use diagram::{Cell, Diagram, Edge, HalfEdge, PointLocation, VoronoiCell};
pub use error::VoronoiError;
pub use point::Point;
pub use sweep::Voronoi;
pub use utils::abs_diff_eq;

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use robust::{orient2d, Coord};

    use super::*;

    fn coord(p: &Point) -> Coord<f64> {
        Coord { x: p.x, y: p.y }
    }

    fn cell_vertices(diagram: &Diagram, cell: usize) -> Vec<Point> {
        diagram.cell(cell).iter_vertices().cloned().collect()
    }

    /// Signed double area; positive for the winding cells are built with.
    fn double_area(vertices: &[Point]) -> f64 {
        vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .fold(0.0, |acc, (a, b)| acc + ((b.x - a.x) * (b.y + a.y)))
    }

    fn is_point_inside(vertices: &[Point], inside: &Point) -> bool {
        for (a, b) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
            if orient2d(coord(a), coord(b), coord(inside)) > 0. {
                return false;
            }
        }
        true
    }

    /// Structural validation of a computed diagram: every non-empty cell is a
    /// closed convex polygon with positive area, fully inside the box, and
    /// consecutive half-edges connect end to start.
    fn validate(diagram: &Diagram, bbox: &BoundingBox) {
        for cell in diagram.iter_cells() {
            let halfedges = cell.half_edges();
            if halfedges.is_empty() {
                continue;
            }
            assert!(
                halfedges.len() >= 3,
                "cell {} has {} half-edges, polygon expected",
                cell.site(),
                halfedges.len()
            );

            for (i, he) in halfedges.iter().enumerate() {
                let end = diagram.half_edge_end(he);
                let next_start = diagram.half_edge_start(&halfedges[(i + 1) % halfedges.len()]);
                assert!(
                    abs_diff_eq(end.x, next_start.x, 1e-8)
                        && abs_diff_eq(end.y, next_start.y, 1e-8),
                    "cell {} is not closed between half-edges {} and {}: {:?} vs {:?}",
                    cell.site(),
                    i,
                    (i + 1) % halfedges.len(),
                    end,
                    next_start
                );
            }

            let vertices = cell_vertices(diagram, cell.site());
            for v in &vertices {
                assert!(
                    bbox.left() - 1e-8 <= v.x
                        && v.x <= bbox.right() + 1e-8
                        && bbox.top() - 1e-8 <= v.y
                        && v.y <= bbox.bottom() + 1e-8,
                    "cell {} vertex {:?} outside bounding box",
                    cell.site(),
                    v
                );
            }

            // consistent turning direction at every corner means convex
            let n = vertices.len();
            for i in 0..n {
                let o = orient2d(
                    coord(&vertices[i]),
                    coord(&vertices[(i + 1) % n]),
                    coord(&vertices[(i + 2) % n]),
                );
                assert!(
                    o <= 0.,
                    "cell {} is not convex at vertex {}",
                    cell.site(),
                    (i + 1) % n
                );
            }

            assert!(
                double_area(&vertices) > 0.,
                "cell {} has non-positive area",
                cell.site()
            );
        }
    }

    fn compute(sites: &[Point], bbox: &BoundingBox) -> Diagram {
        Voronoi::new().compute(sites, bbox).expect("valid input")
    }

    #[test]
    fn single_site_cell_covers_the_whole_box() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 6.0);
        let diagram = compute(&[Point { x: 3.0, y: 2.0 }], &bbox);

        assert_eq!(1, diagram.cells().len());
        let vertices = cell_vertices(&diagram, 0);
        assert_eq!(4, vertices.len());
        for corner in bbox.corners().iter() {
            assert!(
                vertices.iter().any(|v| v == corner),
                "corner {:?} missing from lone cell",
                corner
            );
        }
        assert!(diagram.cell(0).contains(&Point { x: 3.0, y: 2.0 }));
        validate(&diagram, &bbox);
    }

    #[test]
    fn two_sites_split_the_box() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let sites = [Point { x: 8.0, y: 5.0 }, Point { x: 2.0, y: 5.0 }];
        let diagram = compute(&sites, &bbox);

        assert_eq!(2, diagram.cells().len());
        // sites are reported in processing order, lower x first here
        assert_eq!(Point { x: 2.0, y: 5.0 }, diagram.sites()[0]);

        let (min, max) = diagram.cell(0).bounding_rect();
        assert!(abs_diff_eq(min.x, 0.0, 1e-9) && abs_diff_eq(max.x, 5.0, 1e-9));
        assert!(abs_diff_eq(min.y, 0.0, 1e-9) && abs_diff_eq(max.y, 10.0, 1e-9));
        let (min, max) = diagram.cell(1).bounding_rect();
        assert!(abs_diff_eq(min.x, 5.0, 1e-9) && abs_diff_eq(max.x, 10.0, 1e-9));

        // the single bisector runs vertically through x = 5
        let internal: Vec<_> = diagram
            .edges()
            .iter()
            .filter(|e| e.right_site().is_some())
            .collect();
        assert_eq!(1, internal.len());
        let start = &diagram.vertices()[internal[0].start().unwrap()];
        let end = &diagram.vertices()[internal[0].end().unwrap()];
        assert!(abs_diff_eq(start.x, 5.0, 1e-9) && abs_diff_eq(end.x, 5.0, 1e-9));

        validate(&diagram, &bbox);
    }

    #[test]
    fn collinear_sites_make_parallel_strips() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let sites = [
            Point { x: 5.0, y: 2.0 },
            Point { x: 5.0, y: 5.0 },
            Point { x: 5.0, y: 8.0 },
        ];
        let diagram = compute(&sites, &bbox);

        assert_eq!(3, diagram.cells().len());
        let internal = diagram
            .edges()
            .iter()
            .filter(|e| e.right_site().is_some())
            .count();
        assert_eq!(2, internal);

        // middle strip spans between the two horizontal bisectors
        let (min, max) = diagram.cell(1).bounding_rect();
        assert!(abs_diff_eq(min.y, 3.5, 1e-9) && abs_diff_eq(max.y, 6.5, 1e-9));
        assert!(abs_diff_eq(min.x, 0.0, 1e-9) && abs_diff_eq(max.x, 10.0, 1e-9));

        validate(&diagram, &bbox);
    }

    #[test]
    fn equidistant_sites_share_circumcenter_vertex() {
        let bbox = BoundingBox::new(-4.0, 8.0, -4.0, 8.0);
        let sites = [
            Point { x: 0.0, y: 0.0 },
            Point { x: 4.0, y: 0.0 },
            Point { x: 2.0, y: 3.0 },
        ];
        let diagram = compute(&sites, &bbox);

        assert_eq!(3, diagram.cells().len());
        let internal = diagram
            .edges()
            .iter()
            .filter(|e| e.right_site().is_some())
            .count();
        assert_eq!(3, internal);

        // all three bisectors meet at the circumcenter (2, 5/6)
        assert!(
            diagram
                .vertices()
                .iter()
                .any(|v| abs_diff_eq(v.x, 2.0, 1e-9) && abs_diff_eq(v.y, 5.0 / 6.0, 1e-9)),
            "circumcenter vertex missing"
        );

        for (i, site) in diagram.sites().iter().enumerate() {
            assert!(diagram.cell(i).contains(site));
        }
        validate(&diagram, &bbox);
    }

    #[test]
    fn duplicate_sites_collapse_into_one_cell() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let sites = [
            Point { x: 1.0, y: 1.0 },
            Point { x: 1.0, y: 1.0 },
            Point { x: 9.0, y: 9.0 },
        ];
        let diagram = compute(&sites, &bbox);

        assert_eq!(2, diagram.cells().len());
        assert_eq!(
            vec![Point { x: 1.0, y: 1.0 }, Point { x: 9.0, y: 9.0 }],
            diagram.sites().to_vec()
        );
        validate(&diagram, &bbox);
    }

    #[test]
    fn site_on_the_border_is_contained_by_its_cell() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let sites = [Point { x: 0.0, y: 5.0 }, Point { x: 5.0, y: 5.0 }];
        let diagram = compute(&sites, &bbox);

        assert_eq!(2, diagram.cells().len());
        let border_cell = diagram.cell(0);
        assert_eq!(
            PointLocation::OnBoundary,
            border_cell.point_location(&Point { x: 0.0, y: 5.0 })
        );
        assert!(border_cell.contains(&Point { x: 0.0, y: 5.0 }));
        validate(&diagram, &bbox);
    }

    #[test]
    fn same_input_produces_same_diagram() {
        let bbox = BoundingBox::default();
        let mut rng = StdRng::seed_from_u64(7);
        let sites: Vec<Point> = (0..50)
            .map(|_| Point {
                x: rng.gen_range(-0.9..0.9),
                y: rng.gen_range(-0.9..0.9),
            })
            .collect();

        let first = compute(&sites, &bbox);
        let second = compute(&sites, &bbox);

        assert_eq!(first.sites(), second.sites());
        assert_eq!(first.vertices().len(), second.vertices().len());
        assert_eq!(first.edges().len(), second.edges().len());
        for i in 0..first.cells().len() {
            assert_eq!(cell_vertices(&first, i), cell_vertices(&second, i));
        }
    }

    #[test]
    fn neighbor_cells_share_internal_edges() {
        let bbox = BoundingBox::default();
        let mut rng = StdRng::seed_from_u64(11);
        let sites: Vec<Point> = (0..100)
            .map(|_| Point {
                x: rng.gen_range(-0.9..0.9),
                y: rng.gen_range(-0.9..0.9),
            })
            .collect();
        let diagram = compute(&sites, &bbox);

        for cell in diagram.iter_cells() {
            for he in cell.half_edges() {
                let edge = &diagram.edges()[he.edge()];
                let other = if edge.left_site() == cell.site() {
                    edge.right_site()
                } else {
                    Some(edge.left_site())
                };
                let other = match other {
                    Some(o) => o,
                    None => continue, // border edge, single sided
                };

                // the neighbor holds the same edge traversed the other way
                let twin = diagram.cells()[other]
                    .half_edges()
                    .iter()
                    .find(|h| h.edge() == he.edge())
                    .expect("internal edge missing from neighbor cell");
                assert_eq!(diagram.half_edge_start(he), diagram.half_edge_end(twin));
                assert_eq!(diagram.half_edge_end(he), diagram.half_edge_start(twin));

                // neighbors are mutual
                assert!(diagram.cell(other).iter_neighbors().any(|n| n == cell.site()));
            }
        }
        validate(&diagram, &bbox);
    }

    #[test]
    fn recycling_does_not_change_results() {
        let bbox = BoundingBox::default();
        let mut rng = StdRng::seed_from_u64(13);
        let mut make_sites = |n: usize| -> Vec<Point> {
            (0..n)
                .map(|_| Point {
                    x: rng.gen_range(-0.9..0.9),
                    y: rng.gen_range(-0.9..0.9),
                })
                .collect()
        };
        let first_sites = make_sites(80);
        let second_sites = make_sites(120);

        let mut voronoi = Voronoi::new();
        let first = voronoi.compute(&first_sites, &bbox).unwrap();
        voronoi.recycle(first);
        let recycled = voronoi.compute(&second_sites, &bbox).unwrap();

        let fresh = compute(&second_sites, &bbox);
        assert_eq!(fresh.sites(), recycled.sites());
        assert_eq!(fresh.vertices(), recycled.vertices());
        assert_eq!(fresh.edges().len(), recycled.edges().len());
        for i in 0..fresh.cells().len() {
            assert_eq!(cell_vertices(&fresh, i), cell_vertices(&recycled, i));
        }
    }

    #[test]
    fn random_diagram_is_valid() {
        let bbox = BoundingBox::default();
        let mut rng = StdRng::seed_from_u64(42);
        let sites: Vec<Point> = (0..1000)
            .map(|_| Point {
                x: rng.gen_range(-0.99..0.99),
                y: rng.gen_range(-0.99..0.99),
            })
            .collect();
        let diagram = compute(&sites, &bbox);

        assert_eq!(sites.len(), diagram.cells().len());
        validate(&diagram, &bbox);

        let mut total_area = 0.0;
        for (i, site) in diagram.sites().iter().enumerate() {
            let cell = diagram.cell(i);
            assert!(cell.contains(site), "site {} not inside its own cell", i);
            total_area += double_area(&cell_vertices(&diagram, i)) / 2.0;
        }
        // cells partition the box
        let box_area = bbox.width() * bbox.height();
        assert!(
            (total_area - box_area).abs() < 1e-6,
            "cell areas sum to {} instead of {}",
            total_area,
            box_area
        );

        // every box corner belongs to some cell
        for corner in bbox.corners().iter() {
            assert!(
                diagram
                    .iter_cells()
                    .any(|c| is_point_inside(&cell_vertices(&diagram, c.site()), corner)),
                "corner {:?} not inside any cell",
                corner
            );
        }
    }

    #[test]
    fn sites_outside_the_box_are_clipped_away() {
        let bbox = BoundingBox::default();
        let mut rng = StdRng::seed_from_u64(17);
        // spread sites well beyond the box to stress clipping and closing
        let sites: Vec<Point> = (0..500)
            .map(|_| Point {
                x: rng.gen_range(-2.0 * bbox.width()..2.0 * bbox.width()),
                y: rng.gen_range(-2.0 * bbox.height()..2.0 * bbox.height()),
            })
            .collect();
        let diagram = compute(&sites, &bbox);
        assert_eq!(sites.len(), diagram.cells().len());
        validate(&diagram, &bbox);
    }
}

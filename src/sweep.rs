use std::mem;

use crate::bounding_box::BoundingBox;
use crate::diagram::{Cell, Diagram, Edge, HalfEdge};
use crate::error::VoronoiError;
use crate::point::Point;
use crate::rbtree::{RedBlackTree, NIL};
use crate::utils::EPSILON;

/// Site triples whose convexity determinant is above this threshold are
/// treated as collinear and never scheduled to collapse.
const COLLINEARITY_EPSILON: f64 = 2e-12;

/// One parabolic arc of the beachline: the locally closest site's front at
/// the current sweep position. Transient; destroyed when the arc collapses.
#[derive(Debug, Clone, Copy)]
struct BeachArc {
    site: usize,
    /// Edge being traced by this arc's left breakpoint (`NIL` before one exists).
    edge: usize,
    /// Pending collapse event in the circle-event queue (`NIL` when none).
    circle_event: usize,
}

impl BeachArc {
    fn new(site: usize) -> Self {
        Self { site, edge: NIL, circle_event: NIL }
    }
}

/// Predicted sweep position at which three consecutive arcs collapse into a
/// single Voronoi vertex at `(x, ycenter)`.
#[derive(Debug, Clone, Copy)]
struct CircleEvent {
    arc: usize,
    x: f64,
    y: f64,
    ycenter: f64,
}

/// Computes Voronoi diagrams with Fortune's sweepline algorithm.
///
/// A `Voronoi` value can be reused across computations; its internal arenas
/// keep their capacity between calls, and [Voronoi::recycle] additionally
/// reclaims a previously returned diagram's buffers. Neither form of reuse is
/// observable in the output.
///
/// # Example
///
/// ```
/// use voronoi_fortune::{BoundingBox, Point, Voronoi};
///
/// let sites = vec![Point { x: 2.0, y: 5.0 }, Point { x: 8.0, y: 5.0 }];
/// let mut voronoi = Voronoi::new();
/// let diagram = voronoi
///     .compute(&sites, &BoundingBox::new(0.0, 10.0, 0.0, 10.0))
///     .unwrap();
/// assert_eq!(2, diagram.cells().len());
/// ```
#[derive(Debug, Default)]
pub struct Voronoi {
    pub(crate) sites: Vec<Point>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) vertices: Vec<Point>,
    beachline: RedBlackTree<BeachArc>,
    circle_events: RedBlackTree<CircleEvent>,
    /// Next pending circle event, maintained on every queue insert/remove
    /// for O(1) access.
    first_circle: usize,
}

impl Voronoi {
    pub fn new() -> Self {
        Self {
            sites: Vec::new(),
            cells: Vec::new(),
            edges: Vec::new(),
            vertices: Vec::new(),
            beachline: RedBlackTree::new(),
            circle_events: RedBlackTree::new(),
            first_circle: NIL,
        }
    }

    /// Computes the Voronoi diagram of `sites` clipped and closed to
    /// `bounding_box`.
    ///
    /// Sites may repeat; duplicates are collapsed into their first occurrence
    /// and produce no cell of their own. Cells are indexed by distinct-site
    /// processing order.
    ///
    /// # Errors
    ///
    /// * [VoronoiError::InvalidBoundingBox] when the box is degenerate.
    /// * [VoronoiError::CellClosingFailed] when a cell cannot be closed along
    ///   the box perimeter, which indicates a malformed input region.
    pub fn compute(
        &mut self,
        sites: &[Point],
        bounding_box: &BoundingBox,
    ) -> Result<Diagram, VoronoiError> {
        if bounding_box.is_degenerate() {
            return Err(VoronoiError::InvalidBoundingBox);
        }
        self.reset();

        // sites are consumed back-to-front, so sort descending on (y, x)
        let mut site_events: Vec<Point> = sites.to_vec();
        site_events
            .sort_unstable_by(|a, b| b.y.total_cmp(&a.y).then_with(|| b.x.total_cmp(&a.x)));

        let mut site = site_events.pop();
        let mut last_x = f64::NAN;
        let mut last_y = f64::NAN;

        while site.is_some() || self.first_circle != NIL {
            // a site event comes first when it precedes the next circle
            // event in sweep order
            let circle = self.first_circle;
            let site_is_next = match &site {
                Some(s) => {
                    circle == NIL || {
                        let c = self.circle_events.item(circle);
                        s.y < c.y || (s.y == c.y && s.x < c.x)
                    }
                }
                None => false,
            };

            if site_is_next {
                if let Some(s) = site.take() {
                    // duplicate sites collapse into the first occurrence
                    if s.x != last_x || s.y != last_y {
                        last_x = s.x;
                        last_y = s.y;
                        let id = self.sites.len();
                        self.sites.push(s);
                        self.cells.push(Cell::new(id));
                        self.add_beachsection(id);
                    }
                }
                site = site_events.pop();
            } else {
                let arc = self.circle_events.item(circle).arc;
                self.remove_beachsection(arc);
            }
        }

        // the beachline now holds only unbounded edges; connect them to the
        // box, clip everything, and close the cells
        self.clip_edges(bounding_box);
        self.close_cells(bounding_box)?;
        self.compact_edges();

        Ok(Diagram {
            sites: mem::take(&mut self.sites),
            vertices: mem::take(&mut self.vertices),
            edges: mem::take(&mut self.edges),
            cells: mem::take(&mut self.cells),
        })
    }

    /// Hands a previously computed diagram back for buffer reuse.
    ///
    /// Purely a performance optimization: all recycled storage is cleared
    /// before the next [Voronoi::compute] call uses it.
    pub fn recycle(&mut self, diagram: Diagram) {
        let Diagram { mut sites, mut vertices, mut edges, mut cells } = diagram;
        sites.clear();
        vertices.clear();
        edges.clear();
        cells.clear();
        self.sites = sites;
        self.vertices = vertices;
        self.edges = edges;
        self.cells = cells;
    }

    fn reset(&mut self) {
        self.sites.clear();
        self.cells.clear();
        self.edges.clear();
        self.vertices.clear();
        self.beachline.clear();
        self.circle_events.clear();
        self.first_circle = NIL;
    }

    // ---- geometry kernel ----------------------------------------------

    pub(crate) fn create_vertex(&mut self, x: f64, y: f64) -> usize {
        self.vertices.push(Point { x, y });
        self.vertices.len() - 1
    }

    /// Creates the bisector edge between two sites and attaches one
    /// half-edge to each of their cells.
    fn create_edge(
        &mut self,
        left: usize,
        right: usize,
        start: Option<usize>,
        end: Option<usize>,
    ) -> usize {
        self.edges.push(Edge::new(left, Some(right)));
        let edge = self.edges.len() - 1;
        if let Some(vertex) = start {
            self.set_edge_start(edge, left, right, vertex);
        }
        if let Some(vertex) = end {
            self.set_edge_end(edge, left, right, vertex);
        }
        let left_half = HalfEdge::new(edge, left, right, &self.sites);
        let right_half = HalfEdge::new(edge, right, left, &self.sites);
        self.cells[left].halfedges.push(left_half);
        self.cells[right].halfedges.push(right_half);
        edge
    }

    /// Creates a border edge with both endpoints set and no right site.
    /// Its single half-edge is inserted by the caller at a specific position
    /// in the cell's half-edge sequence.
    pub(crate) fn create_border_edge(&mut self, site: usize, start: usize, end: usize) -> usize {
        let mut edge = Edge::new(site, None);
        edge.start = Some(start);
        edge.end = Some(end);
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Sets the endpoint of `edge` corresponding to the `(left, right)`
    /// orientation. The first endpoint set fixes the edge's canonical
    /// orientation; a reversed orientation sets the other endpoint.
    fn set_edge_start(&mut self, edge: usize, left: usize, right: usize, vertex: usize) {
        let e = &mut self.edges[edge];
        if e.start.is_none() && e.end.is_none() {
            e.start = Some(vertex);
            e.left = left;
            e.right = Some(right);
        } else if e.left == right {
            e.end = Some(vertex);
        } else {
            e.start = Some(vertex);
        }
    }

    fn set_edge_end(&mut self, edge: usize, left: usize, right: usize, vertex: usize) {
        self.set_edge_start(edge, right, left, vertex);
    }

    // ---- beachline ----------------------------------------------------

    /// The x position of the breakpoint between `arc` and its left neighbor
    /// at the given sweep position: the intersection of the two parabolas
    /// sharing the directrix.
    fn left_break_point(&self, arc: usize, directrix: f64) -> f64 {
        let site = self.beachline.item(arc).site;
        let rfocx = self.sites[site].x;
        let rfocy = self.sites[site].y;
        let pby2 = rfocy - directrix;
        // focus on the directrix: the arc degenerates to a vertical ray
        if pby2 == 0.0 {
            return rfocx;
        }
        let l_arc = self.beachline.prev(arc);
        if l_arc == NIL {
            return f64::NEG_INFINITY;
        }
        let l_site = self.beachline.item(l_arc).site;
        let lfocx = self.sites[l_site].x;
        let lfocy = self.sites[l_site].y;
        let plby2 = lfocy - directrix;
        if plby2 == 0.0 {
            return lfocx;
        }
        let hl = lfocx - rfocx;
        let aby2 = 1.0 / pby2 - 1.0 / plby2;
        let b = hl / plby2;
        if aby2 != 0.0 {
            return (-b
                + (b * b
                    - 2.0 * aby2
                        * (hl * hl / (-2.0 * plby2) - lfocy + plby2 / 2.0 + rfocy - pby2 / 2.0))
                    .sqrt())
                / aby2
                + rfocx;
        }
        // both parabolas have the same curvature: the breakpoint is midway
        (rfocx + lfocx) / 2.0
    }

    fn right_break_point(&self, arc: usize, directrix: f64) -> f64 {
        let r_arc = self.beachline.next(arc);
        if r_arc != NIL {
            return self.left_break_point(r_arc, directrix);
        }
        let site = self.beachline.item(arc).site;
        if self.sites[site].y == directrix {
            self.sites[site].x
        } else {
            f64::INFINITY
        }
    }

    /// Handles a site event: locates the arc above the new site by walking
    /// the beachline with the live breakpoint formula and splits it.
    fn add_beachsection(&mut self, site: usize) {
        let x = self.sites[site].x;
        let directrix = self.sites[site].y;

        let mut l_arc = NIL;
        let mut r_arc = NIL;
        let mut node = self.beachline.root();
        while node != NIL {
            let dxl = self.left_break_point(node, directrix) - x;
            if dxl > EPSILON {
                // before the left edge of this arc
                node = self.beachline.left(node);
            } else {
                let dxr = x - self.right_break_point(node, directrix);
                if dxr > EPSILON {
                    // after the right edge of this arc
                    if self.beachline.right(node) == NIL {
                        l_arc = node;
                        break;
                    }
                    node = self.beachline.right(node);
                } else {
                    if dxl > -EPSILON {
                        // exactly on the left edge of this arc
                        l_arc = self.beachline.prev(node);
                        r_arc = node;
                    } else if dxr > -EPSILON {
                        // exactly on the right edge of this arc
                        l_arc = node;
                        r_arc = self.beachline.next(node);
                    } else {
                        // strictly within this arc
                        l_arc = node;
                        r_arc = node;
                    }
                    break;
                }
            }
        }

        let new_arc = self.beachline.alloc(BeachArc::new(site));
        self.beachline.insert_successor(l_arc, new_arc);

        // first beach section ever
        if l_arc == NIL && r_arc == NIL {
            return;
        }

        // the new section falls within an existing one: split it in two and
        // grow a new edge between the two sites
        if l_arc == r_arc {
            self.detach_circle_event(l_arc);

            let split_site = self.beachline.item(l_arc).site;
            let copy = self.beachline.alloc(BeachArc::new(split_site));
            self.beachline.insert_successor(new_arc, copy);
            let edge = self.create_edge(split_site, site, None, None);
            self.beachline.item_mut(new_arc).edge = edge;
            self.beachline.item_mut(copy).edge = edge;

            self.attach_circle_event(l_arc);
            self.attach_circle_event(copy);
            return;
        }

        // the new section is the rightmost on the beachline
        if l_arc != NIL && r_arc == NIL {
            let l_site = self.beachline.item(l_arc).site;
            let edge = self.create_edge(l_site, site, None, None);
            self.beachline.item_mut(new_arc).edge = edge;
            return;
        }

        // the new section falls exactly on the breakpoint between two
        // existing sections: both transitions end at the circumcenter of
        // the three involved sites
        if l_arc != NIL && r_arc != NIL {
            self.detach_circle_event(l_arc);
            self.detach_circle_event(r_arc);

            let l_site = self.beachline.item(l_arc).site;
            let r_site = self.beachline.item(r_arc).site;
            let ax = self.sites[l_site].x;
            let ay = self.sites[l_site].y;
            let bx = x - ax;
            let by = directrix - ay;
            let cx = self.sites[r_site].x - ax;
            let cy = self.sites[r_site].y - ay;
            let d = 2.0 * (bx * cy - by * cx);
            let hb = bx * bx + by * by;
            let hc = cx * cx + cy * cy;
            let vertex = self.create_vertex(
                (cy * hb - by * hc) / d + ax,
                (bx * hc - cx * hb) / d + ay,
            );

            let r_edge = self.beachline.item(r_arc).edge;
            self.set_edge_start(r_edge, l_site, r_site, vertex);
            let edge = self.create_edge(l_site, site, None, Some(vertex));
            self.beachline.item_mut(new_arc).edge = edge;
            let edge = self.create_edge(site, r_site, None, Some(vertex));
            self.beachline.item_mut(r_arc).edge = edge;

            self.attach_circle_event(l_arc);
            self.attach_circle_event(r_arc);
        }
    }

    fn detach_beachsection(&mut self, arc: usize) {
        self.detach_circle_event(arc);
        self.beachline.remove(arc);
    }

    /// Handles a circle event: removes the collapsing arc (plus any
    /// neighbors collapsing at the same point), creates the shared vertex
    /// and stitches the surrounding edges through it.
    fn remove_beachsection(&mut self, beachsection: usize) {
        let circle = self.beachline.item(beachsection).circle_event;
        let (x, y) = {
            let c = self.circle_events.item(circle);
            (c.x, c.ycenter)
        };
        let vertex = self.create_vertex(x, y);

        let mut previous = self.beachline.prev(beachsection);
        let mut next = self.beachline.next(beachsection);
        let mut disappearing = vec![beachsection];
        let mut detached = vec![beachsection];
        self.detach_beachsection(beachsection);

        // more than three arcs may collapse at the same point; chain through
        // neighbors whose pending collapse coincides within epsilon
        let mut l_arc = previous;
        loop {
            let ce = self.beachline.item(l_arc).circle_event;
            if ce == NIL {
                break;
            }
            let (cx, cy) = {
                let c = self.circle_events.item(ce);
                (c.x, c.ycenter)
            };
            if (x - cx).abs() >= EPSILON || (y - cy).abs() >= EPSILON {
                break;
            }
            previous = self.beachline.prev(l_arc);
            disappearing.insert(0, l_arc);
            detached.push(l_arc);
            self.detach_beachsection(l_arc);
            l_arc = previous;
        }
        disappearing.insert(0, l_arc);
        self.detach_circle_event(l_arc);

        let mut r_arc = next;
        loop {
            let ce = self.beachline.item(r_arc).circle_event;
            if ce == NIL {
                break;
            }
            let (cx, cy) = {
                let c = self.circle_events.item(ce);
                (c.x, c.ycenter)
            };
            if (x - cx).abs() >= EPSILON || (y - cy).abs() >= EPSILON {
                break;
            }
            next = self.beachline.next(r_arc);
            disappearing.push(r_arc);
            detached.push(r_arc);
            self.detach_beachsection(r_arc);
            r_arc = next;
        }
        disappearing.push(r_arc);
        self.detach_circle_event(r_arc);

        // every disappearing transition ends at the collapse vertex
        for i in 1..disappearing.len() {
            let right = disappearing[i];
            let left = disappearing[i - 1];
            let l_site = self.beachline.item(left).site;
            let r_site = self.beachline.item(right).site;
            let r_edge = self.beachline.item(right).edge;
            self.set_edge_start(r_edge, l_site, r_site, vertex);
        }

        // the two surviving arcs are now adjacent: a new edge grows from
        // the collapse vertex between them
        let l_arc = disappearing[0];
        let r_arc = disappearing[disappearing.len() - 1];
        let l_site = self.beachline.item(l_arc).site;
        let r_site = self.beachline.item(r_arc).site;
        let edge = self.create_edge(l_site, r_site, None, Some(vertex));
        self.beachline.item_mut(r_arc).edge = edge;

        self.attach_circle_event(l_arc);
        self.attach_circle_event(r_arc);

        // slots are recycled only after the collapse chain has been stitched
        for arc in detached {
            self.beachline.release(arc);
        }
    }

    // ---- circle events -------------------------------------------------

    /// Schedules a collapse event for `arc` if its two neighbors converge.
    fn attach_circle_event(&mut self, arc: usize) {
        let l_arc = self.beachline.prev(arc);
        let r_arc = self.beachline.next(arc);
        if l_arc == NIL || r_arc == NIL {
            return;
        }
        let l_site = self.beachline.item(l_arc).site;
        let c_site = self.beachline.item(arc).site;
        let r_site = self.beachline.item(r_arc).site;
        if l_site == r_site {
            return;
        }

        let bx = self.sites[c_site].x;
        let by = self.sites[c_site].y;
        let ax = self.sites[l_site].x - bx;
        let ay = self.sites[l_site].y - by;
        let cx = self.sites[r_site].x - bx;
        let cy = self.sites[r_site].y - by;

        // the left-center-right sites must be clockwise for the breakpoints
        // to converge; collinear (or counter-clockwise) triples never do
        let d = 2.0 * (ax * cy - ay * cx);
        if d >= -COLLINEARITY_EPSILON {
            return;
        }

        let ha = ax * ax + ay * ay;
        let hc = cx * cx + cy * cy;
        let x = (cy * ha - ay * hc) / d;
        let y = (ax * hc - cx * ha) / d;
        let ycenter = y + by;

        // the event fires when the sweep reaches the bottom of the
        // circumcircle, not its center
        let event = CircleEvent {
            arc,
            x: x + bx,
            y: ycenter + (x * x + y * y).sqrt(),
            ycenter,
        };
        let node = self.circle_events.alloc(event);
        self.beachline.item_mut(arc).circle_event = node;

        // locate the insertion point in the event queue
        let mut predecessor = NIL;
        let mut n = self.circle_events.root();
        while n != NIL {
            let (other_x, other_y) = {
                let other = self.circle_events.item(n);
                (other.x, other.y)
            };
            if event.y < other_y || (event.y == other_y && event.x <= other_x) {
                let left = self.circle_events.left(n);
                if left != NIL {
                    n = left;
                } else {
                    predecessor = self.circle_events.prev(n);
                    break;
                }
            } else {
                let right = self.circle_events.right(n);
                if right != NIL {
                    n = right;
                } else {
                    predecessor = n;
                    break;
                }
            }
        }
        self.circle_events.insert_successor(predecessor, node);
        if predecessor == NIL {
            self.first_circle = node;
        }
    }

    fn detach_circle_event(&mut self, arc: usize) {
        let ce = self.beachline.item(arc).circle_event;
        if ce != NIL {
            if self.circle_events.prev(ce) == NIL {
                self.first_circle = self.circle_events.next(ce);
            }
            self.circle_events.remove(ce);
            self.circle_events.release(ce);
            self.beachline.item_mut(arc).circle_event = NIL;
        }
    }
}

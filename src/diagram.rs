use crate::point::Point;

/// A Voronoi edge: the segment of the perpendicular bisector between two
/// sites, or a synthetic border segment introduced while closing cells.
///
/// Sites and vertices are referenced by index into the owning
/// [Diagram]'s collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) left: usize,
    pub(crate) right: Option<usize>,
    pub(crate) start: Option<usize>,
    pub(crate) end: Option<usize>,
}

impl Edge {
    pub(crate) fn new(left: usize, right: Option<usize>) -> Self {
        Self { left, right, start: None, end: None }
    }

    /// The site on the left of this edge. Always set.
    #[inline]
    pub fn left_site(&self) -> usize {
        self.left
    }

    /// The site on the right of this edge; `None` for border edges.
    #[inline]
    pub fn right_site(&self) -> Option<usize> {
        self.right
    }

    /// Index of the start vertex (relative to the left site).
    #[inline]
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    /// Index of the end vertex (relative to the left site).
    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.end
    }
}

/// One directed traversal of an [Edge], owned by a single cell.
///
/// Two half-edges are created per internal edge (one per adjacent cell); a
/// border edge gets a single one. The polar angle around the owning site is
/// precomputed at creation and used to order the cell's boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdge {
    pub(crate) site: usize,
    pub(crate) edge: usize,
    pub(crate) angle: f64,
}

impl HalfEdge {
    /// Builds the half-edge of `site` over the bisector edge `edge` shared
    /// with `other_site`.
    pub(crate) fn new(edge: usize, site: usize, other_site: usize, sites: &[Point]) -> Self {
        let s = &sites[site];
        let o = &sites[other_site];
        Self {
            site,
            edge,
            angle: (o.y - s.y).atan2(o.x - s.x),
        }
    }

    /// Builds the single half-edge of a border edge; the angle is derived
    /// from the edge's endpoints since there is no second site.
    pub(crate) fn new_border(edge: usize, site: usize, edges: &[Edge], vertices: &[Point]) -> Self {
        let e = &edges[edge];
        let va = &vertices[e.start.expect("border edge start endpoint is set at creation")];
        let vb = &vertices[e.end.expect("border edge end endpoint is set at creation")];
        let angle = if e.left == site {
            (vb.x - va.x).atan2(va.y - vb.y)
        } else {
            (va.x - vb.x).atan2(vb.y - va.y)
        };
        Self { site, edge, angle }
    }

    /// The site owning this half-edge.
    #[inline]
    pub fn site(&self) -> usize {
        self.site
    }

    /// Index of the underlying edge in [Diagram::edges].
    #[inline]
    pub fn edge(&self) -> usize {
        self.edge
    }

    pub(crate) fn start_vertex(&self, edges: &[Edge]) -> Option<usize> {
        let e = &edges[self.edge];
        if e.left == self.site {
            e.start
        } else {
            e.end
        }
    }

    pub(crate) fn end_vertex(&self, edges: &[Edge]) -> Option<usize> {
        let e = &edges[self.edge];
        if e.left == self.site {
            e.end
        } else {
            e.start
        }
    }
}

/// A Voronoi cell: one site and the half-edges forming its polygon.
///
/// After computation the half-edges form a closed cycle sorted by descending
/// angle, which traverses the polygon clockwise in a y-up frame
/// (counter-clockwise on screen with y growing downward).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) site: usize,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) close_me: bool,
}

impl Cell {
    pub(crate) fn new(site: usize) -> Self {
        Self {
            site,
            halfedges: Vec::new(),
            close_me: false,
        }
    }

    /// The site index this cell belongs to; equals the cell's own index.
    #[inline]
    pub fn site(&self) -> usize {
        self.site
    }

    /// The ordered half-edges making up this cell's polygon.
    ///
    /// May be empty when no cell could be computed for the site (for
    /// instance a site far outside the bounding box).
    #[inline]
    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.halfedges
    }
}

/// Position of a point relative to a cell's polygon.
#[derive(PartialEq, Copy, Clone, Debug)]
pub enum PointLocation {
    Inside,
    OnBoundary,
    Outside,
}

/// The computed Voronoi diagram: vertices, edges and one cell per distinct
/// site, indexed in site processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    pub(crate) sites: Vec<Point>,
    pub(crate) vertices: Vec<Point>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) cells: Vec<Cell>,
}

impl Diagram {
    /// The distinct sites the diagram was computed for, in processing order.
    /// Duplicate input sites are collapsed into their first occurrence.
    #[inline]
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    /// All Voronoi vertices, unordered.
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// All Voronoi edges, unordered. Edges falling entirely outside the
    /// bounding box are dropped during computation.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// One cell per distinct site; `cells()[i]` corresponds to `sites()[i]`.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Gets a view over the cell at `index`.
    pub fn cell(&self, index: usize) -> VoronoiCell<'_> {
        VoronoiCell { diagram: self, index }
    }

    /// Iterates over views of all cells.
    pub fn iter_cells(&self) -> impl Iterator<Item = VoronoiCell<'_>> + Clone {
        (0..self.cells.len()).map(move |index| VoronoiCell { diagram: self, index })
    }

    /// The start point of a half-edge, for path drawing.
    pub fn half_edge_start(&self, half_edge: &HalfEdge) -> &Point {
        let v = half_edge
            .start_vertex(&self.edges)
            .expect("edges kept in cells have both endpoints set");
        &self.vertices[v]
    }

    /// The end point of a half-edge, for path drawing.
    pub fn half_edge_end(&self, half_edge: &HalfEdge) -> &Point {
        let v = half_edge
            .end_vertex(&self.edges)
            .expect("edges kept in cells have both endpoints set");
        &self.vertices[v]
    }
}

/// A view over a single cell of a [Diagram].
#[derive(Clone)]
pub struct VoronoiCell<'v> {
    diagram: &'v Diagram,
    index: usize,
}

impl<'v> VoronoiCell<'v> {
    /// The cell (and site) index.
    pub fn site(&self) -> usize {
        self.index
    }

    /// The position of this cell's site.
    pub fn site_position(&self) -> &'v Point {
        &self.diagram.sites[self.index]
    }

    /// The cell's ordered half-edges.
    pub fn half_edges(&self) -> &'v [HalfEdge] {
        &self.diagram.cells[self.index].halfedges
    }

    /// Walks the polygon's vertices in half-edge order (one vertex per
    /// half-edge; the cycle is closed, so the last edge ends at the first
    /// vertex).
    pub fn iter_vertices(&self) -> impl Iterator<Item = &'v Point> + Clone {
        let diagram = self.diagram;
        self.half_edges()
            .iter()
            .map(move |he| diagram.half_edge_start(he))
    }

    /// Sites whose cells share an edge with this one.
    pub fn iter_neighbors(&self) -> impl Iterator<Item = usize> + 'v {
        let diagram = self.diagram;
        let site = self.index;
        self.half_edges().iter().filter_map(move |he| {
            let edge = &diagram.edges[he.edge];
            if edge.left != site {
                Some(edge.left)
            } else {
                match edge.right {
                    Some(r) if r != site => Some(r),
                    _ => None,
                }
            }
        })
    }

    /// The smallest axis-aligned rectangle containing the cell, as
    /// (min corner, max corner).
    pub fn bounding_rect(&self) -> (Point, Point) {
        let mut min = Point { x: f64::INFINITY, y: f64::INFINITY };
        let mut max = Point { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
        for v in self.iter_vertices() {
            if v.x < min.x {
                min.x = v.x;
            }
            if v.y < min.y {
                min.y = v.y;
            }
            if v.x > max.x {
                max.x = v.x;
            }
            if v.y > max.y {
                max.y = v.y;
            }
        }
        (min, max)
    }

    /// Locates `point` relative to this cell's polygon. Used for
    /// hit-testing, e.g. resolving which cell a pointer event falls into.
    pub fn point_location(&self, point: &Point) -> PointLocation {
        for he in self.half_edges() {
            let p0 = self.diagram.half_edge_start(he);
            let p1 = self.diagram.half_edge_end(he);
            let r = (point.y - p0.y) * (p1.x - p0.x) - (point.x - p0.x) * (p1.y - p0.y);
            if r == 0.0 {
                return PointLocation::OnBoundary;
            }
            if r > 0.0 {
                return PointLocation::Outside;
            }
        }
        PointLocation::Inside
    }

    /// Returns whether `point` lies inside or on the boundary of this cell.
    pub fn contains(&self, point: &Point) -> bool {
        self.point_location(point) != PointLocation::Outside
    }
}

impl<'v> std::fmt::Debug for VoronoiCell<'v> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoronoiCell")
            .field("site", &self.index)
            .field("position", self.site_position())
            .field("vertices", &self.iter_vertices().collect::<Vec<_>>())
            .finish()
    }
}

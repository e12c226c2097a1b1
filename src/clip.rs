//! Diagram finalization: connects unbounded edges to the bounding box, clips
//! every edge to it and closes each cell into a valid polygon along the box
//! perimeter.

use crate::bounding_box::BoundingBox;
use crate::diagram::HalfEdge;
use crate::error::VoronoiError;
use crate::rbtree::NIL;
use crate::sweep::Voronoi;
use crate::utils::{eps_eq, eps_gt, eps_lt, EPSILON};

impl Voronoi {
    /// Runs every edge through connection, clipping and a degeneracy check.
    /// Edges rejected by any of the three are marked dead by clearing both
    /// endpoints; they are filtered out of cells and compacted away later.
    pub(crate) fn clip_edges(&mut self, bbox: &BoundingBox) {
        for edge in 0..self.edges.len() {
            let keep = self.connect_edge(edge, bbox)
                && self.clip_edge(edge, bbox)
                && !self.edge_is_degenerate(edge);
            if !keep {
                self.edges[edge].start = None;
                self.edges[edge].end = None;
            }
        }
    }

    fn edge_is_degenerate(&self, edge: usize) -> bool {
        let e = &self.edges[edge];
        match (e.start, e.end) {
            (Some(a), Some(b)) => {
                let va = &self.vertices[a];
                let vb = &self.vertices[b];
                (va.x - vb.x).abs() < EPSILON && (va.y - vb.y).abs() < EPSILON
            }
            _ => true,
        }
    }

    /// Gives a bounded extent to an edge missing one or both endpoints by
    /// extending its bisector line to the bounding box.
    ///
    /// Returns `false` when the edge lies entirely outside the box. The
    /// slope regimes are handled separately so that the dominant coordinate
    /// is always computed, never derived, which keeps the extension stable
    /// for near-vertical bisectors.
    fn connect_edge(&mut self, edge: usize, bbox: &BoundingBox) -> bool {
        if self.edges[edge].end.is_some() {
            return true;
        }

        let xl = bbox.left();
        let xr = bbox.right();
        let yt = bbox.top();
        let yb = bbox.bottom();

        let l_site = self.edges[edge].left;
        let r_site = self.edges[edge]
            .right
            .expect("edges missing endpoints are always bisectors");
        let lx = self.sites[l_site].x;
        let ly = self.sites[l_site].y;
        let rx = self.sites[r_site].x;
        let ry = self.sites[r_site].y;
        let fx = (lx + rx) / 2.0;
        let fy = (ly + ry) / 2.0;

        // an unbounded edge always reaches the border, so both cells will
        // need closing
        self.cells[l_site].close_me = true;
        self.cells[r_site].close_me = true;

        let va = self.edges[edge].start;

        let (start, end) = if ly == ry {
            // vertical bisector
            if fx < xl || fx >= xr {
                return false;
            }
            if lx > rx {
                // downward
                let start = match va {
                    Some(v) if self.vertices[v].y >= yt => {
                        if self.vertices[v].y >= yb {
                            return false;
                        }
                        v
                    }
                    _ => self.create_vertex(fx, yt),
                };
                (start, self.create_vertex(fx, yb))
            } else {
                // upward
                let start = match va {
                    Some(v) if self.vertices[v].y <= yb => {
                        if self.vertices[v].y < yt {
                            return false;
                        }
                        v
                    }
                    _ => self.create_vertex(fx, yb),
                };
                (start, self.create_vertex(fx, yt))
            }
        } else {
            let fm = (lx - rx) / (ry - ly);
            let fb = fy - fm * fx;
            if fm < -1.0 || fm > 1.0 {
                // steep bisector: solve x from y
                if lx > rx {
                    let start = match va {
                        Some(v) if self.vertices[v].y >= yt => {
                            if self.vertices[v].y >= yb {
                                return false;
                            }
                            v
                        }
                        _ => self.create_vertex((yt - fb) / fm, yt),
                    };
                    (start, self.create_vertex((yb - fb) / fm, yb))
                } else {
                    let start = match va {
                        Some(v) if self.vertices[v].y <= yb => {
                            if self.vertices[v].y < yt {
                                return false;
                            }
                            v
                        }
                        _ => self.create_vertex((yb - fb) / fm, yb),
                    };
                    (start, self.create_vertex((yt - fb) / fm, yt))
                }
            } else {
                // shallow bisector: solve y from x
                if ly < ry {
                    let start = match va {
                        Some(v) if self.vertices[v].x >= xl => {
                            if self.vertices[v].x >= xr {
                                return false;
                            }
                            v
                        }
                        _ => self.create_vertex(xl, fm * xl + fb),
                    };
                    (start, self.create_vertex(xr, fm * xr + fb))
                } else {
                    let start = match va {
                        Some(v) if self.vertices[v].x <= xr => {
                            if self.vertices[v].x < xl {
                                return false;
                            }
                            v
                        }
                        _ => self.create_vertex(xr, fm * xr + fb),
                    };
                    (start, self.create_vertex(xl, fm * xl + fb))
                }
            }
        };

        self.edges[edge].start = Some(start);
        self.edges[edge].end = Some(end);
        true
    }

    /// Liang-Barsky clipping of a bounded edge against the box. Returns
    /// `false` when the segment lies entirely outside. New vertices are
    /// created for clipped endpoints and the affected cells are flagged
    /// for closing.
    fn clip_edge(&mut self, edge: usize, bbox: &BoundingBox) -> bool {
        let (ax, ay, bx, by) = {
            let e = &self.edges[edge];
            let va = &self.vertices[e.start.expect("connected edges have a start")];
            let vb = &self.vertices[e.end.expect("connected edges have an end")];
            (va.x, va.y, vb.x, vb.y)
        };
        let mut t0 = 0.0;
        let mut t1 = 1.0;
        let dx = bx - ax;
        let dy = by - ay;

        // left
        let q = ax - bbox.left();
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        if dx < 0.0 {
            let r = -q / dx;
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        } else if dx > 0.0 {
            let r = -q / dx;
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        }

        // right
        let q = bbox.right() - ax;
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        if dx < 0.0 {
            let r = q / dx;
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        } else if dx > 0.0 {
            let r = q / dx;
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        }

        // top
        let q = ay - bbox.top();
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        if dy < 0.0 {
            let r = -q / dy;
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        } else if dy > 0.0 {
            let r = -q / dy;
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        }

        // bottom
        let q = bbox.bottom() - ay;
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        if dy < 0.0 {
            let r = q / dy;
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        } else if dy > 0.0 {
            let r = q / dy;
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        }

        if t0 > 0.0 {
            let v = self.create_vertex(ax + t0 * dx, ay + t0 * dy);
            self.edges[edge].start = Some(v);
        }
        if t1 < 1.0 {
            let v = self.create_vertex(ax + t1 * dx, ay + t1 * dy);
            self.edges[edge].end = Some(v);
        }
        if t0 > 0.0 || t1 < 1.0 {
            self.cells[self.edges[edge].left].close_me = true;
            if let Some(r_site) = self.edges[edge].right {
                self.cells[r_site].close_me = true;
            }
        }
        true
    }

    /// Closes every flagged cell by walking the bounding box perimeter
    /// between consecutive half-edges that do not touch, inserting border
    /// edges (splitting them at the corners passed along the way).
    ///
    /// The walk follows the polygon winding: down the left side, right
    /// along the bottom, up the right side and left along the top.
    pub(crate) fn close_cells(&mut self, bbox: &BoundingBox) -> Result<(), VoronoiError> {
        let xl = bbox.left();
        let xr = bbox.right();
        let yt = bbox.top();
        let yb = bbox.bottom();

        // a lone cell has no bisectors at all; it covers the whole box
        if self.cells.len() == 1 {
            self.close_lone_cell(bbox);
        }

        for cell_index in 0..self.cells.len() {
            if self.prepare_halfedges(cell_index) == 0 {
                continue;
            }
            if !self.cells[cell_index].close_me {
                continue;
            }

            let site = self.cells[cell_index].site;
            let mut i_left = 0;
            while i_left < self.cells[cell_index].halfedges.len() {
                let n = self.cells[cell_index].halfedges.len();
                let (mut va_idx, mut va_x, mut va_y, vz_x, vz_y) = {
                    let halfedges = &self.cells[cell_index].halfedges;
                    let va = halfedges[i_left]
                        .end_vertex(&self.edges)
                        .expect("prepared half-edges have both endpoints");
                    let vz = halfedges[(i_left + 1) % n]
                        .start_vertex(&self.edges)
                        .expect("prepared half-edges have both endpoints");
                    (
                        va,
                        self.vertices[va].x,
                        self.vertices[va].y,
                        self.vertices[vz].x,
                        self.vertices[vz].y,
                    )
                };

                if (va_x - vz_x).abs() >= EPSILON || (va_y - vz_y).abs() >= EPSILON {
                    // the polygon is open between va and vz; both lie on the
                    // border, so bridge the gap along the perimeter
                    let mut segments = 0;
                    loop {
                        // at most one segment per side plus the closing one
                        segments += 1;
                        if segments > 5 {
                            return Err(VoronoiError::CellClosingFailed { cell: cell_index });
                        }

                        let (vb_x, vb_y, last) = if eps_eq(va_x, xl) && eps_lt(va_y, yb) {
                            // down the left side
                            let last = eps_eq(vz_x, xl);
                            (xl, if last { vz_y } else { yb }, last)
                        } else if eps_eq(va_y, yb) && eps_lt(va_x, xr) {
                            // right along the bottom side
                            let last = eps_eq(vz_y, yb);
                            (if last { vz_x } else { xr }, yb, last)
                        } else if eps_eq(va_x, xr) && eps_gt(va_y, yt) {
                            // up the right side
                            let last = eps_eq(vz_x, xr);
                            (xr, if last { vz_y } else { yt }, last)
                        } else if eps_eq(va_y, yt) && eps_gt(va_x, xl) {
                            // left along the top side
                            let last = eps_eq(vz_y, yt);
                            (if last { vz_x } else { xl }, yt, last)
                        } else {
                            return Err(VoronoiError::CellClosingFailed { cell: cell_index });
                        };

                        let vb_idx = self.create_vertex(vb_x, vb_y);
                        let edge = self.create_border_edge(site, va_idx, vb_idx);
                        let halfedge =
                            HalfEdge::new_border(edge, site, &self.edges, &self.vertices);
                        i_left += 1;
                        self.cells[cell_index].halfedges.insert(i_left, halfedge);
                        if last {
                            break;
                        }
                        va_idx = vb_idx;
                        va_x = vb_x;
                        va_y = vb_y;
                    }
                }
                i_left += 1;
            }
            self.cells[cell_index].close_me = false;
        }
        Ok(())
    }

    /// Builds the full bounding box polygon for the only cell of a
    /// single-site diagram, in the same winding the angle sort produces.
    fn close_lone_cell(&mut self, bbox: &BoundingBox) {
        let corners = [
            (bbox.left(), bbox.top()),
            (bbox.left(), bbox.bottom()),
            (bbox.right(), bbox.bottom()),
            (bbox.right(), bbox.top()),
        ];
        let vertices: Vec<usize> = corners
            .iter()
            .map(|&(x, y)| self.create_vertex(x, y))
            .collect();
        for i in 0..4 {
            let edge = self.create_border_edge(0, vertices[i], vertices[(i + 1) % 4]);
            let halfedge = HalfEdge::new_border(edge, 0, &self.edges, &self.vertices);
            self.cells[0].halfedges.push(halfedge);
        }
    }

    /// Drops half-edges whose edge was killed by clipping and sorts the
    /// remainder by descending angle, yielding the cell's boundary order.
    /// Returns how many half-edges remain.
    fn prepare_halfedges(&mut self, cell_index: usize) -> usize {
        let edges = &self.edges;
        let halfedges = &mut self.cells[cell_index].halfedges;
        halfedges.retain(|he| {
            let e = &edges[he.edge];
            e.start.is_some() && e.end.is_some()
        });
        halfedges.sort_unstable_by(|a, b| b.angle.total_cmp(&a.angle));
        halfedges.len()
    }

    /// Removes dead edges and remaps half-edge indices to the compacted
    /// edge list. Runs after cells are closed, so every surviving half-edge
    /// points at a live edge.
    pub(crate) fn compact_edges(&mut self) {
        let mut remap = vec![NIL; self.edges.len()];
        let mut kept = 0;
        for i in 0..self.edges.len() {
            if self.edges[i].start.is_some() && self.edges[i].end.is_some() {
                self.edges.swap(kept, i);
                remap[i] = kept;
                kept += 1;
            }
        }
        self.edges.truncate(kept);
        for cell in &mut self.cells {
            for he in &mut cell.halfedges {
                he.edge = remap[he.edge];
            }
        }
    }
}

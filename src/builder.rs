use crate::bounding_box::BoundingBox;
use crate::diagram::Diagram;
use crate::error::VoronoiError;
use crate::point::Point;
use crate::sweep::Voronoi;

/// Provides a convenient way to construct a Voronoi diagram.
#[derive(Default)]
pub struct VoronoiBuilder {
    sites: Option<Vec<Point>>,
    bounding_box: BoundingBox,
}

impl VoronoiBuilder {
    /// Sets the [BoundingBox] that will be used to clip and close the diagram.
    pub fn set_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Sets a vector of [Point]s representing the sites of each Voronoi cell that should be constructed.
    pub fn set_sites(mut self, sites: Vec<Point>) -> Self {
        self.sites.replace(sites);
        self
    }

    /// Consumes this builder and computes the [Diagram].
    ///
    /// An empty (or missing) site set is valid and produces an empty diagram.
    pub fn build(mut self) -> Result<Diagram, VoronoiError> {
        let sites = self.sites.take().unwrap_or_default();
        Voronoi::new().compute(&sites, &self.bounding_box)
    }

    /// Generates sites in the format of a circle centered at the origin with ```size``` points and radius ```radius```.
    /// Internally calls [Self::set_sites] with the generated value.
    pub fn generate_circle_sites(self, size: usize, radius: f64) -> Self {
        let mut sites = vec![];
        sites.push(Point { x: 0.0, y: 0.0 });
        for i in 0..size {
            let a = (i as f64 * 360.0 / size as f64).to_radians();
            sites.push(Point {
                x: radius * a.sin(),
                y: radius * a.cos(),
            });
        }

        self.set_sites(sites)
    }

    /// Generates sites in the format of a rectangle centered at the origin with ```width``` and ```height``` and ```width``` times ```height``` points.
    /// Internally calls [Self::set_sites] with the generated value.
    pub fn generate_rect_sites(self, width: usize, height: usize) -> Self {
        let mut sites = vec![];
        let fwidth = width as f64;
        let fheight = height as f64;

        for i in 0..width {
            for j in 0..height {
                sites.push(Point {
                    x: i as f64 / fwidth - 0.5,
                    y: j as f64 / fheight - 0.5,
                });
            }
        }
        self.set_sites(sites)
    }

    /// Generates sites in the format of a square centered at the origin with ```width``` and ```width``` square points.
    /// Internally calls [Self::set_sites] with the generated value.
    pub fn generate_square_sites(self, width: usize) -> Self {
        self.generate_rect_sites(width, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_sites_yields_empty_diagram() {
        let diagram = VoronoiBuilder::default().build().expect("empty input is valid");
        assert_eq!(0, diagram.sites().len());
        assert_eq!(0, diagram.cells().len());
        assert_eq!(0, diagram.edges().len());
    }

    #[test]
    fn generated_square_sites_fit_default_box() {
        let diagram = VoronoiBuilder::default()
            .generate_square_sites(10)
            .build()
            .expect("grid sites produce a valid diagram");
        assert_eq!(100, diagram.cells().len());
    }

    #[test]
    fn degenerate_bounding_box_is_rejected() {
        let result = VoronoiBuilder::default()
            .set_sites(vec![Point { x: 0.0, y: 0.0 }])
            .set_bounding_box(BoundingBox::new(1.0, 1.0, 0.0, 2.0))
            .build();
        assert_eq!(Err(VoronoiError::InvalidBoundingBox), result);
    }
}

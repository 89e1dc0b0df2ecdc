use std::collections::HashMap;

use chrono::NaiveDate;
use h3o::CellIndex;
use image::RgbaImage;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::error::{PipelineError, Result};
use crate::pipeline::CellLookup;
use crate::render::palette::{ColorDomain, Palette, BACKGROUND_COLOR, OUTLINE_COLOR};
use crate::utils::constants::FRAME_FILE_PREFIX;

/// One rendered map image for a single date.
#[derive(Debug, Clone)]
pub struct Frame {
    pub date: NaiveDate,
    pub image: RgbaImage,
}

impl Frame {
    /// Deterministic date-stamped file name, so frame ordering stays
    /// derivable downstream.
    pub fn file_name(&self) -> String {
        format!("{}{}.png", FRAME_FILE_PREFIX, self.date.format("%Y-%m-%d"))
    }
}

/// Geographic extent covered by the rendered map, in degrees.
#[derive(Debug, Clone, Copy)]
struct MapBounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

/// Draws one frame per date from the smoothed cell values.
///
/// Frames carry no cross-date state beyond the fixed color domain, so
/// they can be rendered independently and in any order.
pub struct FrameRenderer<'a> {
    width: u32,
    height: u32,
    lookup: &'a CellLookup,
    domain: ColorDomain,
    bounds: MapBounds,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(
        width: u32,
        height: u32,
        lookup: &'a CellLookup,
        domain: ColorDomain,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::Render(format!(
                "Degenerate frame size {width}x{height}"
            )));
        }
        let bounds = compute_bounds(lookup)?;
        Ok(Self {
            width,
            height,
            lookup,
            domain,
            bounds,
        })
    }

    pub fn domain(&self) -> ColorDomain {
        self.domain
    }

    /// Render the map for one date. Cells without a value for the date
    /// get the neutral fill.
    pub fn render(&self, date: NaiveDate, values: &HashMap<CellIndex, f64>) -> Result<Frame> {
        let mut image = RgbaImage::from_pixel(self.width, self.height, BACKGROUND_COLOR);

        for cell in self.lookup.cells() {
            let Some(polygon) = self.lookup.geometry(cell) else {
                continue;
            };

            let mut points: Vec<Point<i32>> = Vec::with_capacity(polygon.vertices.len());
            for &(lat, lon) in &polygon.vertices {
                let point = self.project(lat, lon);
                if points.last() != Some(&point) {
                    points.push(point);
                }
            }
            // draw_polygon_mut rejects closed rings and needs area.
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            if points.len() < 3 {
                continue;
            }

            let color = Palette::color_for(&self.domain, values.get(&cell).copied());
            draw_polygon_mut(&mut image, &points, color);

            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                draw_line_segment_mut(
                    &mut image,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    OUTLINE_COLOR,
                );
            }
        }

        Ok(Frame { date, image })
    }

    fn project(&self, lat: f64, lon: f64) -> Point<i32> {
        let lon_span = (self.bounds.max_lon - self.bounds.min_lon).max(f64::EPSILON);
        let lat_span = (self.bounds.max_lat - self.bounds.min_lat).max(f64::EPSILON);

        let x = (lon - self.bounds.min_lon) / lon_span * (self.width - 1) as f64;
        let y = (self.bounds.max_lat - lat) / lat_span * (self.height - 1) as f64;

        Point::new(x.round() as i32, y.round() as i32)
    }
}

/// Bounding box of every cell polygon, widened by a small margin.
fn compute_bounds(lookup: &CellLookup) -> Result<MapBounds> {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;

    for cell in lookup.cells() {
        if let Some(polygon) = lookup.geometry(cell) {
            for &(lat, lon) in &polygon.vertices {
                min_lat = min_lat.min(lat);
                max_lat = max_lat.max(lat);
                min_lon = min_lon.min(lon);
                max_lon = max_lon.max(lon);
            }
        }
    }

    if min_lat > max_lat {
        return Err(PipelineError::Render(
            "No cell geometry to derive map bounds from".to_string(),
        ));
    }

    let lat_margin = (max_lat - min_lat).max(0.1) * 0.05;
    let lon_margin = (max_lon - min_lon).max(0.1) * 0.05;

    Ok(MapBounds {
        min_lat: min_lat - lat_margin,
        max_lat: max_lat + lat_margin,
        min_lon: min_lon - lon_margin,
        max_lon: max_lon + lon_margin,
    })
}

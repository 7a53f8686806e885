//! Types used by layers to draw themselves onto the screen.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cartesian::{Point2d, Rect, Size};
use crate::color::Color;
use crate::error::MercalliError;

/// Style of a line or an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePaint {
    /// Color of the line.
    pub color: Color,
    /// Width of the line in pixels.
    pub width: f64,
}

/// Style of a circle marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePaint {
    /// Fill color of the circle.
    pub fill: Color,
    /// Radius of the circle in pixels.
    pub radius: f64,
    /// Outline of the circle, if any.
    pub outline: Option<LinePaint>,
}

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(0);

/// Image decoded into a bitmap and ready to be drawn.
///
/// Every decoded image gets an id unique within the process. Canvas implementations
/// use the id to avoid uploading the same image to the GPU on every frame.
pub struct DecodedImage {
    id: u64,
    bytes: Vec<u8>,
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decodes an image from a byte slice in PNG or JPEG format.
    pub fn new(bytes: &[u8]) -> Result<Self, MercalliError> {
        let decoded = image::load_from_memory(bytes)?;
        let rgba = decoded.to_rgba8();
        let dimensions = rgba.dimensions();

        Ok(Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            bytes: rgba.into_raw(),
            dimensions,
        })
    }

    /// Creates an image from a raw RGBA8 buffer.
    ///
    /// Returns an error if the buffer length does not match the dimensions.
    pub fn from_rgba8(bytes: Vec<u8>, width: u32, height: u32) -> Result<Self, MercalliError> {
        if bytes.len() != (width as usize) * (height as usize) * 4 {
            return Err(MercalliError::Generic(format!(
                "invalid buffer size {} for dimensions {width}x{height}",
                bytes.len()
            )));
        }

        Ok(Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            bytes,
            dimensions: (width, height),
        })
    }

    /// Process-unique id of the image.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Raw RGBA8 pixel data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }
}

/// Target the layers draw themselves onto.
///
/// All coordinates are in screen pixels with the origin at the top left corner of the
/// map widget. Implementations must silently skip primitives that cannot be drawn:
/// circles with a non-finite or non-positive radius and contours with less than two
/// points.
pub trait Canvas {
    /// Size of the drawing area in pixels.
    fn size(&self) -> Size;

    /// Draws an image into the given screen rectangle.
    ///
    /// `opacity` of 255 draws the image as is, lower values make it translucent.
    fn draw_image(&mut self, image: &DecodedImage, rect: Rect, opacity: u8);

    /// Draws a circle marker centered at the given screen point.
    fn draw_circle(&mut self, center: Point2d, paint: CirclePaint);

    /// Draws a polyline through the given screen points.
    fn draw_contour(&mut self, points: &[Point2d], paint: LinePaint);
}

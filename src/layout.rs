//! Page geometry: mediaboxes, standard page sizes and stamp placement

use lopdf::Object;

/// US Letter in points, used when a page declares no mediabox at all
pub const LETTER_POINTS: (f32, f32) = (612.0, 792.0);

/// A page's visible area in PDF user space (points, origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    /// A mediabox anchored at the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self { llx: 0.0, lly: 0.0, urx: width, ury: height }
    }

    pub fn letter() -> Self {
        Self::new(LETTER_POINTS.0, LETTER_POINTS.1)
    }

    pub fn width(&self) -> f32 {
        (self.urx - self.llx).abs()
    }

    pub fn height(&self) -> f32 {
        (self.ury - self.lly).abs()
    }

    /// Parse a `[llx lly urx ury]` array. Corners may be given in any order.
    pub fn from_object(object: &Object) -> Option<Self> {
        let Object::Array(values) = object else {
            return None;
        };
        if values.len() != 4 {
            return None;
        }

        let nums: Vec<f32> = values.iter().filter_map(number_value).collect();
        if nums.len() != 4 {
            return None;
        }

        Some(Self {
            llx: nums[0].min(nums[2]),
            lly: nums[1].min(nums[3]),
            urx: nums[0].max(nums[2]),
            ury: nums[1].max(nums[3]),
        })
    }

    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

fn number_value(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Standard page sizes for generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PageSize {
    /// US Letter (8.5" × 11")
    #[default]
    Letter,
    /// A4 (210mm × 297mm)
    A4,
}

impl PageSize {
    /// Width and height in points (1/72 inch)
    pub fn points(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => LETTER_POINTS,
            PageSize::A4 => (mm_to_pt(210.0), mm_to_pt(297.0)),
        }
    }

    pub fn media_box(&self) -> MediaBox {
        let (width, height) = self.points();
        MediaBox::new(width, height)
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Where the text origin of a page number goes on a given page.
///
/// Offsets are measured from the mediabox's right and bottom edges, so pages of
/// different sizes (or with a shifted origin) each get their own placement.
pub fn number_position(media_box: &MediaBox, right_offset: f32, bottom_offset: f32) -> (f32, f32) {
    (
        media_box.llx + media_box.width() - right_offset,
        media_box.lly + bottom_offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_size() {
        let (w, h) = PageSize::Letter.points();
        assert_eq!(w, 612.0);
        assert_eq!(h, 792.0);
    }

    #[test]
    fn test_a4_size() {
        let (w, h) = PageSize::A4.points();
        // 210mm ≈ 595.28pt, 297mm ≈ 841.89pt
        assert!((w - 595.28).abs() < 0.1);
        assert!((h - 841.89).abs() < 0.1);
    }

    #[test]
    fn test_media_box_from_mixed_numbers() {
        let object = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(400.0),
            Object::Integer(600),
        ]);
        let media_box = MediaBox::from_object(&object).unwrap();
        assert_eq!(media_box.width(), 400.0);
        assert_eq!(media_box.height(), 600.0);
    }

    #[test]
    fn test_media_box_normalizes_corner_order() {
        let object = Object::Array(vec![
            Object::Integer(410),
            Object::Integer(620),
            Object::Integer(10),
            Object::Integer(20),
        ]);
        let media_box = MediaBox::from_object(&object).unwrap();
        assert_eq!(media_box, MediaBox { llx: 10.0, lly: 20.0, urx: 410.0, ury: 620.0 });
    }

    #[test]
    fn test_media_box_rejects_malformed_arrays() {
        assert!(MediaBox::from_object(&Object::Integer(3)).is_none());
        assert!(MediaBox::from_object(&Object::Array(vec![Object::Integer(0); 3])).is_none());
        let with_name = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"Wide".to_vec()),
            Object::Integer(10),
        ]);
        assert!(MediaBox::from_object(&with_name).is_none());
    }

    #[test]
    fn test_number_position_bottom_right() {
        let (x, y) = number_position(&MediaBox::letter(), 50.0, 30.0);
        assert_eq!(x, 562.0);
        assert_eq!(y, 30.0);
    }

    #[test]
    fn test_number_position_follows_shifted_origin() {
        let media_box = MediaBox { llx: 10.0, lly: 20.0, urx: 410.0, ury: 620.0 };
        let (x, y) = number_position(&media_box, 50.0, 30.0);
        assert_eq!(x, 360.0);
        assert_eq!(y, 50.0);
    }
}

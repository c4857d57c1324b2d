//! Decoded images ready to paint into terminal cells.

use image::imageops::FilterType;
use std::sync::Mutex;

const ARTWORK_W: u32 = 64;
const ARTWORK_H: u32 = 64;

/// Compact RGBA image at a fixed size, resized again at render time.
#[derive(Debug)]
pub struct Artwork {
    pub w: u32,
    pub h: u32,
    /// RGBA pixels in row-major order (len = w*h*4)
    pub pixels: Vec<u8>,
    // last rows handed out, keyed by their size
    rendered: Mutex<Option<(u32, u32, Vec<Vec<Pixel>>)>>,
}

impl Clone for Artwork {
    fn clone(&self) -> Self {
        Self::from_rgba(self.w, self.h, self.pixels.clone())
    }
}

impl PartialEq for Artwork {
    fn eq(&self, other: &Self) -> bool {
        self.w == other.w && self.h == other.h && self.pixels == other.pixels
    }
}

impl Eq for Artwork {}

/// One terminal cell; `None` where the source pixel is transparent.
pub type Pixel = Option<(u8, u8, u8)>;

impl Artwork {
    /// Decode PNG (or any format `image` knows) bytes. Returns `None` for
    /// bytes that are not an image.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let img = image::load_from_memory(bytes).ok()?;
        let small = image::imageops::resize(
            &img.to_rgba8(),
            ARTWORK_W,
            ARTWORK_H,
            FilterType::Lanczos3,
        );
        Some(Self::from_rgba(small.width(), small.height(), small.into_raw()))
    }

    fn from_rgba(w: u32, h: u32, pixels: Vec<u8>) -> Self {
        Self {
            w,
            h,
            pixels,
            rendered: Mutex::new(None),
        }
    }

    /// Pixel rows sized `w` x `h`. Repeated calls with the same size reuse
    /// the previous resize.
    pub fn rows(&self, w: u32, h: u32) -> Vec<Vec<Pixel>> {
        let w = w.max(1);
        let h = h.max(1);
        if let Ok(rendered) = self.rendered.lock() {
            if let Some((rw, rh, rows)) = rendered.as_ref() {
                if *rw == w && *rh == h {
                    return rows.clone();
                }
            }
        }

        let rows = self.resize_rows(w, h);
        if let Ok(mut rendered) = self.rendered.lock() {
            *rendered = Some((w, h, rows.clone()));
        }
        rows
    }

    #[cfg(test)]
    fn rendered_size(&self) -> Option<(u32, u32)> {
        let rendered = self.rendered.lock().unwrap();
        rendered.as_ref().map(|(w, h, _)| (*w, *h))
    }

    fn resize_rows(&self, w: u32, h: u32) -> Vec<Vec<Pixel>> {
        let resized = if self.w == w && self.h == h {
            None
        } else {
            let buf = image::RgbaImage::from_raw(self.w, self.h, self.pixels.clone());
            buf.map(|b| image::imageops::resize(&b, w, h, FilterType::Triangle))
        };

        let (src_w, src_h, src): (u32, u32, &[u8]) = match &resized {
            Some(img) => (img.width(), img.height(), img.as_raw()),
            None => (self.w, self.h, &self.pixels),
        };

        let mut rows = Vec::with_capacity(src_h as usize);
        for y in 0..src_h {
            let mut row = Vec::with_capacity(src_w as usize);
            for x in 0..src_w {
                let idx = ((y * src_w + x) * 4) as usize;
                let px = &src[idx..idx + 4];
                if px[3] < 128 {
                    row.push(None);
                } else {
                    row.push(Some((px[0], px[1], px[2])));
                }
            }
            rows.push(row);
        }
        rows
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// A 4x4 PNG: left half opaque red, right half transparent.
    pub(crate) fn sample_png() -> Vec<u8> {
        let mut img = RgbaImage::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let px = if x < 2 {
                    Rgba([255, 0, 0, 255])
                } else {
                    Rgba([0, 0, 0, 0])
                };
                img.put_pixel(x, y, px);
            }
        }
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_resizes_to_canonical_size() {
        let art = Artwork::decode(&sample_png()).unwrap();
        assert_eq!((art.w, art.h), (ARTWORK_W, ARTWORK_H));
        assert_eq!(art.pixels.len(), (ARTWORK_W * ARTWORK_H * 4) as usize);
    }

    #[test]
    fn test_decode_rejects_non_image() {
        assert!(Artwork::decode(b"not a png").is_none());
    }

    #[test]
    fn test_rows_keep_transparency() {
        let art = Artwork::decode(&sample_png()).unwrap();
        let rows = art.rows(8, 4);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].len(), 8);
        assert!(rows[0][0].is_some());
        assert!(rows[0][7].is_none());
    }

    #[test]
    fn test_rows_reuse_last_size() {
        let art = Artwork::decode(&sample_png()).unwrap();
        assert_eq!(art.rendered_size(), None);
        let first = art.rows(8, 4);
        assert_eq!(art.rendered_size(), Some((8, 4)));
        assert_eq!(art.rows(8, 4), first);

        art.rows(6, 6);
        assert_eq!(art.rendered_size(), Some((6, 6)));
        // clones start without a cached render but compare equal
        let copy = art.clone();
        assert_eq!(copy.rendered_size(), None);
        assert_eq!(copy, art);
    }
}

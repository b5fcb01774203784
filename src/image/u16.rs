//! 16-bit single-channel slice images.
//!
//! `ImageU16` borrows pixels with an explicit stride so callers can hand in
//! sub-windows of larger buffers; `GrayImageU16` owns a tightly packed buffer
//! (stride == width) and is what reslicing and file loading produce.

/// Borrowed 16-bit grayscale view.
#[derive(Clone, Debug)]
pub struct ImageU16<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // elements between rows
    pub data: &'a [u16],
}

impl<'a> ImageU16<'a> {
    /// Tightly packed view over `data` (stride == width).
    pub fn packed(w: usize, h: usize, data: &'a [u16]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.data[y * self.stride + x]
    }

    /// Minimum buffer length for `h` rows of `stride` elements, `None` on overflow.
    pub fn required_len(&self) -> Option<usize> {
        if self.w == 0 || self.h == 0 {
            return Some(0);
        }
        (self.h - 1).checked_mul(self.stride)?.checked_add(self.w)
    }

    /// True when `data` is long enough for `h` rows of `stride` elements.
    pub fn is_well_formed(&self) -> bool {
        if self.w == 0 || self.h == 0 {
            return true;
        }
        self.stride >= self.w
            && self
                .required_len()
                .is_some_and(|needed| self.data.len() >= needed)
    }
}

impl<'a> crate::image::traits::ImageView for ImageU16<'a> {
    type Pixel = u16;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u16] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u16]> {
        (self.stride == self.w).then(|| &self.data[..self.w * self.h])
    }
}

/// Owned 16-bit grayscale buffer in row-major layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImageU16 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage, `w * h` elements
    pub data: Vec<u16>,
}

impl GrayImageU16 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u16) {
        self.data[y * self.w + x] = v;
    }

    /// Borrow as a read-only `ImageU16` view
    pub fn as_view(&self) -> ImageU16<'_> {
        ImageU16::packed(self.w, self.h, &self.data)
    }
}

impl crate::image::traits::ImageView for GrayImageU16 {
    type Pixel = u16;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.w
    }
    #[inline]
    fn row(&self, y: usize) -> &[u16] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u16]> {
        Some(&self.data)
    }
}

impl crate::image::traits::ImageViewMut for GrayImageU16 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u16] {
        let start = y * self.w;
        &mut self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn strided_view_packs_rows() {
        // 2x2 window inside a 3-wide buffer
        let data = [1u16, 2, 99, 3, 4, 99];
        let view = ImageU16 {
            w: 2,
            h: 2,
            stride: 3,
            data: &data,
        };
        assert!(view.is_well_formed());
        assert!(view.as_slice().is_none());
        assert_eq!(view.to_packed(), vec![1, 2, 3, 4]);
        assert_eq!(view.get(1, 1), 4);
    }

    #[test]
    fn short_buffer_is_not_well_formed() {
        let data = [0u16; 5];
        let view = ImageU16::packed(3, 2, &data);
        assert!(!view.is_well_formed());
        assert_eq!(view.required_len(), Some(6));
    }

    #[test]
    fn huge_declared_shape_is_not_well_formed() {
        let data = [0u16; 4];
        let view = ImageU16 {
            w: 2,
            h: usize::MAX,
            stride: 4,
            data: &data,
        };
        assert_eq!(view.required_len(), None);
        assert!(!view.is_well_formed());
    }
}

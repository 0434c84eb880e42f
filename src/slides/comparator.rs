/*!
 * Pairwise frame comparison.
 *
 * Two scores are used by the segmenter:
 * - `similarity`: mean structural similarity (SSIM) of two grayscale images,
 *   used to decide whether two frames show the same slide.
 * - `quality`: variance of the Laplacian response, a sharpness proxy used to
 *   pick the best frame among near-duplicates.
 *
 * When two images are compared, the first is resized to the dimensions of
 * the second before scoring.
 */

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use log::trace;

use super::frame::SampledFrame;

/// Two frames whose similarity reaches this value show the same slide
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Side of the square SSIM window
pub const SSIM_WINDOW: usize = 7;

const SSIM_K1: f64 = 0.01;
const SSIM_K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Decides run membership and anchor replacement for the segmenter
pub trait FrameComparator {
    /// Whether `candidate` depicts the same slide as `anchor`
    fn is_same_slide(&self, anchor: &SampledFrame, candidate: &SampledFrame) -> bool;

    /// Whether `candidate` should replace `anchor` as the run's chosen frame.
    /// Only meaningful when both frames depict the same slide.
    fn is_better(&self, candidate: &SampledFrame, anchor: &SampledFrame) -> bool;
}

impl<C: FrameComparator + ?Sized> FrameComparator for &C {
    fn is_same_slide(&self, anchor: &SampledFrame, candidate: &SampledFrame) -> bool {
        (**self).is_same_slide(anchor, candidate)
    }

    fn is_better(&self, candidate: &SampledFrame, anchor: &SampledFrame) -> bool {
        (**self).is_better(candidate, anchor)
    }
}

/// SSIM for membership, Laplacian variance for selection
#[derive(Debug, Clone, Copy)]
pub struct SsimComparator {
    threshold: f64,
}

impl SsimComparator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for SsimComparator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl FrameComparator for SsimComparator {
    fn is_same_slide(&self, anchor: &SampledFrame, candidate: &SampledFrame) -> bool {
        let score = similarity(anchor.gray(), candidate.gray());
        trace!(
            "SSIM {:.4} between frame {} and frame {}",
            score, anchor.index, candidate.index
        );
        score >= self.threshold
    }

    fn is_better(&self, candidate: &SampledFrame, anchor: &SampledFrame) -> bool {
        // Both qualities are cached on the frames unless a resize is needed.
        if candidate.dimensions() == anchor.dimensions() {
            candidate.quality() > anchor.quality()
        } else {
            is_better(candidate.gray(), anchor.gray())
        }
    }
}

/// Convert to 8-bit luma with ITU-R BT.601 weights, rounding to nearest
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        let luma = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000;
        *dst = Luma([luma as u8]);
    }
    gray
}

fn match_dimensions(image: &GrayImage, (width, height): (u32, u32)) -> Cow<'_, GrayImage> {
    if image.dimensions() == (width, height) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(imageops::resize(image, width, height, FilterType::Triangle))
    }
}

/// Mean SSIM of `a` (resized to `b`) against `b`, in `[-1, 1]`
pub fn similarity(a: &GrayImage, b: &GrayImage) -> f64 {
    let (width, height) = b.dimensions();
    if width == 0 || height == 0 {
        return 1.0;
    }

    let a = match_dimensions(a, (width, height));
    let (width, height) = (width as usize, height as usize);

    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        mean_ssim(a.as_raw(), b.as_raw(), width, height, width, height)
    } else {
        mean_ssim(a.as_raw(), b.as_raw(), width, height, SSIM_WINDOW, SSIM_WINDOW)
    }
}

/// Laplacian variance of a grayscale image (0 for flat images)
pub fn quality(image: &GrayImage) -> f64 {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return 0.0;
    }

    let pixels = image.as_raw();
    let at = |x: isize, y: isize| -> f64 {
        pixels[reflect_101(y, height) * width + reflect_101(x, width)] as f64
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..height as isize {
        for x in 0..width as isize {
            let response =
                at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let n = (width * height) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Whether `candidate`, resized to the anchor's size, is sharper than `anchor`
pub fn is_better(candidate: &GrayImage, anchor: &GrayImage) -> bool {
    let candidate = match_dimensions(candidate, anchor.dimensions());
    quality(&candidate) > quality(anchor)
}

/// Border handling that mirrors around the edge pixel without repeating it
fn reflect_101(i: isize, len: usize) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }
    let reflected = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    reflected.clamp(0, len - 1) as usize
}

/// Sums over one window: x, y, x², y², xy
type WindowSums = [u64; 5];

fn add_row(columns: &mut [WindowSums], row_a: &[u8], row_b: &[u8]) {
    for ((column, &a), &b) in columns.iter_mut().zip(row_a).zip(row_b) {
        let (a, b) = (a as u64, b as u64);
        column[0] += a;
        column[1] += b;
        column[2] += a * a;
        column[3] += b * b;
        column[4] += a * b;
    }
}

fn remove_row(columns: &mut [WindowSums], row_a: &[u8], row_b: &[u8]) {
    for ((column, &a), &b) in columns.iter_mut().zip(row_a).zip(row_b) {
        let (a, b) = (a as u64, b as u64);
        column[0] -= a;
        column[1] -= b;
        column[2] -= a * a;
        column[3] -= b * b;
        column[4] -= a * b;
    }
}

/// Sliding-window SSIM averaged over every window position that fits in the
/// image. Column sums are maintained over the last `win_h` rows, so memory
/// stays proportional to the image width.
fn mean_ssim(
    a: &[u8],
    b: &[u8],
    width: usize,
    height: usize,
    win_w: usize,
    win_h: usize,
) -> f64 {
    let n = (win_w * win_h) as f64;
    let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };
    let c1 = (SSIM_K1 * DATA_RANGE).powi(2);
    let c2 = (SSIM_K2 * DATA_RANGE).powi(2);

    let row = |y: usize| y * width..(y + 1) * width;

    let mut columns = vec![[0u64; 5]; width];
    let mut total = 0.0;
    let mut windows = 0u64;

    for y in 0..height {
        add_row(&mut columns, &a[row(y)], &b[row(y)]);
        if y >= win_h {
            let old = y - win_h;
            remove_row(&mut columns, &a[row(old)], &b[row(old)]);
        }
        if y + 1 < win_h {
            continue;
        }

        let mut acc: WindowSums = [0; 5];
        for x in 0..width {
            for (slot, value) in acc.iter_mut().zip(columns[x]) {
                *slot += value;
            }
            if x >= win_w {
                for (slot, value) in acc.iter_mut().zip(columns[x - win_w]) {
                    *slot -= value;
                }
            }
            if x + 1 >= win_w {
                total += window_ssim(&acc, n, cov_norm, c1, c2);
                windows += 1;
            }
        }
    }

    if windows == 0 {
        return 1.0;
    }
    total / windows as f64
}

fn window_ssim(sums: &WindowSums, n: f64, cov_norm: f64, c1: f64, c2: f64) -> f64 {
    let [sx, sy, sxx, syy, sxy] = sums.map(|v| v as f64);
    let mean_x = sx / n;
    let mean_y = sy / n;
    let var_x = (sxx / n - mean_x * mean_x) * cov_norm;
    let var_y = (syy / n - mean_y * mean_y) * cov_norm;
    let cov_xy = (sxy / n - mean_x * mean_y) * cov_norm;

    let numerator = (2.0 * mean_x * mean_y + c1) * (2.0 * cov_xy + c2);
    let denominator = (mean_x * mean_x + mean_y * mean_y + c1) * (var_x + var_y + c2);
    numerator / denominator
}

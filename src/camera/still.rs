//! Frame conversion: live camera frames to encoded still images.

use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use nokhwa::pixel_format::RgbFormat;

use super::types::{CameraError, Frame};

/// An encoded still image frozen from a live camera frame.
///
/// The data is lossy JPEG; the pixel dimensions are kept so callers can
/// report what was captured without decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// JPEG-encoded image bytes
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which automatically converts from
/// the camera's native format to RGB.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn frame_from_buffer(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        timestamp: Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right).
///
/// Applied to front-camera frames so the frozen still matches what the
/// user saw, un-mirrored from the sensor's raw orientation.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = Frame::BYTES_PER_PIXEL;

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        // Swap pixels from left and right
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Encode an RGB frame as a JPEG still.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<CapturedImage, CameraError> {
    let mut data = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut data, quality);
    encoder
        .encode(
            &frame.data,
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CameraError::EncodeFailed(e.to_string()))?;

    Ok(CapturedImage {
        data,
        width: frame.width,
        height: frame.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_frame(data: Vec<u8>, width: u32, height: u32) -> Frame {
        Frame {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_mirror_horizontal_2x1() {
        // Simple 2x1 image: pixel A (R=1,G=2,B=3) and pixel B (R=4,G=5,B=6)
        let mut frame = rgb_frame(vec![1, 2, 3, 4, 5, 6], 2, 1);
        mirror_horizontal(&mut frame);
        // After mirroring: pixel B, pixel A
        assert_eq!(frame.data, vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_mirror_horizontal_3x2() {
        // 3x2 image:
        // Row 0: [A, B, C]
        // Row 1: [D, E, F]
        let mut frame = rgb_frame(
            vec![
                1, 1, 1, 2, 2, 2, 3, 3, 3, // Row 0: A, B, C
                4, 4, 4, 5, 5, 5, 6, 6, 6, // Row 1: D, E, F
            ],
            3,
            2,
        );
        mirror_horizontal(&mut frame);
        // After mirroring:
        // Row 0: [C, B, A]
        // Row 1: [F, E, D]
        assert_eq!(
            frame.data,
            vec![
                3, 3, 3, 2, 2, 2, 1, 1, 1, // Row 0: C, B, A
                6, 6, 6, 5, 5, 5, 4, 4, 4, // Row 1: F, E, D
            ]
        );
    }

    #[test]
    fn test_mirror_horizontal_single_pixel() {
        // Edge case: 1x1 image should remain unchanged
        let mut frame = rgb_frame(vec![1, 2, 3], 1, 1);
        mirror_horizontal(&mut frame);
        assert_eq!(frame.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg_magic() {
        let frame = rgb_frame(vec![128; 8 * 8 * 3], 8, 8);
        let still = encode_jpeg(&frame, 85).unwrap();
        // JPEG SOI marker
        assert_eq!(&still.data[..2], &[0xFF, 0xD8]);
        assert_eq!(still.width, 8);
        assert_eq!(still.height, 8);
    }

    #[test]
    fn test_encode_jpeg_is_lossy_compressed() {
        let frame = rgb_frame(vec![200; 64 * 64 * 3], 64, 64);
        let still = encode_jpeg(&frame, 60).unwrap();
        assert!(!still.data.is_empty());
        assert!(still.data.len() < frame.data.len());
    }
}

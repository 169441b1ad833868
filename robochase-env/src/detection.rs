//! Blob sensor backed by an object detector.
//!
//! On a real robot the color-blob detection of the phone camera is unreliable.
//! [`DetectionBlobSensor`] replaces it with the output of any
//! [`ObjectDetector`], while the infrared readings still come from the robot.
use crate::{ColorBlob, SensorPort, TransportError};
use log::trace;
use std::collections::HashMap;

/// A bounding box reported by an object detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Class label.
    pub class: String,

    /// Confidence in `[0, 1]`.
    pub confidence: f32,

    /// Box corners `[x1, y1, x2, y2]` in pixels.
    pub bbox: [f32; 4],
}

impl Detection {
    /// Constructs a [`Detection`].
    pub fn new(class: impl Into<String>, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            class: class.into(),
            confidence,
            bbox,
        }
    }

    fn area(&self) -> f32 {
        ((self.bbox[2] - self.bbox[0]) * (self.bbox[3] - self.bbox[1])).abs()
    }
}

/// An object detector running on the latest camera frame.
pub trait ObjectDetector {
    /// Detections of the latest frame. Empty when no frame is available.
    fn detect(&mut self) -> Result<Vec<Detection>, TransportError>;

    /// Width and height of the frames in pixels.
    fn frame_size(&self) -> (u32, u32);
}

/// [`SensorPort`] reporting the most confident detection of one class as a blob.
pub struct DetectionBlobSensor {
    detector: Box<dyn ObjectDetector>,
    ir: Box<dyn SensorPort>,
    class: String,
}

impl DetectionBlobSensor {
    /// Constructs a [`DetectionBlobSensor`].
    ///
    /// * `ir` - Port providing the infrared readings; its blobs are ignored.
    pub fn new(
        detector: Box<dyn ObjectDetector>,
        ir: Box<dyn SensorPort>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            ir,
            class: class.into(),
        }
    }

    /// Converts a detection into a blob normalized to the frame.
    fn to_blob(&self, d: &Detection) -> ColorBlob {
        let (w, h) = self.detector.frame_size();
        let cx = 0.5 * (d.bbox[0] + d.bbox[2]);
        let cy = 0.5 * (d.bbox[1] + d.bbox[3]);
        let x = (100.0 * cx / (w.max(1) as f32)) as i32;
        let y = (100.0 * cy / (h.max(1) as f32)) as i32;

        ColorBlob::new(x.clamp(0, 100), y.clamp(0, 100), d.area())
    }
}

impl SensorPort for DetectionBlobSensor {
    fn read_color_blobs(&mut self) -> Result<Vec<ColorBlob>, TransportError> {
        let detections = self.detector.detect()?;
        trace!("{} detections", detections.len());

        let best = detections
            .iter()
            .filter(|d| d.class == self.class)
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

        Ok(best.map(|d| self.to_blob(d)).into_iter().collect())
    }

    fn read_ir_sensors(&mut self) -> Result<HashMap<String, i32>, TransportError> {
        self.ir.read_ir_sensors()
    }
}

//! Reading of a normalized sensor frame.
use crate::{IrLayout, IrReadings, SensorPort};
use log::{trace, warn};

/// Raw reading of one step, before target-memory inference.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    /// Measured target position in `0..=100`, `None` when no blob was detected.
    pub target: Option<[i32; 2]>,

    /// Blob area, `0` when no blob was detected.
    pub target_size: f32,

    /// Infrared intensities.
    pub ir: IrReadings,
}

impl SensorFrame {
    /// Target position with the `(-1, -1)` sentinel for a lost target.
    pub fn target_xy(&self) -> [i32; 2] {
        self.target.unwrap_or([crate::LOST_LOW, crate::LOST_LOW])
    }
}

/// Reads the camera and the infrared sensors.
///
/// The first reported blob is taken as the target. Port failures are logged
/// and mapped to the same values as an absent reading, so this never fails.
pub fn read_frame(sensors: &mut dyn SensorPort, layout: IrLayout) -> SensorFrame {
    trace!("read_frame()");

    let blob = match sensors.read_color_blobs() {
        Ok(blobs) => blobs.into_iter().next(),
        Err(e) => {
            warn!("Blob reading failed, target treated as lost: {}", e);
            None
        }
    };

    let (target, target_size) = match blob {
        Some(b) => {
            let size = if b.size.is_finite() { b.size.max(0.0) } else { 0.0 };
            (Some([b.x.clamp(0, 100), b.y.clamp(0, 100)]), size)
        }
        None => (None, 0.0),
    };

    let ir = match sensors.read_ir_sensors() {
        Ok(map) => IrReadings::from_sensor_map(&map, layout),
        Err(e) => {
            warn!("IR reading failed, assuming no obstacle: {}", e);
            IrReadings::default()
        }
    };

    SensorFrame {
        target,
        target_size,
        ir,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ColorBlob, IrChannel, TransportError};
    use std::collections::HashMap;

    struct FixedSensors {
        blobs: Result<Vec<ColorBlob>, TransportError>,
        ir: Result<HashMap<String, i32>, TransportError>,
    }

    impl SensorPort for FixedSensors {
        fn read_color_blobs(&mut self) -> Result<Vec<ColorBlob>, TransportError> {
            self.blobs.clone()
        }

        fn read_ir_sensors(&mut self) -> Result<HashMap<String, i32>, TransportError> {
            self.ir.clone()
        }
    }

    #[test]
    fn test_first_blob_is_taken() {
        let mut ir = HashMap::new();
        ir.insert("Front-C".to_string(), 120);
        let mut sensors = FixedSensors {
            blobs: Ok(vec![
                ColorBlob::new(30, 70, 400.0),
                ColorBlob::new(80, 10, 900.0),
            ]),
            ir: Ok(ir),
        };
        let frame = read_frame(&mut sensors, IrLayout::Full);
        assert_eq!(frame.target, Some([30, 70]));
        assert_eq!(frame.target_size, 400.0);
        assert_eq!(frame.ir.front(), 120);
    }

    #[test]
    fn test_out_of_range_blob_is_clamped() {
        let mut sensors = FixedSensors {
            blobs: Ok(vec![ColorBlob::new(130, -4, f32::NAN)]),
            ir: Ok(HashMap::new()),
        };
        let frame = read_frame(&mut sensors, IrLayout::Full);
        assert_eq!(frame.target, Some([100, 0]));
        assert_eq!(frame.target_size, 0.0);
    }

    #[test]
    fn test_dropouts_become_sentinels() {
        let mut sensors = FixedSensors {
            blobs: Ok(vec![]),
            ir: Ok(HashMap::new()),
        };
        let frame = read_frame(&mut sensors, IrLayout::Full);
        assert_eq!(frame.target, None);
        assert_eq!(frame.target_xy(), [-1, -1]);
        assert_eq!(frame.target_size, 0.0);
        for ch in IrChannel::ALL.iter() {
            assert_eq!(frame.ir.get(*ch), 0);
        }

        let mut sensors = FixedSensors {
            blobs: Err(TransportError::new("read_color_blobs", "timeout")),
            ir: Err(TransportError::new("read_ir_sensors", "timeout")),
        };
        let frame = read_frame(&mut sensors, IrLayout::Axial);
        assert_eq!(frame.target_xy(), [-1, -1]);
        assert_eq!(frame.ir, IrReadings::default());
    }
}

//! JSON input and output.
//!
//! Frames are read and written as
//!
//! ```json
//! {
//!   "positions": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
//!   "box": { "vectors": [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]],
//!            "periodic": [true, true, true] }
//! }
//! ```
//!
//! A missing `"box"` means open boundaries. Results are written as a
//! [`SnapshotReport`].

use std::io::{Read, Write};

pub mod error;
mod report;

pub use error::Error;
pub use report::{AggregateReport, LeafletReport, MembraneReport, SnapshotReport};

use crate::identify::Error as IdentifyError;
use crate::model::frame::Frame;
use crate::model::membrane::Snapshot;

/// Reads a JSON frame and checks that every coordinate is finite.
pub fn read_frame<R: Read>(reader: R) -> Result<Frame, Error> {
    let frame: Frame = serde_json::from_reader(reader)?;
    if let Some(index) = frame
        .positions
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(IdentifyError::NonFinitePosition { index }.into());
    }
    Ok(frame)
}

pub fn write_frame<W: Write>(mut writer: W, frame: &Frame) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, frame)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the JSON report of a snapshot.
pub fn write_report<W: Write>(mut writer: W, snapshot: &Snapshot) -> Result<(), Error> {
    let report = SnapshotReport::from(snapshot);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::{IdentifyConfig, identify};
    use crate::model::frame::SimBox;
    use crate::model::membrane::MembraneShape;

    #[test]
    fn frame_survives_a_write_read_cycle() {
        let frame = Frame::new(
            vec![[0.5, 1.5, 2.5], [3.0, -1.0, 0.0]],
            SimBox::from_lengths_angles([10.0, 11.0, 12.0], [90.0, 90.0, 60.0]),
        );
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &frame).unwrap();
        let read = read_frame(buffer.as_slice()).unwrap();
        assert_eq!(read.positions, frame.positions);
        assert_eq!(read.simbox.periodic, frame.simbox.periodic);
        for (a, b) in read.simbox.vectors.iter().flatten().zip(frame.simbox.vectors.iter().flatten()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_box_means_open_boundaries() {
        let json = r#"{ "positions": [[0.0, 0.0, 0.0]] }"#;
        let frame = read_frame(json.as_bytes()).unwrap();
        assert_eq!(frame.simbox, SimBox::open());
        assert_eq!(frame.particle_count(), 1);
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = read_frame("{ \"positions\": [[0.0, 0.0]] }".as_bytes());
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[test]
    fn report_lists_aggregates_and_membranes() {
        let mut positions = Vec::new();
        for z in [11.0, 9.0] {
            for i in 0..6 {
                for j in 0..6 {
                    positions.push([i as f64, j as f64, z]);
                }
            }
        }
        positions.push([3.0, 3.0, 1.0]);
        let frame = Frame::new(positions, SimBox::orthorhombic([6.0, 6.0, 20.0]));
        let snapshot = identify(&frame, &IdentifyConfig::with_cutoff(2.5)).unwrap();

        let mut buffer = Vec::new();
        write_report(&mut buffer, &snapshot).unwrap();
        let report: SnapshotReport = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(report.particle_count, 73);
        assert_eq!(report.aggregates.len(), 2);
        assert_eq!(report.aggregates[1].indices, vec![72]);
        assert_eq!(report.membranes.len(), 1);
        assert_eq!(report.leaflet_count(), 2);
        assert_eq!(report.membranes[0].shape, MembraneShape::Planar);
        assert_eq!(report.membranes[0].leaflets[0].size, 36);

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["membranes"][0]["shape"], "planar");
    }
}

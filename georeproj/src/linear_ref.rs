//! Linear referencing: locating points and sub-lines by their relative position along a line.
//!
//! Measures are fractions of the planar length of the line, from `0.0` at the first vertex to `1.0` at the last one.

use geo::{EuclideanLength, LineInterpolatePoint};
use geo_types::{Coord, Line, LineString};

use crate::error::LinearReferenceError;
use crate::geometry::{Geometry, LineGeometry, PointGeometry};

/// Returns the point at `measure` of the line's length.
///
/// The point carries the spatial reference of the line.
pub fn position_along_line(
    line: &LineGeometry,
    measure: f64,
) -> Result<PointGeometry, LinearReferenceError> {
    check_measure(measure)?;
    let path = vertices(line)?;

    // geo gives no point for a single vertex or a zero-length segment at the position
    let interpolated = if path.0.len() > 1 {
        path.line_interpolate_point(measure).map(|point| point.0)
    } else {
        None
    };
    let coord = interpolated
        .unwrap_or_else(|| coord_at_distance(path, path.euclidean_length() * measure));

    Ok(PointGeometry::from_coord(
        coord,
        line.spatial_reference().cloned(),
    ))
}

/// Returns the part of the line between `start_measure` and `end_measure`.
///
/// All vertices of the line lying between the two positions are kept, so the result follows the line rather than
/// joining its two end positions: the `[0.25, 0.75]` segment of `(0,0),(10,0),(20,0)` is `(5,0),(10,0),(15,0)`, not
/// `(5,0),(15,0)`. Equal measures give a line with a single vertex and zero length. The result carries the spatial
/// reference of the line.
pub fn segment_along_line(
    line: &LineGeometry,
    start_measure: f64,
    end_measure: f64,
) -> Result<LineGeometry, LinearReferenceError> {
    check_measure(start_measure)?;
    check_measure(end_measure)?;
    if start_measure > end_measure {
        return Err(LinearReferenceError::InvalidRange {
            start: start_measure,
            end: end_measure,
        });
    }

    let path = vertices(line)?;
    let length = path.euclidean_length();
    let start = length * start_measure;
    let end = length * end_measure;

    let mut coords = vec![coord_at_distance(path, start)];
    if start < end {
        let mut walked = 0.0;
        for segment in path.lines() {
            walked += segment.euclidean_length();
            if walked > start && walked < end {
                coords.push(segment.end);
            }
        }

        coords.push(coord_at_distance(path, end));
    }

    Ok(LineGeometry::from_coords(
        coords,
        line.spatial_reference().cloned(),
    ))
}

fn check_measure(measure: f64) -> Result<(), LinearReferenceError> {
    if (0.0..=1.0).contains(&measure) {
        Ok(())
    } else {
        Err(LinearReferenceError::MeasureOutOfRange(measure))
    }
}

fn vertices(line: &LineGeometry) -> Result<&LineString<f64>, LinearReferenceError> {
    match line.shape() {
        Some(path) if !path.0.is_empty() => Ok(path),
        _ => Err(LinearReferenceError::EmptyLine),
    }
}

fn coord_at_distance(path: &LineString<f64>, distance: f64) -> Coord<f64> {
    let mut walked = 0.0;
    for segment in path.lines() {
        let segment_length = segment.euclidean_length();
        if segment_length > 0.0 && walked + segment_length >= distance {
            return interpolate(segment, (distance - walked) / segment_length);
        }

        walked += segment_length;
    }

    // Past the end because of rounding, or a line of one vertex.
    path.0[path.0.len() - 1]
}

fn interpolate(segment: Line<f64>, fraction: f64) -> Coord<f64> {
    let fraction = fraction.clamp(0.0, 1.0);
    segment.start + segment.delta() * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::resolve;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    fn collinear() -> LineGeometry {
        LineGeometry::from_coords(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 20.0, y: 0.0 },
            ],
            Some(resolve(3857).unwrap()),
        )
    }

    fn bent() -> LineGeometry {
        LineGeometry::from_coords(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 3.0, y: 0.0 },
                Coord { x: 3.0, y: 4.0 },
            ],
            None,
        )
    }

    #[test]
    fn position_at_ends() {
        let line = bent();

        assert_eq!(
            line.position_along_line(0.0).unwrap().coord(),
            Some(Coord { x: 0.0, y: 0.0 })
        );
        assert_eq!(
            line.position_along_line(1.0).unwrap().coord(),
            Some(Coord { x: 3.0, y: 4.0 })
        );
    }

    #[test]
    fn position_on_second_segment() {
        let point = bent().position_along_line(5.0 / 7.0).unwrap();

        assert_abs_diff_eq!(point.x().unwrap(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y().unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn position_keeps_reference() {
        let point = collinear().position_along_line(0.5).unwrap();

        assert_eq!(point.coord(), Some(Coord { x: 10.0, y: 0.0 }));
        assert_eq!(point.spatial_reference().map(|s| s.epsg()), Some(3857));
    }

    #[test]
    fn position_with_repeated_vertex() {
        let line = LineGeometry::from_coords(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
            ],
            None,
        );

        assert_eq!(
            line.position_along_line(0.0).unwrap().coord(),
            Some(Coord { x: 0.0, y: 0.0 })
        );
        assert_eq!(
            line.position_along_line(0.5).unwrap().coord(),
            Some(Coord { x: 5.0, y: 0.0 })
        );
    }

    #[test]
    fn segment_follows_inner_vertex() {
        let segment = collinear().segment_along_line(0.25, 0.75).unwrap();

        assert_eq!(
            segment.points().unwrap(),
            vec![
                Coord { x: 5.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 15.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn measure_out_of_range() {
        let line = collinear();

        assert_matches!(
            line.position_along_line(1.5),
            Err(LinearReferenceError::MeasureOutOfRange(_))
        );
        assert_matches!(
            line.position_along_line(-0.1),
            Err(LinearReferenceError::MeasureOutOfRange(_))
        );
        assert_matches!(
            line.position_along_line(f64::NAN),
            Err(LinearReferenceError::MeasureOutOfRange(_))
        );
        assert_matches!(
            line.segment_along_line(0.0, 2.0),
            Err(LinearReferenceError::MeasureOutOfRange(_))
        );
    }

    #[test]
    fn empty_line() {
        assert_eq!(
            LineGeometry::empty().position_along_line(0.5),
            Err(LinearReferenceError::EmptyLine)
        );
        assert_eq!(
            LineGeometry::from_coords(vec![], None).segment_along_line(0.0, 1.0),
            Err(LinearReferenceError::EmptyLine)
        );
    }

    #[test]
    fn segment_of_collinear_line() {
        let line = collinear();
        assert_eq!(line.length(), Some(20.0));

        let segment = line.segment_along_line(0.25, 0.75).unwrap();
        assert_eq!(segment.first_point(), Some(Coord { x: 5.0, y: 0.0 }));
        assert_eq!(segment.last_point(), Some(Coord { x: 15.0, y: 0.0 }));
        assert_abs_diff_eq!(segment.length().unwrap(), 10.0, epsilon = 1e-9);
        assert_eq!(segment.spatial_reference().map(|s| s.epsg()), Some(3857));
    }

    #[test]
    fn segment_keeps_inner_vertices() {
        let segment = bent().segment_along_line(0.0, 5.0 / 7.0).unwrap();

        assert_eq!(segment.point_count(), Some(3));
        assert_eq!(segment.points().unwrap()[1], Coord { x: 3.0, y: 0.0 });
        assert_abs_diff_eq!(segment.length().unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_length_segment() {
        let segment = collinear().segment_along_line(0.5, 0.5).unwrap();

        assert_eq!(segment.point_count(), Some(1));
        assert_eq!(segment.length(), Some(0.0));
        assert_eq!(segment.first_point(), Some(Coord { x: 10.0, y: 0.0 }));
    }

    #[test]
    fn reversed_range() {
        assert_eq!(
            collinear().segment_along_line(0.75, 0.25),
            Err(LinearReferenceError::InvalidRange {
                start: 0.75,
                end: 0.25
            })
        );
    }

    #[test]
    fn whole_line() {
        let line = bent();
        let segment = line.segment_along_line(0.0, 1.0).unwrap();

        assert_eq!(segment.points(), line.points());
    }

    #[test]
    fn single_vertex_line() {
        let line = LineGeometry::from_coords(vec![Coord { x: 1.0, y: 1.0 }], None);

        assert_eq!(
            line.position_along_line(0.7).unwrap().coord(),
            Some(Coord { x: 1.0, y: 1.0 })
        );
        assert_eq!(line.segment_along_line(0.2, 0.8).unwrap().point_count(), Some(1));
    }
}

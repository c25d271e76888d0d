/// Ordered `(lon, lat)` points that can be drawn as one line.
pub type Polyline = Vec<(f64, f64)>;

/// Split a `(lon, lat)` polyline wherever two consecutive points sit more
/// than 180 degrees of longitude apart, so no segment wraps around the map.
///
/// Concatenating the returned segments reproduces the input exactly.
pub fn split_at_dateline(points: &[(f64, f64)]) -> Vec<Polyline> {
    let mut segments = Vec::new();
    let mut current: Polyline = Vec::with_capacity(points.len());

    for (i, &point) in points.iter().enumerate() {
        if i > 0 && (point.0 - points[i - 1].0).abs() > 180.0 {
            segments.push(std::mem::take(&mut current));
        }
        current.push(point);
    }

    segments.push(current);
    segments
}

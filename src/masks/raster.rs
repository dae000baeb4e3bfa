use std::time::Instant;

use crate::foundation::core::{OpacityBuffer, PixelArea, Point, Rect, Roi};
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::{try_filled, try_points};
use crate::foundation::pool::for_each_row;
use crate::transform::{CoordinateTransform, Direction, PriorityRange, map_points};

/// Mesh size for a `width x height` window at `stride`: `ceil(n / stride) + 1` per axis.
pub(crate) fn mesh_dims(width: u32, height: u32, stride: u32) -> (usize, usize) {
    let m = stride.max(1) as usize;
    (
        (width as usize).div_ceil(m) + 1,
        (height as usize).div_ceil(m) + 1,
    )
}

/// Rasterize an analytic opacity over `roi` by sampling a coarse mesh in pipeline space,
/// mapping it back to image space and reconstructing every pixel bilinearly.
pub(crate) fn rasterize_mesh<F>(
    roi: &Roi,
    stride: u32,
    transform: &dyn CoordinateTransform,
    range: PriorityRange,
    parallel: bool,
    opacity_at: F,
) -> BlendResult<OpacityBuffer>
where
    F: Fn(Point) -> f32 + Sync,
{
    roi.validate()?;
    if stride == 0 {
        return Err(BlendError::validation("mesh stride must be >= 1"));
    }
    let len = roi.pixel_count()?;
    if len == 0 {
        return Ok(OpacityBuffer::from_vec(roi.width, roi.height, Vec::new()));
    }

    let m = stride as usize;
    let (mw, mh) = mesh_dims(roi.width, roi.height, stride);
    let mesh_len = mw
        .checked_mul(mh)
        .ok_or_else(|| BlendError::validation("mask mesh size overflow"))?;

    let start = Instant::now();
    let mut points = try_points(mesh_len, "mask mesh")?;
    let scale = f64::from(roi.scale);
    let (ox, oy) = (f64::from(roi.x), f64::from(roi.y));
    for_each_row(&mut points, mw, parallel, |j, row| {
        let y = ((m * j) as f64 + oy) / scale;
        for (i, p) in row.iter_mut().enumerate() {
            *p = Point::new(((m * i) as f64 + ox) / scale, y);
        }
    });
    let t_mesh = start.elapsed();

    map_points(transform, &mut points, range, Direction::Backward, parallel)?;
    let t_transform = start.elapsed();

    let mut mesh = try_filled(mesh_len, 0.0, "mask mesh opacity")?;
    for_each_row(&mut mesh, mw, parallel, |j, row| {
        let src = &points[j * mw..(j + 1) * mw];
        for (o, p) in row.iter_mut().zip(src) {
            *o = opacity_at(*p);
        }
    });

    let width = roi.width as usize;
    let mut out = try_filled(len, 0.0, "mask buffer")?;
    for_each_row(&mut out, width, parallel, |j, row| {
        interpolate_row(&mesh, mw, m, j, row);
    });
    let t_fill = start.elapsed();

    tracing::debug!(
        width = roi.width,
        height = roi.height,
        mesh = mesh_len,
        mesh_ms = t_mesh.as_secs_f64() * 1000.0,
        transform_ms = (t_transform - t_mesh).as_secs_f64() * 1000.0,
        fill_ms = (t_fill - t_transform).as_secs_f64() * 1000.0,
        "mask roi rasterized"
    );
    Ok(OpacityBuffer::from_vec(roi.width, roi.height, out))
}

/// Fill output row `j` from the two mesh rows around it.
fn interpolate_row(mesh: &[f32], mw: usize, m: usize, j: usize, row: &mut [f32]) {
    let mj = j / m;
    let jj = j % m;
    let top = &mesh[mj * mw..(mj + 1) * mw];
    let bot = &mesh[(mj + 1) * mw..(mj + 2) * mw];
    let wj0 = (m - jj) as f32;
    let wj1 = jj as f32;
    let norm = 1.0 / (m * m) as f32;

    for (i, o) in row.iter_mut().enumerate() {
        let mi = i / m;
        let ii = i % m;
        let wi0 = (m - ii) as f32;
        let wi1 = ii as f32;
        let v = top[mi] * wi0 * wj0
            + top[mi + 1] * wi1 * wj0
            + bot[mi] * wi0 * wj1
            + bot[mi + 1] * wi1 * wj1;
        *o = (v * norm).min(1.0);
    }
}

/// Rasterize an analytic opacity at every pixel of `area` (full resolution, no mesh).
pub(crate) fn rasterize_dense<F>(
    area: PixelArea,
    transform: &dyn CoordinateTransform,
    range: PriorityRange,
    parallel: bool,
    opacity_at: F,
) -> BlendResult<OpacityBuffer>
where
    F: Fn(Point) -> f32 + Sync,
{
    let len = area.pixel_count()?;
    if len == 0 {
        return Ok(OpacityBuffer::from_vec(area.width, area.height, Vec::new()));
    }
    let width = area.width as usize;

    let start = Instant::now();
    let mut points = try_points(len, "mask pixels")?;
    let (ox, oy) = (f64::from(area.x), f64::from(area.y));
    for_each_row(&mut points, width, parallel, |j, row| {
        let y = j as f64 + oy;
        for (i, p) in row.iter_mut().enumerate() {
            *p = Point::new(i as f64 + ox, y);
        }
    });

    map_points(transform, &mut points, range, Direction::Backward, parallel)?;
    let t_transform = start.elapsed();

    let mut out = try_filled(len, 0.0, "mask buffer")?;
    for_each_row(&mut out, width, parallel, |j, row| {
        let src = &points[j * width..(j + 1) * width];
        for (o, p) in row.iter_mut().zip(src) {
            *o = opacity_at(*p);
        }
    });

    tracing::debug!(
        width = area.width,
        height = area.height,
        transform_ms = t_transform.as_secs_f64() * 1000.0,
        fill_ms = (start.elapsed() - t_transform).as_secs_f64() * 1000.0,
        "full mask rasterized"
    );
    Ok(OpacityBuffer::from_vec(area.width, area.height, out))
}

/// Bounding rectangle of a point set, `None` when empty or non-finite.
pub(crate) fn outline_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for p in &points[1..] {
        rect = rect.union_pt(*p);
    }
    rect.is_finite().then_some(rect)
}

#[cfg(test)]
#[path = "../../tests/unit/masks/raster.rs"]
mod tests;

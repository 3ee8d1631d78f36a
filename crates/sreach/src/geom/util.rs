//! Small utilities: combinations, geometric dedup/quantization, 2D hull.

use nalgebra::DVector;

/// k-combinations of indices 0..n (lexicographic).
pub(crate) fn index_combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n || k == 0 {
        return Vec::new();
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    let mut out = Vec::new();
    loop {
        out.push(idxs.clone());
        // next combination
        let mut i = k;
        let mut advanced = false;
        while i > 0 {
            i -= 1;
            if idxs[i] != i + n - k {
                idxs[i] += 1;
                for j in i + 1..k {
                    idxs[j] = idxs[j - 1] + 1;
                }
                advanced = true;
                break;
            }
        }
        if !advanced {
            break;
        }
    }
    out
}

/// Sort lexicographically and drop points closer than `tol`.
pub(crate) fn dedup_points_in_place(points: &mut Vec<DVector<f64>>, tol: f64) {
    if points.len() < 2 {
        return;
    }
    points.sort_by(|a, b| {
        for i in 0..a.len() {
            match a[i].partial_cmp(&b[i]).unwrap_or(std::cmp::Ordering::Equal) {
                std::cmp::Ordering::Equal => continue,
                o => return o,
            }
        }
        std::cmp::Ordering::Equal
    });
    points.dedup_by(|a, b| (&*a - &*b).norm() < tol);
}

/// Quantize a normal/offset pair for plane dedup.
pub(crate) fn quantize_plane(n: &DVector<f64>, c: f64, tol: f64) -> Vec<i64> {
    let s = 1.0 / tol;
    let mut key: Vec<i64> = n.iter().map(|x| (x * s).round() as i64).collect();
    key.push((c * s).round() as i64);
    key
}

/// Andrew's monotone chain convex hull in 2D (CCW order).
///
/// Points are given as length-2 `DVector`s; collinear inputs yield `None`
/// (the hull degenerates to a segment, handled by the caller as an interval
/// in a rotated frame or rejected).
pub(crate) fn convex_hull_2d(points: &[DVector<f64>]) -> Option<Vec<DVector<f64>>> {
    if points.len() < 3 {
        return None;
    }
    let mut pts: Vec<DVector<f64>> = points.to_vec();
    pts.sort_by(|a, b| {
        match a[0].partial_cmp(&b[0]).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => a[1].partial_cmp(&b[1]).unwrap_or(std::cmp::Ordering::Equal),
            o => o,
        }
    });
    pts.dedup_by(|a, b| (&*a - &*b).norm() < 1e-12);
    if pts.len() < 3 {
        return None;
    }
    let cross = |a: &DVector<f64>, b: &DVector<f64>, c: &DVector<f64>| -> f64 {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    };
    let mut lower: Vec<DVector<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p.clone());
    }
    let mut upper: Vec<DVector<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p.clone());
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() >= 3 {
        Some(hull)
    } else {
        None
    }
}

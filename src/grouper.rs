//! Groups photos into trips: connected components of the "closer than
//! [`GROUP_THRESHOLD_KM`]" relation over great-circle distance.

use crate::metadata::{GeoPoint, PhotoRecord, UngroupedPhoto};
use std::collections::HashMap;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Two photos strictly closer than this are in the same trip.
pub const GROUP_THRESHOLD_KM: f64 = 100.0;

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn is_near(distance_km: f64) -> bool {
    distance_km < GROUP_THRESHOLD_KM
}

/// Disjoint-set forest over `0..n`, stored as parent indices.
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    /// Root of `x`'s set, compressing the path on the way back.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Attaches the root of `a` under the root of `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_a] = root_b;
        }
    }
}

/// Group id for each point, in input order.
///
/// Ids are dense from 0 and numbered by the first point (in input order)
/// that belongs to each component.
pub fn assign_group_ids(points: &[GeoPoint]) -> Vec<usize> {
    let mut sets = UnionFind::new(points.len());
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if is_near(haversine_km(points[i], points[j])) {
                sets.union(i, j);
            }
        }
    }

    let mut root_to_group: HashMap<usize, usize> = HashMap::new();
    (0..points.len())
        .map(|i| {
            let root = sets.find(i);
            let next = root_to_group.len();
            *root_to_group.entry(root).or_insert(next)
        })
        .collect()
}

/// Assigns trip groups to photos that are already in catalog order.
pub fn assign_groups(photos: Vec<UngroupedPhoto>) -> Vec<PhotoRecord> {
    let points: Vec<GeoPoint> = photos.iter().map(|p| p.position).collect();
    let groups = assign_group_ids(&points);
    log::debug!(
        "Grouped {} photo(s) into {} trip(s)",
        photos.len(),
        groups.iter().max().map_or(0, |g| g + 1)
    );
    photos
        .into_iter()
        .zip(groups)
        .map(|(photo, group)| photo.with_group(group))
        .collect()
}

//! Screen-space grouping of beacons for low-zoom display.
//!
//! Grouping is greedy and follows input order: each unassigned beacon seeds a
//! group and absorbs every later unassigned beacon strictly closer than the
//! radius to the *seed* (not to a running centroid). Reordering the input can
//! therefore change membership at the margins; marker grouping as seen by
//! users depends on this exact rule.

use feed::BeaconRecord;
use foundation::{LatLon, ScreenPosition, ScreenRect, clamp_latitude};
use serde::{Deserialize, Serialize};
use viewport::{Projection, ViewportState};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub radius_px: f64,
    /// Groups smaller than this render as individual markers.
    pub min_cluster_size: usize,
    /// Clustering runs only while the zoom is below this level.
    pub cluster_below_zoom: u8,
    /// Extra pixels kept around each viewport edge.
    pub visible_margin_px: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius_px: 50.0,
            min_cluster_size: 3,
            cluster_below_zoom: 12,
            visible_margin_px: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster<'a> {
    pub members: Vec<&'a BeaconRecord>,
    /// Mean of member latitudes/longitudes, in degrees.
    pub centroid: LatLon,
    pub has_active: bool,
    pub count: usize,
}

/// One drawable item for the current render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderGroup<'a> {
    Beacon {
        beacon: &'a BeaconRecord,
        screen: ScreenPosition,
    },
    Cluster {
        cluster: Cluster<'a>,
        screen: ScreenPosition,
    },
}

impl RenderGroup<'_> {
    pub fn screen(&self) -> ScreenPosition {
        match self {
            RenderGroup::Beacon { screen, .. } | RenderGroup::Cluster { screen, .. } => *screen,
        }
    }

    pub fn position(&self) -> LatLon {
        match self {
            RenderGroup::Beacon { beacon, .. } => beacon.position(),
            RenderGroup::Cluster { cluster, .. } => cluster.centroid,
        }
    }

    pub fn member_count(&self) -> usize {
        match self {
            RenderGroup::Beacon { .. } => 1,
            RenderGroup::Cluster { cluster, .. } => cluster.count,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, RenderGroup::Cluster { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    pub config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Builds this pass's render groups from scratch.
    ///
    /// Groups whose screen position falls outside the viewport plus margin
    /// are dropped from the output.
    pub fn cluster<'a>(
        &self,
        beacons: &'a [BeaconRecord],
        viewport: &ViewportState,
    ) -> Vec<RenderGroup<'a>> {
        let projection = viewport.projection();
        let visible = ScreenRect::around_center(viewport.size_px(), self.config.visible_margin_px);
        let screen: Vec<ScreenPosition> = beacons
            .iter()
            .map(|b| project(&projection, b.position()))
            .collect();

        let mut out = Vec::new();
        if viewport.zoom() >= self.config.cluster_below_zoom {
            for (beacon, pos) in beacons.iter().zip(&screen) {
                push_visible(&mut out, &visible, RenderGroup::Beacon { beacon, screen: *pos });
            }
            return out;
        }

        for members in self.seed_groups(&screen) {
            if members.len() < self.config.min_cluster_size {
                for i in members {
                    let group = RenderGroup::Beacon {
                        beacon: &beacons[i],
                        screen: screen[i],
                    };
                    push_visible(&mut out, &visible, group);
                }
                continue;
            }

            let members: Vec<&BeaconRecord> = members.iter().map(|&i| &beacons[i]).collect();
            let Some(centroid) = LatLon::mean(members.iter().map(|b| b.position())) else {
                continue;
            };
            let group = RenderGroup::Cluster {
                screen: project(&projection, centroid),
                cluster: Cluster {
                    has_active: members.iter().any(|b| b.is_active()),
                    count: members.len(),
                    centroid,
                    members,
                },
            };
            push_visible(&mut out, &visible, group);
        }
        out
    }

    /// Indices grouped by the greedy seed-distance rule, in seed order.
    fn seed_groups(&self, screen: &[ScreenPosition]) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; screen.len()];
        let mut groups = Vec::new();
        for seed in 0..screen.len() {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let mut members = vec![seed];
            for other in seed + 1..screen.len() {
                if !assigned[other] && screen[other].distance_to(screen[seed]) < self.config.radius_px
                {
                    assigned[other] = true;
                    members.push(other);
                }
            }
            groups.push(members);
        }
        groups
    }
}

fn project(projection: &Projection, p: LatLon) -> ScreenPosition {
    projection.geo_to_screen(clamp_latitude(p.lat), p.lon)
}

fn push_visible<'a>(out: &mut Vec<RenderGroup<'a>>, visible: &ScreenRect, group: RenderGroup<'a>) {
    if visible.contains(group.screen()) {
        out.push(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed::{ACTIVE_STATUS, DEFAULT_CAUSE, UNKNOWN_SENSE};
    use viewport::ViewportConfig;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn viewport(zoom: i32) -> ViewportState {
        ViewportState::new(ViewportConfig::default(), LatLon::new(40.0, -3.0), zoom)
            .with_size([800, 600])
    }

    /// Beacon placed at a screen offset from the viewport center.
    fn beacon_at(vp: &ViewportState, id: &str, x: f64, y: f64, active: bool) -> BeaconRecord {
        let p = vp.projection().screen_to_geo(ScreenPosition::new(x, y));
        BeaconRecord {
            id: id.into(),
            situation_id: format!("s-{id}"),
            status: if active { ACTIVE_STATUS } else { "inactive" }.into(),
            lat: p.lat,
            lon: p.lon,
            road_name: "N-VI".into(),
            km: 0.0,
            sense: UNKNOWN_SENSE.into(),
            orientation: String::new(),
            region: "Madrid".into(),
            province: "Madrid".into(),
            municipality: "Madrid".into(),
            cause: DEFAULT_CAUSE.into(),
            subcause: String::new(),
            road_type: String::new(),
            activation_time: String::new(),
        }
    }

    fn ids<'a>(group: &'a RenderGroup<'_>) -> Vec<&'a str> {
        match group {
            RenderGroup::Beacon { beacon, .. } => vec![beacon.id.as_str()],
            RenderGroup::Cluster { cluster, .. } => {
                cluster.members.iter().map(|b| b.id.as_str()).collect()
            }
        }
    }

    #[test]
    fn three_close_beacons_form_one_cluster() {
        let vp = viewport(6);
        let beacons = vec![
            beacon_at(&vp, "a", 0.0, 0.0, false),
            beacon_at(&vp, "b", 10.0, 5.0, true),
            beacon_at(&vp, "c", -8.0, 12.0, false),
        ];
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        assert_eq!(groups.len(), 1);

        let RenderGroup::Cluster { cluster, screen } = &groups[0] else {
            panic!("expected a cluster, got {:?}", groups[0]);
        };
        assert_eq!(cluster.count, 3);
        assert!(cluster.has_active);
        let mean_lat = beacons.iter().map(|b| b.lat).sum::<f64>() / 3.0;
        let mean_lon = beacons.iter().map(|b| b.lon).sum::<f64>() / 3.0;
        assert_close(cluster.centroid.lat, mean_lat, 1e-12);
        assert_close(cluster.centroid.lon, mean_lon, 1e-12);
        let expected = vp.projection().geo_to_screen(mean_lat, mean_lon);
        assert_close(screen.x, expected.x, 1e-9);
        assert_close(screen.y, expected.y, 1e-9);
    }

    #[test]
    fn two_close_beacons_stay_individual() {
        let vp = viewport(6);
        let beacons = vec![
            beacon_at(&vp, "a", 0.0, 0.0, true),
            beacon_at(&vp, "b", 20.0, 0.0, true),
        ];
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.is_cluster()));
        assert_eq!(ids(&groups[0]), vec!["a"]);
        assert_eq!(ids(&groups[1]), vec!["b"]);
    }

    #[test]
    fn cluster_without_active_members() {
        let vp = viewport(5);
        let beacons: Vec<BeaconRecord> = (0..4)
            .map(|i| beacon_at(&vp, &i.to_string(), i as f64 * 3.0, 0.0, false))
            .collect();
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        let RenderGroup::Cluster { cluster, .. } = &groups[0] else {
            panic!("expected a cluster");
        };
        assert!(!cluster.has_active);
        assert_eq!(groups[0].member_count(), 4);
    }

    #[test]
    fn distance_is_measured_to_the_seed() {
        // A sits between B and C: both are within radius of A, but C is
        // 80 px from B.
        let vp = viewport(6);
        let a = beacon_at(&vp, "A", 0.0, 0.0, true);
        let b = beacon_at(&vp, "B", 40.0, 0.0, true);
        let c = beacon_at(&vp, "C", -40.0, 0.0, true);
        let engine = ClusterEngine::default();

        let seeded_by_a = vec![a.clone(), b.clone(), c.clone()];
        let groups = engine.cluster(&seeded_by_a, &vp);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["A", "B", "C"]);

        let seeded_by_b = vec![b, a, c];
        let groups = engine.cluster(&seeded_by_b, &vp);
        let all: Vec<Vec<&str>> = groups.iter().map(ids).collect();
        assert_eq!(all, vec![vec!["B"], vec!["A"], vec!["C"]]);
        assert!(groups.iter().all(|g| !g.is_cluster()));
    }

    #[test]
    fn seed_membership_with_smaller_min_size() {
        let vp = viewport(6);
        let a = beacon_at(&vp, "A", 0.0, 0.0, true);
        let b = beacon_at(&vp, "B", 40.0, 0.0, true);
        let c = beacon_at(&vp, "C", -40.0, 0.0, true);
        let engine = ClusterEngine::new(ClusterConfig {
            min_cluster_size: 2,
            ..ClusterConfig::default()
        });

        let beacons = vec![b, a, c];
        let groups = engine.cluster(&beacons, &vp);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_cluster());
        assert_eq!(ids(&groups[0]), vec!["B", "A"]);
        assert_eq!(ids(&groups[1]), vec!["C"]);
    }

    #[test]
    fn radius_is_exclusive() {
        let vp = viewport(6);
        let beacons = vec![
            beacon_at(&vp, "seed", 0.0, 0.0, true),
            beacon_at(&vp, "in1", 49.9, 0.0, true),
            beacon_at(&vp, "out", 0.0, 50.1, true),
            beacon_at(&vp, "in2", 0.0, -49.9, true),
        ];
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        assert_eq!(ids(&groups[0]), vec!["seed", "in1", "in2"]);
        assert_eq!(ids(&groups[1]), vec!["out"]);
    }

    #[test]
    fn no_clustering_at_or_above_threshold_zoom() {
        let vp = viewport(12);
        let beacons: Vec<BeaconRecord> = (0..5)
            .map(|i| beacon_at(&vp, &i.to_string(), i as f64, 0.0, true))
            .collect();
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        assert_eq!(groups.len(), 5);
        assert!(groups.iter().all(|g| !g.is_cluster()));
    }

    #[test]
    fn offscreen_groups_are_dropped() {
        let vp = viewport(8);
        let margin = ClusterConfig::default().visible_margin_px;
        let beacons = vec![
            beacon_at(&vp, "near", 400.0 + margin - 1.0, 0.0, true),
            beacon_at(&vp, "far", 400.0 + margin + 1.0, 0.0, true),
            beacon_at(&vp, "below", 0.0, -(300.0 + margin + 1.0), true),
        ];
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["near"]);
    }

    #[test]
    fn offscreen_cluster_is_dropped_as_a_whole() {
        let vp = viewport(6);
        let beacons: Vec<BeaconRecord> = (0..3)
            .map(|i| beacon_at(&vp, &i.to_string(), 5000.0 + i as f64, 0.0, true))
            .collect();
        assert!(ClusterEngine::default().cluster(&beacons, &vp).is_empty());
    }

    #[test]
    fn empty_input() {
        let vp = viewport(6);
        assert!(ClusterEngine::default().cluster(&[], &vp).is_empty());
    }

    #[test]
    fn polar_beacons_are_clamped_before_projection() {
        let vp = viewport(4);
        let mut polar = beacon_at(&vp, "pole", 0.0, 0.0, true);
        polar.lat = 90.0;
        let groups = ClusterEngine::new(ClusterConfig {
            visible_margin_px: f64::INFINITY,
            ..ClusterConfig::default()
        })
        .cluster(std::slice::from_ref(&polar), &vp);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].screen().is_finite());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let vp = viewport(6);
        let beacons = vec![beacon_at(&vp, "a", 0.0, 0.0, true)];
        let groups = ClusterEngine::default().cluster(&beacons, &vp);
        let json = serde_json::to_value(&groups).unwrap();
        assert_eq!(json[0]["kind"], "beacon");
        assert_eq!(json[0]["beacon"]["id"], "a");
        assert!(json[0]["screen"]["x"].is_number());
    }
}

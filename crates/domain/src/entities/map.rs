//! Map entity - Campaign maps with placed markers
//!
//! Maps and markers carry an optional player allowlist on top of the
//! published flag. An empty allowlist means every player may see the node;
//! a non-empty one restricts it to the listed players. The allowlist never
//! overrides an unpublished node.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CampaignId, MapId, MarkerId, UserId};
use crate::types::Viewer;
use crate::visibility::allowlist_admits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMap {
    pub id: MapId,
    pub campaign_id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub master_notes: String,
    pub is_published: bool,
    #[serde(default)]
    pub visible_to_players: BTreeSet<UserId>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Detail maps reachable from this one (a city inside a region map)
    #[serde(default)]
    pub sub_maps: Vec<GameMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameMap {
    pub fn new(campaign_id: CampaignId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: MapId::new(),
            campaign_id,
            name: name.into(),
            image_url: None,
            master_notes: String::new(),
            is_published: false,
            visible_to_players: BTreeSet::new(),
            markers: Vec::new(),
            sub_maps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_sub_map(mut self, map: GameMap) -> Self {
        self.sub_maps.push(map);
        self
    }

    pub fn visible_only_to(mut self, players: impl IntoIterator<Item = UserId>) -> Self {
        self.visible_to_players = players.into_iter().collect();
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Whether this map node passes its own gate for `viewer`.
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        viewer.is_master() || allowlist_admits(self.is_published, &self.visible_to_players, viewer)
    }

    /// This map or any map nested below it.
    pub fn find_map_mut(&mut self, id: MapId) -> Option<&mut GameMap> {
        if self.id == id {
            return Some(self);
        }
        self.sub_maps.iter_mut().find_map(|m| m.find_map_mut(id))
    }

    /// A marker on this map or on any map nested below it.
    pub fn find_marker_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        if let Some(index) = self.markers.iter().position(|m| m.id == id) {
            return self.markers.get_mut(index);
        }
        self.sub_maps.iter_mut().find_map(|m| m.find_marker_mut(id))
    }
}

/// A point of interest placed on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub label: String,
    /// Horizontal position as a fraction of the map width (0.0..=1.0)
    pub x: f64,
    /// Vertical position as a fraction of the map height (0.0..=1.0)
    pub y: f64,
    #[serde(default)]
    pub public_desc: String,
    #[serde(default)]
    pub detailed_notes: String,
    pub is_published: bool,
    #[serde(default)]
    pub visible_to_players: BTreeSet<UserId>,
    #[serde(default)]
    pub linked_map_id: Option<MapId>,
}

impl Marker {
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: MarkerId::new(),
            label: label.into(),
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            public_desc: String::new(),
            detailed_notes: String::new(),
            is_published: false,
            visible_to_players: BTreeSet::new(),
            linked_map_id: None,
        }
    }

    pub fn with_public_desc(mut self, desc: impl Into<String>) -> Self {
        self.public_desc = desc.into();
        self
    }

    pub fn with_detailed_notes(mut self, notes: impl Into<String>) -> Self {
        self.detailed_notes = notes.into();
        self
    }

    pub fn linked_to(mut self, map_id: MapId) -> Self {
        self.linked_map_id = Some(map_id);
        self
    }

    pub fn visible_only_to(mut self, players: impl IntoIterator<Item = UserId>) -> Self {
        self.visible_to_players = players.into_iter().collect();
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        viewer.is_master() || allowlist_admits(self.is_published, &self.visible_to_players, viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn marker_coordinates_are_clamped() {
        let marker = Marker::new("Well", 1.4, -0.2);
        assert_eq!(marker.x, 1.0);
        assert_eq!(marker.y, 0.0);
    }

    #[test]
    fn allowlisted_marker_is_visible_only_to_listed_players() {
        let marker = Marker::new("Hideout", 0.5, 0.5)
            .published()
            .visible_only_to([uid("u5")]);
        assert!(marker.is_visible_to(&Viewer::player(uid("u5"))));
        assert!(!marker.is_visible_to(&Viewer::player(uid("u6"))));
        assert!(marker.is_visible_to(&Viewer::master(uid("m"))));
    }

    #[test]
    fn finds_nested_maps_and_markers() {
        let campaign_id = CampaignId::new();
        let now = Utc::now();
        let marker = Marker::new("Gate", 0.5, 0.5);
        let marker_id = marker.id;
        let city = GameMap::new(campaign_id, "City", now).with_marker(marker);
        let city_id = city.id;
        let mut region = GameMap::new(campaign_id, "Region", now).with_sub_map(city);

        assert_eq!(region.find_map_mut(city_id).map(|m| m.name.clone()), Some("City".into()));
        region.find_marker_mut(marker_id).unwrap().is_published = true;
        assert!(region.sub_maps[0].markers[0].is_published);
        assert!(region.find_marker_mut(MarkerId::new()).is_none());
    }

    #[test]
    fn allowlist_does_not_override_unpublished() {
        let map = GameMap::new(CampaignId::new(), "Sewers", Utc::now()).visible_only_to([uid("u5")]);
        assert!(!map.is_visible_to(&Viewer::player(uid("u5"))));
    }
}

//! Route segmentation helpers for the grade page
//!
//! A segmentation maps route names to the bounding boxes of the holds that
//! belong to the route. The page builds a working selection called
//! "Route Zero" by clicking boxes; [`apply_click`] computes one step of it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ROUTE_ZERO: &str = "Route Zero";
const ROUTE_PREFIX: &str = "Route ";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteColor {
    pub name: &'static str,
    pub value: &'static str,
    pub text_color: &'static str,
}

const fn color(name: &'static str, value: &'static str, text_color: &'static str) -> RouteColor {
    RouteColor {
        name,
        value,
        text_color,
    }
}

pub const ROUTE_COLORS: [RouteColor; 10] = [
    color("Red", "#EF4444", "#FFFFFF"),
    color("Blue", "#3B82F6", "#FFFFFF"),
    color("Green", "#10B981", "#FFFFFF"),
    color("Yellow", "#F59E0B", "#000000"),
    color("Purple", "#8B5CF6", "#FFFFFF"),
    color("Pink", "#EC4899", "#FFFFFF"),
    color("Orange", "#F97316", "#FFFFFF"),
    color("Teal", "#14B8A6", "#FFFFFF"),
    color("Indigo", "#6366F1", "#FFFFFF"),
    color("Cyan", "#06B6D4", "#FFFFFF"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// `[x1, y1, x2, y2]` in source image pixels
    pub bbox: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    /// Any other per-box fields from the detector, kept for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BoundingBox {
    /// Boxes are identified by their coordinates alone.
    pub fn same_area(&self, other: &BoundingBox) -> bool {
        self.bbox == other.bbox
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub boxes: Vec<BoundingBox>,
}

/// Validate an uploaded route map and normalize its names.
///
/// Keys that do not already start with `"Route "` become `Route <n>`, `n`
/// being the 1-based position of the key. When a rename lands on a name seen
/// earlier, the later boxes replace the earlier ones in place.
pub fn parse_routes(value: &Value) -> Result<Vec<Route>, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "Route data must be a JSON object".to_string())?;

    let mut routes: Vec<Route> = Vec::with_capacity(object.len());
    for (index, (key, boxes)) in object.iter().enumerate() {
        let boxes = parse_boxes(boxes).map_err(|e| format!("{}: {}", key, e))?;
        let name = if key.starts_with(ROUTE_PREFIX) {
            key.clone()
        } else {
            format!("{}{}", ROUTE_PREFIX, index + 1)
        };

        match routes.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.boxes = boxes,
            None => routes.push(Route { name, boxes }),
        }
    }

    Ok(routes)
}

fn parse_boxes(value: &Value) -> Result<Vec<BoundingBox>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "expected an array of boxes".to_string())?;

    items
        .iter()
        .map(|item| {
            let coords = item
                .get("bbox")
                .and_then(Value::as_array)
                .filter(|c| c.len() == 4)
                .ok_or_else(|| "each box needs a bbox of four numbers".to_string())?;

            let mut bbox = [0.0; 4];
            for (slot, coord) in bbox.iter_mut().zip(coords) {
                *slot = coord
                    .as_f64()
                    .ok_or_else(|| "bbox coordinates must be numbers".to_string())?;
            }

            let extra = item
                .as_object()
                .map(|fields| {
                    fields
                        .iter()
                        .filter(|(k, _)| k.as_str() != "bbox" && k.as_str() != "selected")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();

            Ok(BoundingBox {
                bbox,
                selected: item.get("selected").and_then(Value::as_bool),
                extra,
            })
        })
        .collect()
}

/// Palette entry for each route, assigned round-robin in route order.
pub fn assign_colors(routes: &[Route]) -> Map<String, Value> {
    routes
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let c = &ROUTE_COLORS[i % ROUTE_COLORS.len()];
            (
                route.name.clone(),
                serde_json::json!({ "value": c.value, "textColor": c.text_color }),
            )
        })
        .collect()
}

/// Render routes back into an ordered JSON object.
pub fn routes_to_json(routes: &[Route]) -> Map<String, Value> {
    routes
        .iter()
        .map(|r| {
            (
                r.name.clone(),
                serde_json::to_value(&r.boxes).unwrap_or(Value::Array(Vec::new())),
            )
        })
        .collect()
}

/// Working selection on the grade page.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub route_zero: Vec<BoundingBox>,
    pub first_click: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            route_zero: Vec::new(),
            first_click: true,
        }
    }
}

/// Apply one click on box `box_index` of `route_name`.
///
/// * a Route Zero box is removed from the selection;
/// * the first click overall on another route pulls in every box of that
///   route not already selected;
/// * later clicks toggle just the clicked box.
pub fn apply_click(
    routes: &[Route],
    mut selection: Selection,
    route_name: &str,
    box_index: usize,
) -> Result<Selection, String> {
    if route_name == ROUTE_ZERO {
        if box_index < selection.route_zero.len() {
            selection.route_zero.remove(box_index);
        }
        return Ok(selection);
    }

    let route = routes
        .iter()
        .find(|r| r.name == route_name)
        .ok_or_else(|| format!("Unknown route: {}", route_name))?;

    if selection.first_click {
        for b in &route.boxes {
            if !selection.route_zero.iter().any(|s| s.same_area(b)) {
                selection.route_zero.push(b.clone());
            }
        }
        selection.first_click = false;
        return Ok(selection);
    }

    let clicked = route
        .boxes
        .get(box_index)
        .ok_or_else(|| format!("{} has no box {}", route_name, box_index))?;

    if selection.route_zero.iter().any(|s| s.same_area(clicked)) {
        selection.route_zero.retain(|s| !s.same_area(clicked));
    } else {
        selection.route_zero.push(clicked.clone());
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bb(x: f64) -> BoundingBox {
        BoundingBox {
            bbox: [x, x, x + 1.0, x + 1.0],
            selected: None,
            extra: Map::new(),
        }
    }

    fn sample_routes() -> Vec<Route> {
        vec![
            Route {
                name: "Route 1".into(),
                boxes: vec![bb(1.0), bb(2.0)],
            },
            Route {
                name: "Route 2".into(),
                boxes: vec![bb(2.0), bb(3.0)],
            },
        ]
    }

    #[test]
    fn parse_renames_keys_by_position() {
        let routes = parse_routes(&json!({
            "crimpy": [{ "bbox": [0, 0, 10, 10] }],
            "Route 7": [],
            "slab": [{ "bbox": [1, 2, 3, 4.5], "selected": true }]
        }))
        .unwrap();

        let names: Vec<&str> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Route 1", "Route 7", "Route 3"]);
        assert_eq!(routes[2].boxes[0].bbox, [1.0, 2.0, 3.0, 4.5]);
        assert_eq!(routes[2].boxes[0].selected, Some(true));
    }

    #[test]
    fn parse_collision_replaces_in_place() {
        let routes = parse_routes(&json!({
            "Route 2": [{ "bbox": [0, 0, 1, 1] }],
            "other": [{ "bbox": [5, 5, 6, 6] }]
        }))
        .unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].name, "Route 2");
        assert_eq!(routes[0].boxes[0].bbox, [5.0, 5.0, 6.0, 6.0]);
    }

    #[test]
    fn parse_rejects_malformed_maps() {
        assert!(parse_routes(&json!([1, 2])).is_err());
        assert!(parse_routes(&json!({ "a": {} })).is_err());
        assert!(parse_routes(&json!({ "a": [{ "bbox": [1, 2, 3] }] })).is_err());
        assert!(parse_routes(&json!({ "a": [{ "bbox": [1, 2, 3, "x"] }] })).is_err());
        assert!(parse_routes(&json!({ "a": [{ "box": [1, 2, 3, 4] }] })).is_err());
    }

    #[test]
    fn colors_wrap_around_palette() {
        let routes: Vec<Route> = (1..=12)
            .map(|i| Route {
                name: format!("Route {}", i),
                boxes: vec![],
            })
            .collect();
        let colors = assign_colors(&routes);

        assert_eq!(colors["Route 1"]["value"], "#EF4444");
        assert_eq!(colors["Route 4"]["textColor"], "#000000");
        assert_eq!(colors["Route 11"]["value"], "#EF4444");
        assert_eq!(colors["Route 12"]["value"], "#3B82F6");
    }

    #[test]
    fn first_click_adds_whole_route_without_duplicates() {
        let routes = sample_routes();
        let start = Selection {
            route_zero: vec![bb(2.0)],
            first_click: true,
        };

        let next = apply_click(&routes, start, "Route 2", 0).unwrap();
        assert!(!next.first_click);
        assert_eq!(next.route_zero, vec![bb(2.0), bb(3.0)]);
    }

    #[test]
    fn later_clicks_toggle_single_box() {
        let routes = sample_routes();
        let sel = apply_click(&routes, Selection::default(), "Route 1", 0).unwrap();
        assert_eq!(sel.route_zero, vec![bb(1.0), bb(2.0)]);

        let sel = apply_click(&routes, sel, "Route 2", 0).unwrap();
        assert_eq!(sel.route_zero, vec![bb(1.0)]);

        let sel = apply_click(&routes, sel, "Route 2", 1).unwrap();
        assert_eq!(sel.route_zero, vec![bb(1.0), bb(3.0)]);
    }

    #[test]
    fn clicking_route_zero_removes_by_index() {
        let routes = sample_routes();
        let sel = Selection {
            route_zero: vec![bb(1.0), bb(3.0)],
            first_click: false,
        };

        let sel = apply_click(&routes, sel, ROUTE_ZERO, 0).unwrap();
        assert_eq!(sel.route_zero, vec![bb(3.0)]);

        let sel = apply_click(&routes, sel, ROUTE_ZERO, 9).unwrap();
        assert_eq!(sel.route_zero, vec![bb(3.0)]);
    }

    #[test]
    fn unknown_route_or_box_is_an_error() {
        let routes = sample_routes();
        assert!(apply_click(&routes, Selection::default(), "Route 9", 0).is_err());

        let sel = Selection {
            route_zero: vec![],
            first_click: false,
        };
        assert!(apply_click(&routes, sel, "Route 1", 5).is_err());
    }

    #[test]
    fn detector_fields_survive_parse_and_render() {
        let routes = parse_routes(&json!({
            "Route 1": [{ "bbox": [0, 0, 5, 5], "confidence": 0.93, "class": "hold" }]
        }))
        .unwrap();

        let b = &routes[0].boxes[0];
        assert_eq!(b.extra.get("confidence"), Some(&json!(0.93)));
        assert!(!b.extra.contains_key("bbox"));

        let rendered = routes_to_json(&routes);
        assert_eq!(rendered["Route 1"][0]["class"], "hold");
        assert_eq!(rendered["Route 1"][0]["confidence"], 0.93);
    }
}

//! Result data model
//!
//! [`SearchResult`] is the public, immutable shape handed to callers.
//! [`CandidateRecord`] is the pipeline's working record: it carries the
//! boxes accumulated while merging until enrichment completes, then is
//! converted into a [`SearchResult`].

use serde::{Deserialize, Serialize};

/// Closed classification of a geocoded candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Highway,
    Road,
    Street,
    City,
    Other,
}

impl ResultType {
    /// Highways and roads are linear features: merged by name and enriched
    pub const fn is_linear(self) -> bool {
        matches!(self, Self::Highway | Self::Road)
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Highway => "highway",
            Self::Road => "road",
            Self::Street => "street",
            Self::City => "city",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Axis-aligned extent in WGS84 degrees
///
/// Always satisfies `west <= east` and `south <= north` with finite
/// coordinates. Serialized as `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    /// The whole globe
    pub const WORLD: Self = Self {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    /// Build a box, rejecting non-finite or inverted coordinates
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Option<Self> {
        let finite = [west, south, east, north].iter().all(|v| v.is_finite());
        (finite && west <= east && south <= north).then_some(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Parse the geocoding backend's `[south, north, west, east]` string array
    ///
    /// Anything malformed yields `None` ("extent absent").
    pub fn from_backend<S: AsRef<str>>(raw: &[S]) -> Option<Self> {
        let [south, north, west, east] = raw else {
            return None;
        };
        let parse = |s: &S| s.as_ref().trim().parse::<f64>().ok();
        Self::new(parse(west)?, parse(south)?, parse(east)?, parse(north)?)
    }

    pub const fn west(&self) -> f64 {
        self.west
    }

    pub const fn south(&self) -> f64 {
        self.south
    }

    pub const fn east(&self) -> f64 {
        self.east
    }

    pub const fn north(&self) -> f64 {
        self.north
    }

    /// East-west extent in degrees
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// `(lng, lat)` of the box center
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.west, self.east),
            f64::midpoint(self.south, self.north),
        )
    }

    /// True when both dimensions are strictly positive
    pub fn has_positive_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// A point or a line: zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        !self.has_positive_area()
    }

    /// True when the point lies strictly inside the box (edges excluded)
    pub fn strictly_contains(&self, lng: f64, lat: f64) -> bool {
        lng > self.west && lng < self.east && lat > self.south && lat < self.north
    }

    /// Smallest box enclosing both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Smallest box enclosing every box in the iterator, `None` when empty
    pub fn union_all<'a, I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<Self>, bbox| {
                Some(acc.map_or(*bbox, |merged| merged.union(bbox)))
            })
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.west, bbox.south, bbox.east, bbox.north]
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = String;

    fn try_from([west, south, east, north]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(west, south, east, north)
            .ok_or_else(|| format!("invalid bounding box [{west}, {south}, {east}, {north}]"))
    }
}

/// One geocoded candidate as returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    id: String,
    name: String,
    display_name: String,
    lat: f64,
    lng: f64,
    #[serde(rename = "type")]
    result_type: ResultType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bbox: Option<BoundingBox>,
}

impl SearchResult {
    /// Opaque identifier, unique within one search response
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full backend label
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub const fn lat(&self) -> f64 {
        self.lat
    }

    pub const fn lng(&self) -> f64 {
        self.lng
    }

    pub const fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub const fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }
}

/// Working record inside the search pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
    pub result_type: ResultType,
    pub bbox: Option<BoundingBox>,
    /// Boxes of every record merged into this one, its own included
    pub accumulated_boxes: Vec<BoundingBox>,
}

impl CandidateRecord {
    /// Drop the merge bookkeeping and freeze the record
    pub fn into_result(self) -> SearchResult {
        SearchResult {
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            lat: self.lat,
            lng: self.lng,
            result_type: self.result_type,
            bbox: self.bbox,
        }
    }
}

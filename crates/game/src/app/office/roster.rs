use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use office_engine::TileRect;
use serde::Deserialize;
use thiserror::Error;

use super::profile::{DeskQuirk, ProfileOverrides, RoleProfile};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RoleId(String);

impl RoleId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable description of one office role.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoleDefinition {
    pub(crate) id: RoleId,
    pub(crate) name: String,
    pub(crate) title: String,
    pub(crate) row_start: u32,
    pub(crate) character_index: u32,
    pub(crate) boundary: TileRect,
    pub(crate) desk: TileRect,
    pub(crate) color: [u8; 4],
    pub(crate) description: String,
    pub(crate) profile_overrides: ProfileOverrides,
}

impl RoleDefinition {
    pub(crate) fn profile(&self) -> RoleProfile {
        RoleProfile::for_role_id(self.id.as_str()).with_overrides(&self.profile_overrides)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FloorPlan {
    pub(crate) width_tiles: u32,
    pub(crate) height_tiles: u32,
    pub(crate) tile_size_px: f32,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self {
            width_tiles: 44,
            height_tiles: 28,
            tile_size_px: 16.0,
        }
    }
}

/// Validated, ordered role list. Construction is the only validation point;
/// every `Roster` in circulation is known-good.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Roster {
    floor: FloorPlan,
    roles: Vec<RoleDefinition>,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum RosterError {
    #[error("roster defines no roles")]
    Empty,
    #[error("role at index {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate role id {0}")]
    DuplicateId(RoleId),
    #[error("role {role}: {field} rectangle {rect:?} must have max greater than min on both axes")]
    DegenerateRect {
        role: RoleId,
        field: &'static str,
        rect: TileRect,
    },
    #[error("role {role}: desk {desk:?} is not inside boundary {boundary:?}")]
    DeskOutsideBoundary {
        role: RoleId,
        desk: TileRect,
        boundary: TileRect,
    },
    #[error("role {role}: color {value:?} is not #RRGGBB")]
    InvalidColor { role: RoleId, value: String },
    #[error("role {role}: personality {value} is outside [0, 1]")]
    PersonalityOutOfRange { role: RoleId, value: f32 },
    #[error("role {role}: roam radius {value} must be positive")]
    InvalidRoamRadius { role: RoleId, value: f32 },
    #[error("floor tile size {0} must be positive")]
    InvalidTileSize(f32),
}

#[derive(Debug, Error)]
pub(crate) enum RosterLoadError {
    #[error("failed to read roster '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse roster '{path}' at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid roster '{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: RosterError,
    },
}

impl Roster {
    pub(crate) fn new(floor: FloorPlan, roles: Vec<RoleDefinition>) -> Result<Self, RosterError> {
        validate(&floor, &roles)?;
        Ok(Self { floor, roles })
    }

    pub(crate) fn floor(&self) -> FloorPlan {
        self.floor
    }

    pub(crate) fn roles(&self) -> &[RoleDefinition] {
        &self.roles
    }

    pub(crate) fn len(&self) -> usize {
        self.roles.len()
    }

    pub(crate) fn role_at(&self, index: usize) -> Option<&RoleDefinition> {
        self.roles.get(index)
    }
}

fn validate(floor: &FloorPlan, roles: &[RoleDefinition]) -> Result<(), RosterError> {
    if !(floor.tile_size_px.is_finite() && floor.tile_size_px > 0.0) {
        return Err(RosterError::InvalidTileSize(floor.tile_size_px));
    }
    if roles.is_empty() {
        return Err(RosterError::Empty);
    }

    let mut seen = HashSet::new();
    for (index, role) in roles.iter().enumerate() {
        if role.id.as_str().trim().is_empty() {
            return Err(RosterError::EmptyId { index });
        }
        if !seen.insert(role.id.clone()) {
            return Err(RosterError::DuplicateId(role.id.clone()));
        }
        for (field, rect) in [("boundary", role.boundary), ("desk", role.desk)] {
            if !rect.has_positive_extent() {
                return Err(RosterError::DegenerateRect {
                    role: role.id.clone(),
                    field,
                    rect,
                });
            }
        }
        if !role.boundary.contains_rect(&role.desk) {
            return Err(RosterError::DeskOutsideBoundary {
                role: role.id.clone(),
                desk: role.desk,
                boundary: role.boundary,
            });
        }

        let profile = role.profile();
        if !(0.0..=1.0).contains(&profile.personality) {
            return Err(RosterError::PersonalityOutOfRange {
                role: role.id.clone(),
                value: profile.personality,
            });
        }
        if !(profile.roam_radius.is_finite() && profile.roam_radius > 0.0) {
            return Err(RosterError::InvalidRoamRadius {
                role: role.id.clone(),
                value: profile.roam_radius,
            });
        }
    }
    Ok(())
}

/// The four stock roles and their office areas.
pub(crate) fn default_roster() -> Roster {
    let roles = vec![
        stock_role(
            "CEO",
            "CEO",
            "Chief Executive Officer",
            (0, 0),
            TileRect::new(20, 25, 1, 8),
            TileRect::new(23, 25, 1, 3),
            [0xFF, 0xD7, 0x00, 0xFF],
            "Corner office",
        ),
        stock_role(
            "DEVELOPER",
            "Developer",
            "Software Developer",
            (2, 1),
            TileRect::new(7, 11, 27, 33),
            TileRect::new(8, 10, 27, 30),
            [0x00, 0xFF, 0x00, 0xFF],
            "Development area",
        ),
        stock_role(
            "HR",
            "HR",
            "Human Resources",
            (4, 2),
            TileRect::new(14, 18, 1, 8),
            TileRect::new(16, 18, 1, 3),
            [0xFF, 0x69, 0xB4, 0xFF],
            "HR department",
        ),
        stock_role(
            "MANAGER",
            "Manager",
            "Project Manager",
            (6, 3),
            TileRect::new(11, 15, 37, 41),
            TileRect::new(12, 14, 38, 40),
            [0xFF, 0x8C, 0x00, 0xFF],
            "Management zone",
        ),
    ];
    Roster {
        floor: FloorPlan::default(),
        roles,
    }
}

#[allow(clippy::too_many_arguments)]
fn stock_role(
    id: &str,
    name: &str,
    title: &str,
    (row_start, character_index): (u32, u32),
    boundary: TileRect,
    desk: TileRect,
    color: [u8; 4],
    description: &str,
) -> RoleDefinition {
    RoleDefinition {
        id: RoleId::new(id),
        name: name.to_string(),
        title: title.to_string(),
        row_start,
        character_index,
        boundary,
        desk,
        color,
        description: description.to_string(),
        profile_overrides: ProfileOverrides::default(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RosterFile {
    #[serde(default)]
    floor: Option<FloorFile>,
    roles: Vec<RoleFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FloorFile {
    width_tiles: u32,
    height_tiles: u32,
    tile_size_px: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RoleFile {
    id: String,
    name: String,
    #[serde(default)]
    title: Option<String>,
    row_start: u32,
    #[serde(default)]
    character_index: Option<u32>,
    boundary: TileRect,
    desk: TileRect,
    color: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    personality: Option<f32>,
    #[serde(default)]
    roam_radius: Option<f32>,
    #[serde(default)]
    desk_quirk: Option<DeskQuirk>,
}

impl RosterFile {
    fn into_roster(self) -> Result<Roster, RosterError> {
        let floor = self
            .floor
            .map(|floor| FloorPlan {
                width_tiles: floor.width_tiles,
                height_tiles: floor.height_tiles,
                tile_size_px: floor.tile_size_px,
            })
            .unwrap_or_default();
        let roles = self
            .roles
            .into_iter()
            .enumerate()
            .map(|(index, role)| role.into_definition(index))
            .collect::<Result<Vec<_>, _>>()?;
        Roster::new(floor, roles)
    }
}

impl RoleFile {
    fn into_definition(self, index: usize) -> Result<RoleDefinition, RosterError> {
        let id = RoleId::new(self.id);
        let color = parse_hex_color(&self.color).ok_or_else(|| RosterError::InvalidColor {
            role: id.clone(),
            value: self.color.clone(),
        })?;
        Ok(RoleDefinition {
            title: self.title.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            row_start: self.row_start,
            character_index: self.character_index.unwrap_or(index as u32),
            boundary: self.boundary,
            desk: self.desk,
            color,
            description: self.description.unwrap_or_default(),
            profile_overrides: ProfileOverrides {
                personality: self.personality,
                roam_radius: self.roam_radius,
                quirk: self.desk_quirk,
            },
            id,
        })
    }
}

/// `#RRGGBB` (leading `#` optional) to opaque RGBA.
pub(crate) fn parse_hex_color(raw: &str) -> Option<[u8; 4]> {
    let hex = raw.trim().strip_prefix('#').unwrap_or(raw.trim());
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, 0xFF])
}

#[derive(Debug, Error)]
pub(crate) enum RosterParseError {
    #[error("at {location}: {source}")]
    Syntax {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] RosterError),
}

pub(crate) fn parse_roster_json(raw: &str) -> Result<Roster, RosterParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file = serde_path_to_error::deserialize::<_, RosterFile>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            let location = if path.is_empty() || path == "." {
                "document root".to_string()
            } else {
                path
            };
            RosterParseError::Syntax {
                location,
                source: error.into_inner(),
            }
        },
    )?;
    Ok(file.into_roster()?)
}

pub(crate) fn load_roster_file(path: &Path) -> Result<Roster, RosterLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| RosterLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_roster_json(&raw).map_err(|error| match error {
        RosterParseError::Syntax { location, source } => RosterLoadError::Parse {
            path: path.to_path_buf(),
            location,
            source,
        },
        RosterParseError::Invalid(source) => RosterLoadError::Invalid {
            path: path.to_path_buf(),
            source,
        },
    })
}

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::queue::message::TILE;
use crate::utils::error::ParseError;

/// Identifies one rendered tile, parsed from the first line of a `tile:`
/// message such as
///
/// ```text
/// tile: nviewid=0 part=0 width=256 height=256 tileposx=0 tileposy=3840 tilewidth=3840 tileheight=3840 ver=7 wid=12
/// ```
///
/// Equality covers the tile's identity only. `ver`, `imgsize`, `wid` and
/// `oldwid` describe one particular render and are ignored, so a newer
/// render of the same tile compares equal to the older one.
#[derive(Debug, Clone)]
pub struct TileDesc {
    pub view_id: i32,
    pub part: i32,
    pub mode: i32,
    pub width: i32,
    pub height: i32,
    pub tile_pos_x: i32,
    pub tile_pos_y: i32,
    pub tile_width: i32,
    pub tile_height: i32,
    pub version: Option<i32>,
    pub image_size: Option<usize>,
    pub id: Option<i32>,
    pub broadcast: bool,
    pub old_wire_id: u64,
    pub wire_id: u64,
}

impl TileDesc {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(TILE) => {}
            other => return Err(ParseError::NotATile(other.unwrap_or_default().to_string())),
        }

        let mut view_id = 0;
        let mut mode = 0;
        let mut part = None;
        let mut width = None;
        let mut height = None;
        let mut tile_pos_x = None;
        let mut tile_pos_y = None;
        let mut tile_width = None;
        let mut tile_height = None;
        let mut version = None;
        let mut image_size = None;
        let mut id = None;
        let mut broadcast = false;
        let mut old_wire_id = 0;
        let mut wire_id = 0;

        for (key, value) in tokens.filter_map(|t| t.split_once('=')) {
            match key {
                "nviewid" => view_id = number("nviewid", value)?,
                "part" => part = Some(number("part", value)?),
                "mode" => mode = number("mode", value)?,
                "width" => width = Some(number("width", value)?),
                "height" => height = Some(number("height", value)?),
                "tileposx" => tile_pos_x = Some(number("tileposx", value)?),
                "tileposy" => tile_pos_y = Some(number("tileposy", value)?),
                "tilewidth" => tile_width = Some(number("tilewidth", value)?),
                "tileheight" => tile_height = Some(number("tileheight", value)?),
                "ver" => version = Some(number("ver", value)?),
                "imgsize" => image_size = Some(number("imgsize", value)?),
                "id" => id = Some(number("id", value)?),
                "broadcast" => broadcast = matches!(value, "yes" | "true"),
                "oldwid" => old_wire_id = number("oldwid", value)?,
                "wid" => wire_id = number("wid", value)?,
                _ => {}
            }
        }

        let desc = Self {
            view_id,
            part: part.ok_or(ParseError::MissingField("part"))?,
            mode,
            width: width.ok_or(ParseError::MissingField("width"))?,
            height: height.ok_or(ParseError::MissingField("height"))?,
            tile_pos_x: tile_pos_x.ok_or(ParseError::MissingField("tileposx"))?,
            tile_pos_y: tile_pos_y.ok_or(ParseError::MissingField("tileposy"))?,
            tile_width: tile_width.ok_or(ParseError::MissingField("tilewidth"))?,
            tile_height: tile_height.ok_or(ParseError::MissingField("tileheight"))?,
            version,
            image_size,
            id,
            broadcast,
            old_wire_id,
            wire_id,
        };
        desc.validate()?;
        Ok(desc)
    }

    fn validate(&self) -> Result<(), ParseError> {
        let checks = [
            ("width", self.width, self.width > 0),
            ("height", self.height, self.height > 0),
            ("tilewidth", self.tile_width, self.tile_width > 0),
            ("tileheight", self.tile_height, self.tile_height > 0),
            ("tileposx", self.tile_pos_x, self.tile_pos_x >= 0),
            ("tileposy", self.tile_pos_y, self.tile_pos_y >= 0),
        ];
        match checks.into_iter().find(|(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(ParseError::InvalidField {
                field,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Hash of the tile's position within its part.
    ///
    /// View, pixel size, id and broadcast do not participate, so distinct
    /// descriptors can share a hash. Equal descriptors always do.
    pub fn position_hash(&self) -> u32 {
        let mut hasher = DefaultHasher::new();
        (
            self.part,
            self.mode,
            self.tile_pos_x,
            self.tile_pos_y,
            self.tile_width,
            self.tile_height,
        )
            .hash(&mut hasher);
        let hash = hasher.finish();
        (hash ^ (hash >> 32)) as u32
    }
}

fn number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}

impl PartialEq for TileDesc {
    fn eq(&self, other: &Self) -> bool {
        self.view_id == other.view_id
            && self.part == other.part
            && self.mode == other.mode
            && self.width == other.width
            && self.height == other.height
            && self.tile_pos_x == other.tile_pos_x
            && self.tile_pos_y == other.tile_pos_y
            && self.tile_width == other.tile_width
            && self.tile_height == other.tile_height
            && self.id == other.id
            && self.broadcast == other.broadcast
    }
}

impl Eq for TileDesc {}

impl fmt::Display for TileDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TILE} nviewid={} part={} mode={} width={} height={} tileposx={} tileposy={} tilewidth={} tileheight={}",
            self.view_id,
            self.part,
            self.mode,
            self.width,
            self.height,
            self.tile_pos_x,
            self.tile_pos_y,
            self.tile_width,
            self.tile_height,
        )?;
        if let Some(ver) = self.version {
            write!(f, " ver={ver}")?;
        }
        if let Some(size) = self.image_size {
            write!(f, " imgsize={size}")?;
        }
        if let Some(id) = self.id {
            write!(f, " id={id}")?;
        }
        if self.broadcast {
            write!(f, " broadcast=yes")?;
        }
        write!(f, " oldwid={} wid={}", self.old_wire_id, self.wire_id)
    }
}

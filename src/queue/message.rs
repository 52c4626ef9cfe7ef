use crate::utils::error::ParseError;

pub const TILE: &str = "tile:";
pub const INVALIDATE_CURSOR: &str = "invalidatecursor:";
pub const SET_PART: &str = "setpart:";
pub const PROGRESS: &str = "progress:";
pub const INVALIDATE_VIEW_CURSOR: &str = "invalidateviewcursor:";

/// Marks a `progress:` message carrying a live value update.
pub const SETVALUE_MARKER: &str = "\"id\":\"setvalue\"";

/// Only this many leading payload bytes are scanned when abbreviating.
const ABBREVIATION_WINDOW: usize = 500;

/// An outbound message queued for one session.
///
/// The payload and everything derived from it are fixed at construction.
/// The only later mutation is the tile position hash, which the coalescing
/// rules cache the first time a `tile:` message is enqueued.
///
/// # Example
///
/// ```rust
/// use sendqueue::queue::Message;
///
/// let msg = Message::text("s1-1", "setpart: part=2");
/// assert_eq!(msg.command_token(), "setpart:");
/// assert_eq!(msg.first_line(), "setpart: part=2");
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    payload: Vec<u8>,
    is_binary: bool,
    id: String,
    first_line: String,
    command_token: String,
    cached_position_hash: Option<u32>,
}

impl Message {
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id.into(), text.into().into_bytes(), false)
    }

    /// Binary messages still carry a textual first line (e.g. a `tile:`
    /// header in front of image data).
    pub fn binary(id: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(id.into(), data.into(), true)
    }

    fn new(id: String, payload: Vec<u8>, is_binary: bool) -> Self {
        let line_end = payload
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(payload.len());
        let first_line = String::from_utf8_lossy(&payload[..line_end])
            .trim_end_matches('\r')
            .to_string();
        let command_token = first_line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            payload,
            is_binary,
            id,
            first_line,
            command_token,
            cached_position_hash: None,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_line(&self) -> &str {
        &self.first_line
    }

    pub fn command_token(&self) -> &str {
        &self.command_token
    }

    pub fn first_token_matches(&self, token: &str) -> bool {
        self.command_token == token
    }

    /// Byte-wise substring search over the whole payload.
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        needle.is_empty() || self.payload.windows(needle.len()).any(|w| w == needle)
    }

    /// Reads `name` from the JSON object that starts at the first `{` of the
    /// payload. Strings are returned verbatim, other values as JSON text.
    pub fn json_field(&self, name: &str) -> Result<String, ParseError> {
        let start = self
            .payload
            .iter()
            .position(|&b| b == b'{')
            .ok_or(ParseError::NoJson)?;
        let json = std::str::from_utf8(&self.payload[start..]).map_err(|_| ParseError::NotUtf8)?;
        let value: serde_json::Value = serde_json::from_str(json)?;

        match value.get(name) {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(ParseError::MissingJsonField(name.to_string())),
        }
    }

    /// First line of the payload, with `...` appended when more follows.
    pub fn abbreviated(&self) -> String {
        let window = &self.payload[..self.payload.len().min(ABBREVIATION_WINDOW)];
        let line_end = window
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(window.len());
        let line = String::from_utf8_lossy(&window[..line_end]);

        if line_end + 1 < self.payload.len() {
            format!("{line}...")
        } else {
            line.into_owned()
        }
    }

    pub fn cached_position_hash(&self) -> Option<u32> {
        self.cached_position_hash
    }

    /// Caches `hash` unless a value is already present; returns the cached value.
    pub(crate) fn cache_position_hash(&mut self, hash: u32) -> u32 {
        *self.cached_position_hash.get_or_insert(hash)
    }
}
